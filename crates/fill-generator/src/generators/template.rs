//! Placeholder template generator.
//!
//! Supports placeholders:
//! - `{index}` - row index
//! - `{uuid}` - random UUID
//! - `{rand:N}` - random N-digit number
//! - `{column}` - value of an earlier column of the same row

use crate::generator::ValueGenerator;
use crate::registry::{BuildContext, GeneratorEntry, ValidationContext};
use ::uuid::Builder;
use async_trait::async_trait;
use fill_core::{Column, CustomizedTable, FillError, GeneratedValue, GeneratorKind, Row};
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
enum Placeholder {
    Literal(String),
    Index,
    Uuid,
    Digits(usize),
    Column(String),
}

fn parse_template(template: &str) -> Result<Vec<Placeholder>, String> {
    let mut parts = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let end = rest[start..]
            .find('}')
            .map(|e| start + e)
            .ok_or_else(|| format!("unclosed placeholder in template: {template}"))?;
        if start > 0 {
            parts.push(Placeholder::Literal(rest[..start].to_string()));
        }
        let name = &rest[start + 1..end];
        let part = match name {
            "index" => Placeholder::Index,
            "uuid" => Placeholder::Uuid,
            _ => match name.strip_prefix("rand:") {
                Some(digits) => Placeholder::Digits(
                    digits
                        .parse()
                        .map_err(|_| format!("invalid digit count in {{{name}}}"))?,
                ),
                None if name.is_empty() => return Err("empty placeholder {}".to_string()),
                None => Placeholder::Column(name.to_string()),
            },
        };
        parts.push(part);
        rest = &rest[end + 1..];
    }
    if !rest.is_empty() {
        parts.push(Placeholder::Literal(rest.to_string()));
    }
    Ok(parts)
}

/// Parse the template and check column placeholders name earlier columns.
fn prepare(table: &CustomizedTable, column: &Column) -> Result<Vec<Placeholder>, String> {
    let template = column
        .template
        .as_deref()
        .ok_or_else(|| "template value required for type template".to_string())?;
    let parts = parse_template(template)?;

    let position = table.columns.iter().position(|c| c.name == column.name);
    let earlier = &table.columns[..position.unwrap_or(table.columns.len())];
    for part in &parts {
        if let Placeholder::Column(name) = part {
            if !earlier.iter().any(|c| &c.name == name) {
                return Err(format!("{{{name}}} does not name an earlier column"));
            }
        }
    }
    Ok(parts)
}

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Template,
        engines: &[],
        validate,
        build,
    }
}

fn validate(
    table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    prepare(table, column).map(|_| ())
}

fn build(
    table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    Ok(Box::new(TemplateGenerator {
        parts: prepare(table, column)?,
        rng: ctx.rng,
    }))
}

pub struct TemplateGenerator {
    parts: Vec<Placeholder>,
    rng: StdRng,
}

/// Random number with exactly `digits` digits.
fn random_digits(rng: &mut StdRng, digits: usize) -> String {
    let mut result = String::with_capacity(digits);
    for i in 0..digits {
        // No leading zero
        let low = if i == 0 { 1 } else { 0 };
        let digit: u8 = rng.random_range(low..10);
        result.push(char::from(b'0' + digit));
    }
    result
}

#[async_trait]
impl ValueGenerator for TemplateGenerator {
    fn generate(&mut self, row_index: u64, row: &Row) -> Result<GeneratedValue, FillError> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Placeholder::Literal(text) => out.push_str(text),
                Placeholder::Index => out.push_str(&row_index.to_string()),
                Placeholder::Uuid => {
                    let bytes: [u8; 16] = self.rng.random();
                    out.push_str(&Builder::from_random_bytes(bytes).into_uuid().to_string());
                }
                Placeholder::Digits(n) => out.push_str(&random_digits(&mut self.rng, *n)),
                Placeholder::Column(name) => match row.get(name) {
                    Some(GeneratedValue::Null) | None => {}
                    Some(value) => out.push_str(&value.to_string()),
                },
            }
        }
        Ok(GeneratedValue::String(out))
    }
}
