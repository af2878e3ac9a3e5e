//! The `faker` kind: renders `{{provider}}` placeholders with fake data.
//!
//! ```text
//! "{{name.firstName}} {{name.lastName}} <{{internet.email}}>"
//! ```
//!
//! Providers are looked up in the column `locale` (`en` by default, or `fr`).

use crate::generator::ValueGenerator;
use crate::registry::{BuildContext, GeneratorEntry, ValidationContext};
use async_trait::async_trait;
use fake::faker::address::raw::{CityName, CountryName, StreetName, ZipCode};
use fake::faker::company::raw::CompanyName;
use fake::faker::internet::raw::{SafeEmail, Username};
use fake::faker::lorem::raw::{Paragraph, Sentence, Word};
use fake::faker::name::raw::{FirstName, LastName, Name};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{EN, FR_FR};
use fake::Fake;
use fill_core::{Column, CustomizedTable, FillError, GeneratedValue, GeneratorKind, Row};
use rand::rngs::StdRng;

/// Providers usable inside `{{ }}`.
pub const PROVIDERS: &[&str] = &[
    "name.firstName",
    "name.lastName",
    "name.fullName",
    "internet.email",
    "internet.userName",
    "address.city",
    "address.streetName",
    "address.zipCode",
    "address.country",
    "company.companyName",
    "phone.phoneNumber",
    "lorem.word",
    "lorem.sentence",
    "lorem.paragraph",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakerLocale {
    En,
    FrFr,
}

impl FakerLocale {
    pub fn parse(locale: Option<&str>) -> Option<Self> {
        match locale.map(|l| l.to_ascii_lowercase().replace('-', "_")).as_deref() {
            None | Some("en") | Some("en_us") => Some(Self::En),
            Some("fr") | Some("fr_fr") => Some(Self::FrFr),
            Some(_) => None,
        }
    }
}

macro_rules! provide {
    ($provider:expr, $locale:expr, $rng:expr) => {
        match $provider {
            "name.firstName" => Some(FirstName($locale).fake_with_rng::<String, _>($rng)),
            "name.lastName" => Some(LastName($locale).fake_with_rng::<String, _>($rng)),
            "name.fullName" => Some(Name($locale).fake_with_rng::<String, _>($rng)),
            "internet.email" => Some(SafeEmail($locale).fake_with_rng::<String, _>($rng)),
            "internet.userName" => Some(Username($locale).fake_with_rng::<String, _>($rng)),
            "address.city" => Some(CityName($locale).fake_with_rng::<String, _>($rng)),
            "address.streetName" => Some(StreetName($locale).fake_with_rng::<String, _>($rng)),
            "address.zipCode" => Some(ZipCode($locale).fake_with_rng::<String, _>($rng)),
            "address.country" => Some(CountryName($locale).fake_with_rng::<String, _>($rng)),
            "company.companyName" => Some(CompanyName($locale).fake_with_rng::<String, _>($rng)),
            "phone.phoneNumber" => Some(PhoneNumber($locale).fake_with_rng::<String, _>($rng)),
            "lorem.word" => Some(Word($locale).fake_with_rng::<String, _>($rng)),
            "lorem.sentence" => Some(Sentence($locale, 5..10).fake_with_rng::<String, _>($rng)),
            "lorem.paragraph" => Some(Paragraph($locale, 3..5).fake_with_rng::<String, _>($rng)),
            _ => None,
        }
    };
}

/// One fake value drawn from `rng`, `None` for an unknown provider.
pub fn fake_value(provider: &str, locale: FakerLocale, rng: &mut StdRng) -> Option<String> {
    match locale {
        FakerLocale::En => provide!(provider, EN, rng),
        FakerLocale::FrFr => provide!(provider, FR_FR, rng),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Provider(String),
}

/// Split a template into literal text and `{{provider}}` placeholders.
fn parse_template(template: &str) -> Result<Vec<Segment>, String> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let end = rest[start..]
            .find("}}")
            .map(|e| start + e)
            .ok_or_else(|| format!("unclosed placeholder in template: {template}"))?;
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let provider = rest[start + 2..end].trim();
        if !PROVIDERS.contains(&provider) {
            return Err(format!("unknown faker provider '{provider}'"));
        }
        segments.push(Segment::Provider(provider.to_string()));
        rest = &rest[end + 2..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok(segments)
}

fn prepare(column: &Column) -> Result<(Vec<Segment>, FakerLocale), String> {
    let template = column
        .template
        .as_deref()
        .ok_or_else(|| "template value required for type faker".to_string())?;
    let locale = FakerLocale::parse(column.locale.as_deref()).ok_or_else(|| {
        format!(
            "unsupported faker locale '{}'",
            column.locale.as_deref().unwrap_or_default()
        )
    })?;
    Ok((parse_template(template)?, locale))
}

pub fn entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Faker,
        engines: &[],
        validate,
        build,
    }
}

fn validate(
    _table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    prepare(column).map(|_| ())
}

fn build(
    _table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    let (segments, locale) = prepare(column)?;
    Ok(Box::new(FakerGenerator {
        segments,
        locale,
        rng: ctx.rng,
    }))
}

pub struct FakerGenerator {
    segments: Vec<Segment>,
    locale: FakerLocale,
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for FakerGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Provider(provider) => {
                    out.push_str(
                        &fake_value(provider, self.locale, &mut self.rng).unwrap_or_default(),
                    )
                }
            }
        }
        Ok(GeneratedValue::String(out))
    }
}
