//! User customization loaded from `settings/<name>_custom.jsonc`.
//!
//! Every field is optional in the file. Missing fields fall back to the
//! defaults below so that an empty document `{}` is a valid customization.

use crate::schema::{
    ArrayElementType, Column, ForeignKey, GeneratorKind, Monotonic, ValuesSource,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_max_length_value() -> Option<u64> {
    Some(36)
}

fn default_rows() -> u64 {
    1000
}

/// Global generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSettings {
    /// Statements run once before any table is filled
    #[serde(default)]
    pub before_all: Vec<String>,

    /// Statements run once after every table is filled
    #[serde(default)]
    pub after_all: Vec<String>,

    /// Drop triggers while filling, unless a table says otherwise
    #[serde(default)]
    pub disable_triggers: bool,

    #[serde(default)]
    pub ignored_tables: Vec<String>,

    /// Tables filled with `minRowsPerTable` rows when no row count is given
    #[serde(default)]
    pub tables_to_fill: Vec<String>,

    /// Upper bound on generated string length
    #[serde(default = "default_max_length_value")]
    pub max_length_value: Option<u64>,

    /// Named value lists referenced by `values` pointers
    #[serde(default)]
    pub values: BTreeMap<String, Vec<serde_json::Value>>,

    /// Defaults applied to every column of the listed generator kinds
    #[serde(default)]
    pub options: Vec<KindOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default = "default_rows")]
    pub max_rows_per_batch: u64,

    #[serde(default = "default_rows")]
    pub min_rows_per_table: u64,
}

impl Default for CustomSettings {
    fn default() -> Self {
        Self {
            before_all: Vec::new(),
            after_all: Vec::new(),
            disable_triggers: false,
            ignored_tables: Vec::new(),
            tables_to_fill: Vec::new(),
            max_length_value: default_max_length_value(),
            values: BTreeMap::new(),
            options: Vec::new(),
            seed: None,
            max_rows_per_batch: default_rows(),
            min_rows_per_table: default_rows(),
        }
    }
}

impl CustomSettings {
    /// Kind-level defaults for the given generator kind, in file order.
    pub fn options_for(&self, kind: GeneratorKind) -> impl Iterator<Item = &ColumnOverride> {
        self.options
            .iter()
            .filter(move |o| o.generators.contains(&kind))
            .map(|o| &o.options)
    }
}

/// Column defaults for a set of generator kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindOptions {
    pub generators: Vec<GeneratorKind>,
    pub options: ColumnOverride,
}

/// Partial column attributes. Set fields replace the column's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<ValuesSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monotonic: Option<Monotonic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_element_type: Option<ArrayElementType>,
}

macro_rules! override_fields {
    ($self:ident, $column:ident, [$($field:ident),*]) => {
        $(
            if let Some(value) = &$self.$field {
                $column.$field = value.clone();
            }
        )*
    };
}

macro_rules! override_optional_fields {
    ($self:ident, $column:ident, [$($field:ident),*]) => {
        $(
            if let Some(value) = &$self.$field {
                $column.$field = Some(value.clone());
            }
        )*
    };
}

impl ColumnOverride {
    /// Overwrite the column's attributes with every field set here.
    pub fn apply_to(&self, column: &mut Column) {
        override_fields!(self, column, [generator, nullable, unique, auto_increment, monotonic]);
        override_optional_fields!(
            self,
            column,
            [
                min,
                max,
                min_date,
                max_date,
                foreign_key,
                values,
                custom_function,
                template,
                locale,
                array_element_type
            ]
        );
    }
}

/// Per-column customization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomColumn {
    pub name: String,
    #[serde(flatten)]
    pub overrides: ColumnOverride,
}

/// Per-table customization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTable {
    pub name: String,

    #[serde(default)]
    pub columns: Vec<CustomColumn>,

    /// Desired row count after the fill
    #[serde(default, alias = "lines", skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u64>,

    /// Rows to add regardless of the current count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_lines: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_triggers: Option<bool>,

    /// Name of another customized table whose settings this table inherits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl CustomTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn get_column(&self, name: &str) -> Option<&CustomColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the table asks for rows explicitly.
    pub fn has_row_target(&self) -> bool {
        self.max_lines.is_some() || self.add_lines.is_some()
    }
}

/// The whole customization document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomSchema {
    #[serde(default)]
    pub settings: CustomSettings,

    #[serde(default)]
    pub tables: Vec<CustomTable>,
}

impl CustomSchema {
    pub fn get_table(&self, name: &str) -> Option<&CustomTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Resolve a table's customization, merging in its template.
    ///
    /// Fields set on the table win over the template. Column overrides of the
    /// template apply to same-named columns the table does not customize.
    pub fn resolve_table(&self, name: &str) -> Option<CustomTable> {
        let table = self.get_table(name)?;
        let Some(template) = table
            .template
            .as_deref()
            .filter(|t| *t != name)
            .and_then(|t| self.get_table(t))
        else {
            return Some(table.clone());
        };

        let mut resolved = table.clone();
        for column in &template.columns {
            if resolved.get_column(&column.name).is_none() {
                resolved.columns.push(column.clone());
            }
        }
        resolved.max_lines = resolved.max_lines.or(template.max_lines);
        resolved.add_lines = resolved.add_lines.or(template.add_lines);
        if resolved.before.is_empty() {
            resolved.before = template.before.clone();
        }
        if resolved.after.is_empty() {
            resolved.after = template.after.clone();
        }
        resolved.disable_triggers = resolved.disable_triggers.or(template.disable_triggers);
        Some(resolved)
    }

    /// Names of tables with an explicit row target.
    pub fn tables_with_row_target(&self) -> Vec<String> {
        self.tables
            .iter()
            .filter(|t| {
                self.resolve_table(&t.name)
                    .map(|r| r.has_row_target())
                    .unwrap_or(false)
            })
            .map(|t| t.name.clone())
            .collect()
    }
}
