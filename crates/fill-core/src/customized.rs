//! The generation plan: introspected schema merged with user customization.

use crate::custom::{CustomSchema, CustomSettings, CustomTable};
use crate::schema::{Column, Schema, Table};
use std::collections::HashMap;

/// A table ready to be filled.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomizedTable {
    pub name: String,
    pub columns: Vec<Column>,
    pub referenced_tables: Vec<String>,
    pub max_lines: Option<u64>,
    pub add_lines: Option<u64>,
    /// Rows to generate in this run
    pub delta_rows: u64,
    pub before: Vec<String>,
    pub after: Vec<String>,
    /// Resolved trigger policy: the table's own setting, else the global one
    pub disable_triggers: bool,
    pub template: Option<String>,
}

impl CustomizedTable {
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Number of rows to generate for a table this run.
///
/// `addLines` wins over `maxLines`. A table with neither is filled with
/// `minRowsPerTable` rows only when listed in `tablesToFill`.
pub fn delta_rows(
    custom: Option<&CustomTable>,
    in_tables_to_fill: bool,
    min_rows_per_table: u64,
    current_rows: u64,
) -> u64 {
    if let Some(add) = custom.and_then(|t| t.add_lines) {
        return add;
    }
    if let Some(max) = custom.and_then(|t| t.max_lines) {
        return max.saturating_sub(current_rows);
    }
    if in_tables_to_fill {
        return min_rows_per_table;
    }
    0
}

/// Introspected column with kind-level defaults then per-column overrides applied.
fn customize_column(column: &Column, custom: Option<&CustomTable>, settings: &CustomSettings) -> Column {
    let explicit = custom.and_then(|t| t.get_column(&column.name));
    let kind = explicit
        .and_then(|c| c.overrides.generator)
        .unwrap_or(column.generator);

    let mut merged = column.clone();
    for options in settings.options_for(kind) {
        options.apply_to(&mut merged);
    }
    if let Some(explicit) = explicit {
        explicit.overrides.apply_to(&mut merged);
    }
    merged
}

/// The merged generation plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomizedSchema {
    pub settings: CustomSettings,
    pub tables: Vec<CustomizedTable>,
}

impl CustomizedSchema {
    /// Merge the introspected schema with the customization.
    ///
    /// `current_rows` holds the row count of each table before the fill.
    /// Missing entries count as empty tables.
    pub fn merge(
        schema: &Schema,
        custom: &CustomSchema,
        current_rows: &HashMap<String, u64>,
    ) -> Self {
        let settings = custom.settings.clone();
        let tables = schema
            .tables
            .iter()
            .filter(|t| !settings.ignored_tables.contains(&t.name))
            .map(|table| Self::merge_table(table, custom, &settings, current_rows))
            .collect();
        Self { settings, tables }
    }

    fn merge_table(
        table: &Table,
        custom: &CustomSchema,
        settings: &CustomSettings,
        current_rows: &HashMap<String, u64>,
    ) -> CustomizedTable {
        let custom_table = custom.resolve_table(&table.name);
        let current = current_rows.get(&table.name).copied().unwrap_or(0);
        let delta = delta_rows(
            custom_table.as_ref(),
            settings.tables_to_fill.contains(&table.name),
            settings.min_rows_per_table,
            current,
        );

        let columns = table
            .columns
            .iter()
            .map(|c| customize_column(c, custom_table.as_ref(), settings))
            .collect();

        CustomizedTable {
            name: table.name.clone(),
            columns,
            referenced_tables: table.referenced_tables.clone(),
            max_lines: custom_table.as_ref().and_then(|t| t.max_lines),
            add_lines: custom_table.as_ref().and_then(|t| t.add_lines),
            delta_rows: delta,
            before: custom_table
                .as_ref()
                .map(|t| t.before.clone())
                .unwrap_or_default(),
            after: custom_table
                .as_ref()
                .map(|t| t.after.clone())
                .unwrap_or_default(),
            disable_triggers: custom_table
                .as_ref()
                .and_then(|t| t.disable_triggers)
                .unwrap_or(settings.disable_triggers),
            template: custom_table.and_then(|t| t.template),
        }
    }

    pub fn get_table(&self, name: &str) -> Option<&CustomizedTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Tables with rows to generate this run.
    pub fn tables_to_generate(&self) -> impl Iterator<Item = &CustomizedTable> {
        self.tables.iter().filter(|t| t.delta_rows > 0)
    }

    /// Structural checks that do not depend on generator kinds.
    ///
    /// Returns one message per violation.
    pub fn structural_violations(&self, schema: &Schema) -> Vec<String> {
        let mut violations = Vec::new();
        if self.settings.max_rows_per_batch == 0 {
            violations.push("settings.maxRowsPerBatch must be greater than 0".to_string());
        }
        for table in self.tables_to_generate() {
            for column in &table.columns {
                let Some(fk) = &column.foreign_key else {
                    continue;
                };
                if schema.get_table(&fk.table).is_none() {
                    violations.push(format!(
                        "{}.{}: foreign key references unknown table '{}'",
                        table.name, column.name, fk.table
                    ));
                }
            }
        }
        violations
    }
}
