//! Registry mapping each generator kind to its validation and construction.
//!
//! Everything kind-specific lives in one [`GeneratorEntry`]: the engines the
//! kind supports, how its attributes are validated and how an instance is
//! built. Adding a kind means registering one more entry.

use crate::functions::FunctionRegistry;
use crate::generator::{ColumnGenerator, TableGenerator, ValueGenerator};
use crate::generators;
use fill_core::{
    Column, CustomSettings, CustomizedSchema, CustomizedTable, Engine, FillError,
    GeneratorConfigError, GeneratorKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// What a kind's validation can see besides the column.
pub struct ValidationContext<'a> {
    pub engine: Engine,
    pub settings: &'a CustomSettings,
    pub functions: &'a FunctionRegistry,
}

/// What a kind's constructor receives.
pub struct BuildContext<'a> {
    pub settings: &'a CustomSettings,
    pub functions: &'a FunctionRegistry,
    /// RNG owned by the new generator
    pub rng: StdRng,
}

pub type ValidateFn = fn(&CustomizedTable, &Column, &ValidationContext<'_>) -> Result<(), String>;
pub type BuildFn =
    fn(&CustomizedTable, &Column, BuildContext<'_>) -> Result<Box<dyn ValueGenerator>, String>;

/// Registration of one generator kind.
#[derive(Clone)]
pub struct GeneratorEntry {
    pub kind: GeneratorKind,
    /// Engines supporting the kind. Empty means every engine.
    pub engines: &'static [Engine],
    pub validate: ValidateFn,
    pub build: BuildFn,
}

impl GeneratorEntry {
    pub fn supports(&self, engine: Engine) -> bool {
        self.engines.is_empty() || self.engines.contains(&engine)
    }
}

/// Accept every column.
pub(crate) fn no_validation(
    _table: &CustomizedTable,
    _column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    Ok(())
}

/// Unwrap a required attribute or describe what is missing.
pub(crate) fn required<T: Copy>(value: Option<T>, attribute: &str, kind: GeneratorKind) -> Result<T, String> {
    value.ok_or_else(|| format!("{attribute} value required for type {kind}"))
}

/// Kind registry plus the custom functions the `function` kind resolves.
#[derive(Clone)]
pub struct GeneratorRegistry {
    entries: HashMap<GeneratorKind, GeneratorEntry>,
    functions: FunctionRegistry,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GeneratorRegistry {
    /// Registry without any kind registered.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            functions: FunctionRegistry::new(),
        }
    }

    /// Registry with every built-in kind and the built-in functions.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for entry in generators::default_entries() {
            registry.register(entry);
        }
        registry.functions = FunctionRegistry::with_builtins();
        registry
    }

    /// Register a kind, replacing any previous registration.
    pub fn register(&mut self, entry: GeneratorEntry) {
        self.entries.insert(entry.kind, entry);
    }

    pub fn get(&self, kind: GeneratorKind) -> Option<&GeneratorEntry> {
        self.entries.get(&kind)
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    /// Validate one column for the given engine.
    pub fn validate_column(
        &self,
        engine: Engine,
        settings: &CustomSettings,
        table: &CustomizedTable,
        column: &Column,
    ) -> Result<(), GeneratorConfigError> {
        let error = |message: String| GeneratorConfigError::new(&table.name, &column.name, message);
        let entry = self.get(column.generator).ok_or_else(|| {
            error(format!("No generator registered for type {}", column.generator))
        })?;
        if !entry.supports(engine) {
            return Err(error(format!(
                "Generator {} is not supported on {engine}",
                column.generator
            )));
        }
        let ctx = ValidationContext {
            engine,
            settings,
            functions: &self.functions,
        };
        (entry.validate)(table, column, &ctx).map_err(error)
    }

    /// Validate every generated column of every table with rows to generate.
    ///
    /// All violations are reported at once.
    pub fn validate(&self, plan: &CustomizedSchema, engine: Engine) -> Result<(), FillError> {
        let errors: Vec<GeneratorConfigError> = plan
            .tables_to_generate()
            .flat_map(|table| {
                table
                    .columns
                    .iter()
                    .filter(|column| !column.auto_increment)
                    .filter_map(move |column| {
                        self.validate_column(engine, &plan.settings, table, column)
                            .err()
                    })
            })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FillError::GeneratorConfig(errors))
        }
    }

    /// Build the row generator of a table.
    ///
    /// Each column receives its own RNG seeded from `rng` in column order, so
    /// a seeded run is reproducible.
    pub fn build_table(
        &self,
        table: &CustomizedTable,
        settings: &CustomSettings,
        rng: &mut StdRng,
    ) -> Result<TableGenerator, FillError> {
        let table_rng = StdRng::seed_from_u64(rng.random());
        let mut columns = Vec::with_capacity(table.columns.len());
        let mut errors = Vec::new();

        for column in table.columns.iter().filter(|c| !c.auto_increment) {
            let column_rng = StdRng::seed_from_u64(rng.random());
            let Some(entry) = self.get(column.generator) else {
                errors.push(GeneratorConfigError::new(
                    &table.name,
                    &column.name,
                    format!("No generator registered for type {}", column.generator),
                ));
                continue;
            };
            let ctx = BuildContext {
                settings,
                functions: &self.functions,
                rng: column_rng,
            };
            match (entry.build)(table, column, ctx) {
                Ok(generator) => columns.push(ColumnGenerator {
                    name: column.name.clone(),
                    nullable: column.nullable,
                    generator,
                }),
                Err(message) => {
                    errors.push(GeneratorConfigError::new(&table.name, &column.name, message))
                }
            }
        }

        if !errors.is_empty() {
            return Err(FillError::GeneratorConfig(errors));
        }
        Ok(TableGenerator::new(&table.name, columns, table_rng))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use fill_core::{CustomSchema, Schema, Table};

    /// A one-table plan with the given columns and row count.
    pub(crate) fn plan_table(columns: Vec<Column>, delta_rows: u64) -> CustomizedTable {
        let mut custom = CustomSchema::default();
        let mut table = fill_core::CustomTable::new("t");
        table.add_lines = Some(delta_rows);
        custom.tables.push(table);
        let schema = Schema::new(vec![Table::new("t", columns)]);
        CustomizedSchema::merge(&schema, &custom, &HashMap::new()).tables[0].clone()
    }

    pub(crate) fn build_one(table: &CustomizedTable, column: &Column) -> Box<dyn ValueGenerator> {
        let registry = GeneratorRegistry::with_defaults();
        let entry = registry.get(column.generator).unwrap();
        let ctx = BuildContext {
            settings: &CustomSettings::default(),
            functions: registry.functions(),
            rng: StdRng::seed_from_u64(42),
        };
        (entry.build)(table, column, ctx).unwrap()
    }

    #[test]
    fn test_every_kind_is_registered() {
        let registry = GeneratorRegistry::with_defaults();
        for kind in GeneratorKind::ALL {
            assert!(registry.get(kind).is_some(), "missing {kind}");
        }
    }

    #[test]
    fn test_validate_aggregates_all_errors() {
        let mut custom = CustomSchema::default();
        custom.settings.tables_to_fill = vec!["a".to_string(), "b".to_string()];
        let schema = Schema::new(vec![
            Table::new("a", vec![Column::new("x", GeneratorKind::Integer)]),
            Table::new(
                "b",
                vec![
                    Column::new("y", GeneratorKind::None),
                    Column::new("z", GeneratorKind::Boolean),
                ],
            ),
        ]);
        let plan = CustomizedSchema::merge(&schema, &custom, &HashMap::new());

        let err = GeneratorRegistry::with_defaults()
            .validate(&plan, Engine::MariaDb)
            .unwrap_err();
        match err {
            FillError::GeneratorConfig(errors) => {
                let columns: Vec<_> = errors
                    .iter()
                    .map(|e| format!("{}.{}", e.table, e.column))
                    .collect();
                assert_eq!(columns, vec!["a.x", "b.y"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_skips_tables_without_rows() {
        let schema = Schema::new(vec![Table::new(
            "a",
            vec![Column::new("x", GeneratorKind::None)],
        )]);
        let plan = CustomizedSchema::merge(&schema, &CustomSchema::default(), &HashMap::new());
        assert!(GeneratorRegistry::with_defaults()
            .validate(&plan, Engine::MariaDb)
            .is_ok());
    }

    #[test]
    fn test_engine_restricted_kinds() {
        let mut column = Column::new("tags", GeneratorKind::Array);
        column.max = Some(3.0);
        column.array_element_type = Some(fill_core::ArrayElementType::Int);
        let table = plan_table(vec![column.clone()], 1);
        let registry = GeneratorRegistry::with_defaults();
        let settings = CustomSettings::default();

        assert!(registry
            .validate_column(Engine::Postgres, &settings, &table, &column)
            .is_ok());
        let err = registry
            .validate_column(Engine::MariaDb, &settings, &table, &column)
            .unwrap_err();
        assert!(err.message.contains("not supported on MariaDB"));
    }

    #[test]
    fn test_build_table_skips_auto_increment() {
        let mut id = Column::new("id", GeneratorKind::Integer).with_range(1.0, 10.0);
        id.auto_increment = true;
        let name = Column::new("name", GeneratorKind::String);
        let table = plan_table(vec![id, name], 5);

        let mut rng = StdRng::seed_from_u64(42);
        let generator = GeneratorRegistry::with_defaults()
            .build_table(&table, &CustomSettings::default(), &mut rng)
            .unwrap();
        assert_eq!(generator.column_names(), vec!["name"]);
    }

    #[test]
    fn test_seeded_build_is_reproducible() {
        let table = plan_table(
            vec![
                Column::new("a", GeneratorKind::Integer).with_range(0.0, 1_000_000.0),
                Column::new("b", GeneratorKind::String),
            ],
            5,
        );
        let registry = GeneratorRegistry::with_defaults();
        let settings = CustomSettings::default();

        let mut first = registry
            .build_table(&table, &settings, &mut StdRng::seed_from_u64(7))
            .unwrap();
        let mut second = registry
            .build_table(&table, &settings, &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(first.next_batch(5).unwrap(), second.next_batch(5).unwrap());
    }
}
