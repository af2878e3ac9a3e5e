//! Built-in generator kinds.
//!
//! Each module exposes an `entry()` registering its kind:
//! - `none` - Placeholder kind, always invalid
//! - `boolean` - 50/50 booleans
//! - `numeric` - `integer`, `real` and `bit`, with monotonic sequences
//! - `date` - `date` and `time`
//! - `string` - Random alphanumeric strings
//! - `uuid` - Random v4 UUIDs
//! - `values` - Literal lists, weighted maps and named value lists
//! - `array` - PostgreSQL array literals
//! - `interval` - PostgreSQL interval literals
//! - `function` - Named custom functions
//! - `faker` - Locale-aware fake data
//! - `template` - Placeholder templates over the current row
//! - `foreign_key` - Values drawn from the referenced column

pub mod array;
pub mod boolean;
pub mod date;
pub mod faker;
pub mod foreign_key;
pub mod function;
pub mod interval;
pub mod none;
pub mod numeric;
pub mod string;
pub mod template;
pub mod uuid;
pub mod values;

use crate::registry::GeneratorEntry;

/// Entries for every built-in kind.
pub fn default_entries() -> Vec<GeneratorEntry> {
    vec![
        none::entry(),
        boolean::entry(),
        numeric::integer_entry(),
        numeric::real_entry(),
        numeric::bit_entry(),
        date::date_entry(),
        date::time_entry(),
        string::entry(),
        uuid::entry(),
        values::entry(),
        array::entry(),
        interval::entry(),
        function::entry(),
        faker::entry(),
        template::entry(),
        foreign_key::entry(),
    ]
}

/// `table.column`, as used in runtime error messages.
pub(crate) fn qualified(table: &str, column: &str) -> String {
    format!("{table}.{column}")
}
