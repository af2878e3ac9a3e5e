//! Trigger DDL for PostgreSQL.
//!
//! The backed-up statement is the full `CREATE TRIGGER` returned by
//! `pg_get_triggerdef`, so restoring replays it verbatim.

use crate::connector::quote;
use trigger_backup::TriggerDefinition;

/// User triggers of some tables of a schema.
///
/// Expects the schema and a `text[]` of table names.
pub const LIST_TRIGGERS_SQL: &str = "SELECT n.nspname::text, tg.tgname::text, c.relname::text, \
     CASE WHEN tg.tgtype & 2 = 2 THEN 'BEFORE' \
          WHEN tg.tgtype & 64 = 64 THEN 'INSTEAD OF' \
          ELSE 'AFTER' END, \
     concat_ws(' OR ', \
          CASE WHEN tg.tgtype & 4 = 4 THEN 'INSERT' END, \
          CASE WHEN tg.tgtype & 8 = 8 THEN 'DELETE' END, \
          CASE WHEN tg.tgtype & 16 = 16 THEN 'UPDATE' END, \
          CASE WHEN tg.tgtype & 32 = 32 THEN 'TRUNCATE' END), \
     pg_get_triggerdef(tg.oid) \
     FROM pg_trigger tg \
     JOIN pg_class c ON c.oid = tg.tgrelid \
     JOIN pg_namespace n ON n.oid = c.relnamespace \
     WHERE NOT tg.tgisinternal AND n.nspname = $1 AND c.relname = ANY($2) \
     ORDER BY c.relname, tg.tgname";

pub fn drop_trigger_sql(trigger: &TriggerDefinition) -> String {
    format!(
        "DROP TRIGGER IF EXISTS {} ON {}.{}",
        quote(&trigger.name),
        quote(&trigger.table_schema),
        quote(&trigger.table)
    )
}

pub fn create_trigger_sql(trigger: &TriggerDefinition) -> String {
    trigger.statement.clone()
}
