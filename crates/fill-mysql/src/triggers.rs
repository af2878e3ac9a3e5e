//! Trigger DDL for MariaDB/MySQL.

use crate::connector::quote;
use trigger_backup::TriggerDefinition;

/// Catalog query listing the triggers of some tables of a schema.
///
/// Expects the schema followed by one parameter per table.
pub fn list_triggers_sql(table_count: usize) -> String {
    let placeholders = vec!["?"; table_count].join(", ");
    format!(
        "SELECT TRIGGER_SCHEMA, TRIGGER_NAME, EVENT_OBJECT_SCHEMA, EVENT_OBJECT_TABLE, \
         ACTION_TIMING, EVENT_MANIPULATION, ACTION_STATEMENT, DEFINER \
         FROM information_schema.TRIGGERS \
         WHERE EVENT_OBJECT_SCHEMA = ? AND EVENT_OBJECT_TABLE IN ({placeholders}) \
         ORDER BY EVENT_OBJECT_TABLE, ACTION_ORDER"
    )
}

pub fn drop_trigger_sql(trigger: &TriggerDefinition) -> String {
    format!(
        "DROP TRIGGER IF EXISTS {}.{}",
        quote(&trigger.schema),
        quote(&trigger.name)
    )
}

/// `root@%` becomes `'root'@'%'`.
fn definer_clause(definer: &str) -> String {
    match definer.rsplit_once('@') {
        Some((user, host)) => format!(
            "'{}'@'{}'",
            user.trim_matches('`').replace('\'', "''"),
            host.trim_matches('`').replace('\'', "''")
        ),
        None => format!("'{}'", definer.replace('\'', "''")),
    }
}

pub fn create_trigger_sql(trigger: &TriggerDefinition) -> String {
    let definer = trigger
        .definer
        .as_deref()
        .map(|d| format!("DEFINER = {} ", definer_clause(d)))
        .unwrap_or_default();
    format!(
        "CREATE {definer}TRIGGER {}.{} {} {} ON {}.{} FOR EACH ROW {}",
        quote(&trigger.schema),
        quote(&trigger.name),
        trigger.timing,
        trigger.event,
        quote(&trigger.table_schema),
        quote(&trigger.table),
        trigger.statement
    )
}
