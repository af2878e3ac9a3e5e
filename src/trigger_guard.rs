//! Drops a table's triggers for the duration of its fill.

use fill_core::{ConnectorError, DatabaseConnector};
use tracing::{error, info};

/// Triggers of one table, dropped until [`TriggerGuard::release`].
///
/// Release is explicit and async. A guard must be released on both the
/// success and the failure path of the fill.
#[must_use = "a trigger guard must be released to restore the triggers"]
pub struct TriggerGuard<'a> {
    connector: &'a dyn DatabaseConnector,
    table: String,
    engaged: bool,
}

impl<'a> TriggerGuard<'a> {
    /// Drop the table's backed-up triggers when `disable` is set.
    ///
    /// If dropping fails, whatever was dropped is restored before the error is
    /// returned.
    pub async fn engage(
        connector: &'a dyn DatabaseConnector,
        table: &str,
        disable: bool,
    ) -> Result<TriggerGuard<'a>, ConnectorError> {
        let guard = Self {
            connector,
            table: table.to_string(),
            engaged: disable,
        };
        if !disable {
            return Ok(guard);
        }
        info!("Disabling triggers on {table}");
        if let Err(e) = connector.disable_triggers(table).await {
            guard.release().await;
            return Err(e);
        }
        Ok(guard)
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Recreate the dropped triggers. Failures are logged, never returned.
    pub async fn release(self) {
        if !self.engaged {
            return;
        }
        if let Err(e) = self.connector.enable_triggers(&self.table).await {
            error!("Failed to restore triggers on {}: {e}", self.table);
        }
    }
}
