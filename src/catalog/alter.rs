//! Sequential execution of rendered DDL.

use crate::error::CatalogError;
use crate::executor::CatalogExecutor;
use std::fmt;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

/// Where an alteration request currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterPhase {
    Idle,
    Diffing,
    Emitting,
    Executing,
    Refreshing,
    Failed,
}

impl fmt::Display for AlterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlterPhase::Idle => "idle",
            AlterPhase::Diffing => "diffing",
            AlterPhase::Emitting => "emitting",
            AlterPhase::Executing => "executing",
            AlterPhase::Refreshing => "refreshing",
            AlterPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Run `statements` one after another, stopping at the first rejection
///
/// Statements that already ran are not rolled back. Returns how many statements executed.
///
/// # Errors
///
/// `CatalogError::ExecutionFailure` carrying the rejected statement and the connection error.
pub fn execute_statements(
    executor: &dyn CatalogExecutor,
    statements: &[String],
    log_statements: bool,
) -> Result<usize, CatalogError> {
    for (executed, statement) in statements.iter().enumerate() {
        if log_statements {
            log::info!("executing: {statement}");
        } else {
            log::debug!("executing: {statement}");
        }

        if let Err(source) = executor.execute(statement, &[]) {
            log::error!(
                "statement {} of {} rejected, {executed} already applied: {source}",
                executed + 1,
                statements.len()
            );
            return Err(CatalogError::ExecutionFailure {
                statement: statement.clone(),
                source,
            });
        }
    }
    Ok(statements.len())
}

pub(crate) fn record_outcome(result: &Result<(), CatalogError>) {
    #[cfg(feature = "metrics")]
    match result {
        Ok(()) => METRICS.record_alteration(),
        Err(e) if e.is_unsupported() => METRICS.record_rejected_alteration(),
        Err(_) => {}
    }
    #[cfg(not(feature = "metrics"))]
    let _ = result;
}
