use std::time::Duration;

use opsboard_domain::OpsBoardError;
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"attendance::get_monthly_report"`).
/// * `elapsed` - Duration the command execution took.
/// * `success` - Whether the command completed successfully.
///
/// The helper keeps the command wrappers concise and the log shape uniform.
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, "command_execution_failure");
    }
}

/// Convert an `OpsBoardError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &OpsBoardError) -> &'static str {
    match error {
        OpsBoardError::RemoteFetch(_) => "remote_fetch",
        OpsBoardError::RemoteMutation(_) => "remote_mutation",
        OpsBoardError::Validation(_) => "validation",
        OpsBoardError::Forbidden(_) => "forbidden",
        OpsBoardError::Conflict(_) => "conflict",
        OpsBoardError::NotFound(_) => "not_found",
        OpsBoardError::Config(_) => "config",
        OpsBoardError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_labels_are_stable() {
        assert_eq!(error_label(&OpsBoardError::RemoteFetch("x".into())), "remote_fetch");
        assert_eq!(error_label(&OpsBoardError::Conflict("x".into())), "conflict");
        assert_eq!(error_label(&OpsBoardError::Forbidden("x".into())), "forbidden");
    }
}
