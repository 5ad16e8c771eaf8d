//! Structured lifecycle events for reporting sessions.
//!
//! Each function emits one named event (`event = "..."`) so log pipelines can
//! follow a test run without parsing messages. For JSON output, initialise
//! logging with [`init_tracing`](crate::init_tracing) and `json = true`.

use tracing::{debug, info};

use crate::error::ResourceKind;
use crate::status::ExecutionStatus;

/// Emit event: a name was resolved to a server ID.
pub fn emit_resolved(kind: ResourceKind, name: &str, id: &str) {
    if kind == ResourceKind::Execution {
        debug!(event = "resource.resolved", kind = %kind, name = %name, id = %id);
    } else {
        info!(event = "resource.resolved", kind = %kind, name = %name, id = %id);
    }
}

/// Emit event: a missing cycle was created.
pub fn emit_cycle_created(name: &str, cycle_id: &str, version_id: &str) {
    info!(
        event = "cycle.created",
        name = %name,
        cycle_id = %cycle_id,
        version_id = %version_id,
    );
}

/// Emit event: execution status accepted and echoed back.
pub fn emit_status_updated(execution_id: &str, status: ExecutionStatus) {
    info!(
        event = "execution.status_updated",
        execution_id = %execution_id,
        status = %status,
        code = status.code(),
    );
}

/// Emit event: report attachment confirmed.
pub fn emit_report_attached(execution_id: &str, file_name: &str) {
    info!(event = "execution.report_attached", execution_id = %execution_id, file = %file_name);
}

/// Emit event: full execute-test workflow finished.
pub fn emit_test_executed(issue_key: &str, execution_id: &str, status: ExecutionStatus, duration_ms: u64) {
    info!(
        event = "test.executed",
        issue = %issue_key,
        execution_id = %execution_id,
        status = %status,
        duration_ms = duration_ms,
    );
}
