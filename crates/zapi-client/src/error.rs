//! Error types for zapi-client

use thiserror::Error;

/// Kind of remote resource a lookup was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Version,
    Cycle,
    Issue,
    Execution,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceKind::Project => "project",
            ResourceKind::Version => "version",
            ResourceKind::Cycle => "cycle",
            ResourceKind::Issue => "issue",
            ResourceKind::Execution => "execution",
        };
        f.write_str(s)
    }
}

/// Coarse classification used by reporting pipelines to decide what to do
/// with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The remote system could not be reached or understood. Retrying may help.
    Transport,
    /// The remote system understood the request but rejected the outcome.
    Business,
    /// The caller broke an ordering or configuration contract, or handed over
    /// local input (report file, MIME type) that cannot be used.
    Contract,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureClass::Transport => "transport",
            FailureClass::Business => "business",
            FailureClass::Contract => "contract",
        };
        f.write_str(s)
    }
}

/// Errors that can occur while talking to Jira/ZAPI
#[derive(Error, Debug)]
pub enum ZapiError {
    /// Non-success HTTP status (anything other than 200/201)
    #[error("Unexpected response {status} received")]
    Transport {
        status: u16,
        /// Decoded error body, when the server sent one
        body: Option<serde_json::Value>,
    },

    /// Request never produced a response (DNS, TLS, timeout, ...)
    #[error("HTTP request failed: {0}")]
    Connection(String),

    /// Response body was not JSON or lacked an expected field
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    /// Well-formed response that names no matching resource
    #[error("{kind} {name} not found")]
    NotFound { kind: ResourceKind, name: String },

    /// Operation called before its parent identifiers were resolved
    #[error("Invalid client state: {0}")]
    InvalidState(String),

    /// Status update accepted but the echoed status differs
    #[error("Execution status update failed: requested {requested}, server reports {echoed}")]
    StatusMismatch { requested: i32, echoed: String },

    /// Upload accepted but the confirmation marker is missing
    #[error("File upload failed: {message}")]
    AttachmentRejected { message: String },

    /// Caller-supplied value rejected before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ZapiError {
    pub(crate) fn not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        ZapiError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn missing_field(field: &str, context: &str) -> Self {
        ZapiError::Decode(format!("missing field `{}` in {} response", field, context))
    }

    /// True for the absent-resource outcome consumed by cycle provisioning.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ZapiError::NotFound { .. })
    }

    /// Classify the failure for retry decisions.
    pub fn class(&self) -> FailureClass {
        match self {
            ZapiError::Transport { .. } | ZapiError::Connection(_) | ZapiError::Decode(_) => {
                FailureClass::Transport
            }
            ZapiError::NotFound { .. }
            | ZapiError::StatusMismatch { .. }
            | ZapiError::AttachmentRejected { .. } => FailureClass::Business,
            ZapiError::InvalidState(_)
            | ZapiError::InvalidInput(_)
            | ZapiError::Io(_)
            | ZapiError::Config(_) => FailureClass::Contract,
        }
    }

    /// Whether repeating the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ZapiError::Transport { status, .. } => *status >= 500 || *status == 429,
            ZapiError::Connection(_) => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ZapiError {
    fn from(err: reqwest::Error) -> Self {
        ZapiError::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for ZapiError {
    fn from(err: serde_json::Error) -> Self {
        ZapiError::Decode(err.to_string())
    }
}

/// Step of the execute-test workflow at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStep {
    Precondition,
    ResolveExecution,
    ReadReport,
    UpdateStatus,
    AttachReport,
}

impl std::fmt::Display for ExecutionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionStep::Precondition => "precondition check",
            ExecutionStep::ResolveExecution => "execution lookup",
            ExecutionStep::ReadReport => "report read",
            ExecutionStep::UpdateStatus => "status update",
            ExecutionStep::AttachReport => "report attachment",
        };
        f.write_str(s)
    }
}

/// Failure of [`ZapiClient::execute_test`](crate::ZapiClient::execute_test),
/// tagged with the step that failed.
#[derive(Error, Debug)]
#[error("execute test failed at {step}: {source}")]
pub struct ExecuteTestError {
    pub step: ExecutionStep,
    #[source]
    pub source: ZapiError,
}

impl ExecuteTestError {
    pub(crate) fn at(step: ExecutionStep) -> impl FnOnce(ZapiError) -> Self {
        move |source| ExecuteTestError { step, source }
    }

    pub fn class(&self) -> FailureClass {
        self.source.class()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_business_failure() {
        let err = ZapiError::not_found(ResourceKind::Cycle, "Smoke");
        assert!(err.is_not_found());
        assert_eq!(err.class(), FailureClass::Business);
        assert_eq!(err.to_string(), "cycle Smoke not found");
    }

    #[test]
    fn test_transport_retryability_depends_on_status() {
        let server = ZapiError::Transport {
            status: 503,
            body: None,
        };
        let client = ZapiError::Transport {
            status: 400,
            body: None,
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert_eq!(client.class(), FailureClass::Transport);
    }

    #[test]
    fn test_business_rejections_are_not_retryable() {
        let mismatch = ZapiError::StatusMismatch {
            requested: 1,
            echoed: "2".to_string(),
        };
        let rejected = ZapiError::AttachmentRejected {
            message: "nope".to_string(),
        };
        assert!(!mismatch.is_retryable());
        assert!(!rejected.is_retryable());
        assert_eq!(rejected.class(), FailureClass::Business);
    }

    #[test]
    fn test_local_failures_are_contract_and_final() {
        let missing = ZapiError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "report.html",
        ));
        let bad_mime = ZapiError::InvalidInput("html".to_string());
        assert_eq!(missing.class(), FailureClass::Contract);
        assert_eq!(bad_mime.class(), FailureClass::Contract);
        assert!(!missing.is_retryable());
        assert!(!bad_mime.is_retryable());
    }

    #[test]
    fn test_execute_test_error_names_step() {
        let err = ExecuteTestError::at(ExecutionStep::AttachReport)(
            ZapiError::AttachmentRejected {
                message: "quota".to_string(),
            },
        );
        assert_eq!(err.step, ExecutionStep::AttachReport);
        assert!(err.to_string().contains("report attachment"));
    }
}
