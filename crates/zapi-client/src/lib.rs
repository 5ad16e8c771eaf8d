//! zapi-client: Zephyr for Jira (ZAPI) test-execution reporting
//!
//! A stateful client that walks the project → version → cycle → issue →
//! execution hierarchy by name, creates missing test cycles, and records
//! test results (status + report attachment) as one operation.
//!
//! ## Key Components
//!
//! - `ZapiClient`: one session bound to one project; caches resolved version
//!   and cycle IDs
//! - `Transport`: send-one-request seam, implemented by `HttpTransport`
//!   (reqwest) and `fakes::ScriptedTransport` (tests)
//! - `ZapiError` / `ExecuteTestError`: typed failures separating transport
//!   problems from business rejections
//!
//! ## Ordering
//!
//! Version-scoped calls need a resolved project, cycle-scoped calls a
//! resolved version, execution-scoped calls a resolved cycle. Calling out of
//! order returns `ZapiError::InvalidState` without touching the network.

mod api;
mod client;
mod config;
mod error;
pub mod fakes;
mod http;
mod ids;
pub mod obs;
mod provisioner;
mod reporter;
mod resolver;
mod session;
mod status;
pub mod telemetry;
mod transport;

pub use api::UPLOAD_SUCCESS_MARKER;
pub use client::ZapiClient;
pub use config::{encode_auth_key, ZapiConfig, DEFAULT_TIMEOUT_SECS};
pub use error::{ExecuteTestError, ExecutionStep, FailureClass, ResourceKind, ZapiError};
pub use http::{HttpTransport, XSRF_HEADER};
pub use ids::{CycleId, ExecutionId, IssueId, ProjectId, VersionId};
pub use reporter::{read_report, ExecutionOutcome, ExecutionRecord};
pub use session::Session;
pub use status::ExecutionStatus;
pub use telemetry::init_tracing;
pub use transport::{FileUpload, RawResponse, Transport};

/// Result type for zapi-client operations
pub type Result<T> = std::result::Result<T, ZapiError>;
