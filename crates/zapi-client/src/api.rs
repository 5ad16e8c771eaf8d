//! Remote paths and response handling for the Jira and ZAPI endpoints
//!
//! Every call goes through [`Api`], which turns a [`RawResponse`] into either
//! decoded JSON (status 200 or 201) or a [`ZapiError::Transport`] carrying the
//! status and whatever error body the server sent.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ZapiError;
use crate::ids::{CycleId, ExecutionId, IssueId, LooseId, ProjectId, VersionId};
use crate::transport::{FileUpload, RawResponse, Transport};
use crate::Result;

/// Marker ZAPI puts in the `success` field of a successful attachment upload
pub const UPLOAD_SUCCESS_MARKER: &str = "successfully uploaded";

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

pub(crate) mod paths {
    use super::*;

    fn enc(s: &str) -> std::borrow::Cow<'_, str> {
        urlencoding::encode(s)
    }

    pub fn project(name: &str) -> String {
        format!("rest/api/2/project/{}", enc(name))
    }

    pub fn versions(project: &ProjectId) -> String {
        format!(
            "rest/zapi/latest/util/versionBoard-list?projectId={}",
            enc(project.as_str())
        )
    }

    pub fn cycles(project: &ProjectId, version: &VersionId) -> String {
        format!(
            "rest/zapi/latest/cycle?projectId={}&versionId={}",
            enc(project.as_str()),
            enc(version.as_str())
        )
    }

    pub fn create_cycle() -> String {
        "rest/zapi/latest/cycle/".to_string()
    }

    pub fn issue(key: &str) -> String {
        format!("rest/api/2/issue/{}", enc(key))
    }

    pub fn executions(
        cycle: &CycleId,
        project: &ProjectId,
        version: &VersionId,
        issue: &IssueId,
    ) -> String {
        format!(
            "rest/zapi/latest/execution?cycleId={}&projectId={}&versionId={}&issueId={}",
            enc(cycle.as_str()),
            enc(project.as_str()),
            enc(version.as_str()),
            enc(issue.as_str())
        )
    }

    pub fn execute(execution: &ExecutionId) -> String {
        format!("rest/zapi/latest/execution/{}/execute", enc(execution.as_str()))
    }

    pub fn attachment(execution: &ExecutionId) -> String {
        format!(
            "rest/zapi/latest/attachment?entityId={}&entityType=Execution",
            enc(execution.as_str())
        )
    }

    pub fn add_tests_to_cycle() -> String {
        "rest/zapi/latest/execution/addTestsToCycle/".to_string()
    }
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// Body of project and issue lookups; only the ID is used
#[derive(Debug, Deserialize)]
pub(crate) struct Identified {
    pub id: Option<LooseId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersionBoard {
    #[serde(rename = "unreleasedVersions")]
    pub unreleased_versions: Option<Vec<VersionEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersionEntry {
    pub label: String,
    pub value: VersionId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExecutionList {
    pub executions: Option<Vec<ExecutionEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExecutionEntry {
    pub id: ExecutionId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusEcho {
    #[serde(rename = "executionStatus")]
    pub execution_status: Option<LooseId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadReceipt {
    pub success: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobToken {
    #[serde(rename = "jobProgressToken")]
    pub job_progress_token: Option<String>,
}

/// Cycle-list entries in server order.
///
/// The listing is an object keyed by cycle ID with a few non-cycle members
/// (e.g. `recordsCount`) mixed in; only object members with a string `name`
/// are cycles.
pub(crate) fn cycle_entries(listing: &serde_json::Map<String, Value>) -> Vec<(CycleId, String)> {
    listing
        .iter()
        .filter_map(|(key, value)| {
            let name = value.as_object()?.get("name")?.as_str()?;
            Some((CycleId(key.clone()), name.to_string()))
        })
        .collect()
}

/// First entry whose label matches `name`, ignoring case.
pub(crate) fn find_by_label<'a, T>(
    entries: &'a [T],
    name: &str,
    label: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let wanted = name.to_lowercase();
    entries.iter().find(|e| label(e).to_lowercase() == wanted)
}

/// Whether a successful lookup body signals "nothing here".
pub(crate) fn is_empty_body(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Turn a raw response into JSON, or a transport failure for any status
/// other than 200/201.
pub(crate) fn classify(response: RawResponse) -> Result<Value> {
    match response.status {
        200 | 201 => {
            if response.body.trim().is_empty() {
                return Ok(Value::Null);
            }
            Ok(serde_json::from_str(&response.body)?)
        }
        status => {
            let body = serde_json::from_str::<Value>(&response.body).ok();
            warn!(status, body = %response.body, "unexpected response");
            Err(ZapiError::Transport { status, body })
        }
    }
}

/// Decode an already classified body into a typed shape.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, context: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ZapiError::Decode(format!("{} response: {}", context, e)))
}

/// Transport wrapper that applies classification to every call
pub(crate) struct Api<T> {
    transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(transport: T) -> Self {
        Api { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        debug!(path, "GET");
        classify(self.transport.get(path).await?)
    }

    pub async fn post(&self, path: &str, payload: &Value) -> Result<Value> {
        debug!(path, "POST");
        classify(self.transport.post(path, payload).await?)
    }

    pub async fn put(&self, path: &str, payload: &Value) -> Result<Value> {
        debug!(path, "PUT");
        classify(self.transport.put(path, payload).await?)
    }

    pub async fn post_file(&self, path: &str, upload: FileUpload) -> Result<Value> {
        debug!(path, file = %upload.file_name, "POST multipart");
        classify(self.transport.post_multipart(path, upload).await?)
    }
}
