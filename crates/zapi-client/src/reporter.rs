//! Execution reporting
//!
//! `execute_test` records one test result as: resolve the execution, set its
//! status, attach the report. HTTP success is not enough for either write:
//! the status update must echo the requested status and the upload must
//! carry ZAPI's confirmation marker. A failing step stops the workflow, so a
//! rejected status update never uploads a report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::api::{decode, paths, JobToken, StatusEcho, UploadReceipt, UPLOAD_SUCCESS_MARKER};
use crate::client::ZapiClient;
use crate::error::{ExecuteTestError, ExecutionStep, ZapiError};
use crate::ids::{CycleId, ExecutionId, IssueId, ProjectId, VersionId};
use crate::obs;
use crate::status::ExecutionStatus;
use crate::transport::{FileUpload, Transport};
use crate::Result;

/// Identifiers of one execution, rebuilt from the session on every call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRecord {
    pub issue_key: String,
    pub issue_id: IssueId,
    pub cycle_id: CycleId,
    pub version_id: VersionId,
    pub project_id: ProjectId,
    pub execution_id: ExecutionId,
    pub status: ExecutionStatus,
}

/// Successful result of [`ZapiClient::execute_test`]
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub record: ExecutionRecord,
    /// Server confirmation for the attachment
    pub upload_message: String,
    /// SHA-256 of the uploaded report
    pub report_digest: String,
    pub executed_at: DateTime<Utc>,
}

/// Read a report file into an upload.
///
/// The file is opened, read and closed here; nothing keeps a handle open
/// across the network call. `mime_type` must parse as a media type
/// (`text/html`, `application/xml; charset=utf-8`).
pub async fn read_report(path: &Path, mime_type: &str) -> Result<FileUpload> {
    let mime: mime_guess::Mime = mime_type
        .parse()
        .map_err(|e| ZapiError::InvalidInput(format!("invalid MIME type '{}': {}", mime_type, e)))?;
    if mime.subtype().as_str().is_empty() {
        return Err(ZapiError::InvalidInput(format!(
            "invalid MIME type '{}': missing subtype",
            mime_type
        )));
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ZapiError::InvalidInput(format!("report path has no file name: {}", path.display()))
        })?;
    let bytes = tokio::fs::read(path).await?;

    Ok(FileUpload {
        file_name,
        mime_type: mime_type.to_string(),
        bytes,
    })
}

fn report_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl<T: Transport> ZapiClient<T> {
    /// Set the status of an execution.
    ///
    /// Fails with `StatusMismatch` if the server echoes a different status.
    #[instrument(skip(self))]
    pub async fn update_execution_status(
        &self,
        execution: &ExecutionId,
        status: ExecutionStatus,
    ) -> Result<()> {
        let payload = json!({ "status": status.code() });
        let body = self.api.put(&paths::execute(execution), &payload).await?;
        let echo: StatusEcho = decode(body, "execution update")?;
        let echoed = echo
            .execution_status
            .ok_or_else(|| ZapiError::missing_field("executionStatus", "execution update"))?;

        if echoed.as_i64() == Some(i64::from(status.code())) {
            obs::emit_status_updated(execution.as_str(), status);
            Ok(())
        } else {
            let echoed = echoed.into_string();
            warn!(execution_id = %execution, requested = status.code(), echoed = %echoed, "status update not applied");
            Err(ZapiError::StatusMismatch {
                requested: status.code(),
                echoed,
            })
        }
    }

    /// Attach a report file to an execution.
    pub async fn attach_execution_report(
        &self,
        execution: &ExecutionId,
        report_path: &Path,
        mime_type: &str,
    ) -> Result<String> {
        let upload = read_report(report_path, mime_type).await?;
        self.upload_report(execution, upload).await
    }

    /// Upload already-read report bytes; returns the server's confirmation.
    #[instrument(skip(self, upload), fields(file = %upload.file_name))]
    pub async fn upload_report(&self, execution: &ExecutionId, upload: FileUpload) -> Result<String> {
        let file_name = upload.file_name.clone();
        let body = self.api.post_file(&paths::attachment(execution), upload).await?;
        let raw = body.to_string();
        let receipt: UploadReceipt = decode(body, "attachment upload")?;

        match receipt.success {
            Some(message) if message.contains(UPLOAD_SUCCESS_MARKER) => {
                obs::emit_report_attached(execution.as_str(), &file_name);
                Ok(message)
            }
            other => {
                let message = other.unwrap_or(raw);
                warn!(execution_id = %execution, message = %message, "attachment rejected");
                Err(ZapiError::AttachmentRejected { message })
            }
        }
    }

    /// Record a test result: resolve the issue's execution in the current
    /// cycle, set its status and attach the report.
    ///
    /// Requires resolved version and cycle. The report is read before any
    /// remote write so a missing file cannot leave a half-reported result.
    #[instrument(skip(self, report_path), fields(report = %report_path.display()))]
    pub async fn execute_test(
        &self,
        issue_key: &str,
        status: ExecutionStatus,
        report_path: &Path,
        mime_type: &str,
    ) -> std::result::Result<ExecutionOutcome, ExecuteTestError> {
        let started = Instant::now();

        let (project_id, version_id, cycle_id) = {
            let (p, v, c) = self
                .session
                .require_cycle()
                .map_err(ExecuteTestError::at(ExecutionStep::Precondition))?;
            (p.clone(), v.clone(), c.clone())
        };

        let upload = read_report(report_path, mime_type)
            .await
            .map_err(ExecuteTestError::at(ExecutionStep::ReadReport))?;
        let digest = report_digest(&upload.bytes);

        let (issue_id, execution_id) = self
            .lookup_execution(issue_key)
            .await
            .map_err(ExecuteTestError::at(ExecutionStep::ResolveExecution))?;

        self.update_execution_status(&execution_id, status)
            .await
            .map_err(ExecuteTestError::at(ExecutionStep::UpdateStatus))?;

        let upload_message = self
            .upload_report(&execution_id, upload)
            .await
            .map_err(ExecuteTestError::at(ExecutionStep::AttachReport))?;

        let record = ExecutionRecord {
            issue_key: issue_key.to_string(),
            issue_id,
            cycle_id,
            version_id,
            project_id,
            execution_id,
            status,
        };
        obs::emit_test_executed(
            issue_key,
            record.execution_id.as_str(),
            status,
            started.elapsed().as_millis() as u64,
        );

        Ok(ExecutionOutcome {
            record,
            upload_message,
            report_digest: digest,
            executed_at: Utc::now(),
        })
    }

    /// Add issues to the current cycle. Returns ZAPI's job progress token.
    ///
    /// Requires resolved version and cycle.
    #[instrument(skip(self, issue_keys), fields(count = issue_keys.len()))]
    pub async fn add_tests_to_cycle<S: AsRef<str>>(&self, issue_keys: &[S]) -> Result<String> {
        let (project, version, cycle) = self.session.require_cycle()?;
        let issues: Vec<&str> = issue_keys.iter().map(|k| k.as_ref()).collect();

        let payload = json!({
            "method": "1",
            "projectId": project,
            "versionId": version,
            "cycleId": cycle,
            "issues": issues,
        });
        let body = self.api.post(&paths::add_tests_to_cycle(), &payload).await?;
        let job: JobToken = decode(body, "add tests")?;
        let token = job
            .job_progress_token
            .ok_or_else(|| ZapiError::missing_field("jobProgressToken", "add tests"))?;

        info!(cycle_id = %cycle, job = %token, "tests queued for cycle");
        Ok(token)
    }

    /// Resolve `version` and `cycle`, then add issues to the cycle.
    pub async fn add_tests_to_cycle_named<S: AsRef<str>>(
        &mut self,
        issue_keys: &[S],
        cycle: &str,
        version: &str,
    ) -> Result<String> {
        self.resolve_cycle_in_version(cycle, version).await?;
        self.add_tests_to_cycle(issue_keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_report_digest_is_sha256_hex() {
        let digest = report_digest(b"hello");
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn test_read_report_takes_file_name() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"<testsuite/>").unwrap();

        let upload = read_report(file.path(), "application/xml").await.unwrap();
        assert_eq!(upload.bytes, b"<testsuite/>");
        assert_eq!(upload.mime_type, "application/xml");
        assert_eq!(
            upload.file_name,
            file.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[tokio::test]
    async fn test_read_report_rejects_bad_mime_before_reading() {
        for bad in ["html", "", "text/", "text html"] {
            let err = read_report(Path::new("/nonexistent/report.html"), bad)
                .await
                .unwrap_err();
            assert!(matches!(err, ZapiError::InvalidInput(_)), "accepted {bad:?}");
        }
    }

    #[tokio::test]
    async fn test_read_report_missing_file() {
        let err = read_report(Path::new("/nonexistent/report.html"), "text/html")
            .await
            .unwrap_err();
        assert!(matches!(err, ZapiError::Io(_)));
    }
}
