//! Name → ID resolution
//!
//! Each lookup is a single GET scoped by the parent IDs already held in the
//! session. Version and cycle lookups scan a listing for a case-insensitive
//! name match; the first match in server order wins.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::api::{
    cycle_entries, decode, find_by_label, is_empty_body, paths, ExecutionList, Identified,
    VersionBoard,
};
use crate::client::ZapiClient;
use crate::error::{ResourceKind, ZapiError};
use crate::ids::{CycleId, ExecutionId, IssueId, ProjectId, VersionId};
use crate::obs;
use crate::transport::Transport;
use crate::Result;

/// Pull `id` out of a single-resource lookup body.
fn lookup_id(body: Value, kind: ResourceKind, name: &str) -> Result<String> {
    if is_empty_body(&body) {
        return Err(ZapiError::not_found(kind, name));
    }
    let context = format!("{} lookup", kind);
    let found: Identified = decode(body, &context)?;
    found
        .id
        .map(|id| id.into_string())
        .ok_or_else(|| ZapiError::missing_field("id", &context))
}

impl<T: Transport> ZapiClient<T> {
    /// Resolve a project by name and bind the session to it.
    #[instrument(skip(self))]
    pub async fn resolve_project(&mut self, name: &str) -> Result<ProjectId> {
        let body = self.api.get(&paths::project(name)).await?;
        let id = ProjectId(lookup_id(body, ResourceKind::Project, name)?);

        self.session.set_project(id.clone());
        obs::emit_resolved(ResourceKind::Project, name, id.as_str());
        Ok(id)
    }

    /// Resolve an unreleased version of the current project.
    ///
    /// On `NotFound` the cached version is left untouched.
    #[instrument(skip(self))]
    pub async fn resolve_version(&mut self, name: &str) -> Result<VersionId> {
        let project = self.session.require_project()?.clone();

        let body = self.api.get(&paths::versions(&project)).await?;
        let board: VersionBoard = decode(body, "version board")?;
        let versions = board
            .unreleased_versions
            .ok_or_else(|| ZapiError::missing_field("unreleasedVersions", "version board"))?;

        let id = find_by_label(&versions, name, |v| v.label.as_str())
            .map(|v| v.value.clone())
            .ok_or_else(|| ZapiError::not_found(ResourceKind::Version, name))?;

        self.session.set_version(id.clone());
        obs::emit_resolved(ResourceKind::Version, name, id.as_str());
        Ok(id)
    }

    /// Resolve a test cycle of the current project and version.
    ///
    /// Requires a resolved version.
    #[instrument(skip(self))]
    pub async fn resolve_cycle(&mut self, name: &str) -> Result<CycleId> {
        let (project, version) = {
            let (p, v) = self.session.require_version()?;
            (p.clone(), v.clone())
        };

        let body = self.api.get(&paths::cycles(&project, &version)).await?;
        let listing = body
            .as_object()
            .ok_or_else(|| ZapiError::Decode("cycle list response is not an object".to_string()))?;
        let entries = cycle_entries(listing);

        let id = find_by_label(&entries, name, |(_, n)| n.as_str())
            .map(|(id, _)| id.clone())
            .ok_or_else(|| ZapiError::not_found(ResourceKind::Cycle, name))?;

        self.session.set_cycle(id.clone());
        obs::emit_resolved(ResourceKind::Cycle, name, id.as_str());
        Ok(id)
    }

    /// Resolve `version`, then the cycle within it.
    pub async fn resolve_cycle_in_version(&mut self, cycle: &str, version: &str) -> Result<CycleId> {
        self.resolve_version(version).await?;
        self.resolve_cycle(cycle).await
    }

    /// Resolve an issue key (e.g. `DEMO-42`) to its numeric ID.
    #[instrument(skip(self))]
    pub async fn resolve_issue(&self, key: &str) -> Result<IssueId> {
        self.session.require_project()?;

        let body = self.api.get(&paths::issue(key)).await?;
        let id = IssueId(lookup_id(body, ResourceKind::Issue, key)?);
        debug!(issue = key, issue_id = %id, "issue resolved");
        Ok(id)
    }

    /// Resolve the execution of an issue in the current cycle.
    ///
    /// Requires resolved version and cycle. When the server lists several
    /// executions for the issue, the first one is used.
    pub async fn resolve_execution(&self, issue_key: &str) -> Result<ExecutionId> {
        self.lookup_execution(issue_key).await.map(|(_, id)| id)
    }

    #[instrument(skip(self))]
    pub(crate) async fn lookup_execution(&self, issue_key: &str) -> Result<(IssueId, ExecutionId)> {
        let (project, version, cycle) = {
            let (p, v, c) = self.session.require_cycle()?;
            (p.clone(), v.clone(), c.clone())
        };

        let issue = self.resolve_issue(issue_key).await?;
        let body = self
            .api
            .get(&paths::executions(&cycle, &project, &version, &issue))
            .await?;
        let list: ExecutionList = decode(body, "execution list")?;
        let executions = list
            .executions
            .ok_or_else(|| ZapiError::missing_field("executions", "execution list"))?;

        if executions.len() > 1 {
            debug!(
                issue = issue_key,
                count = executions.len(),
                "multiple executions in cycle, using the first"
            );
        }
        let id = executions
            .into_iter()
            .next()
            .map(|e| e.id)
            .ok_or_else(|| ZapiError::not_found(ResourceKind::Execution, issue_key))?;

        obs::emit_resolved(ResourceKind::Execution, issue_key, id.as_str());
        Ok((issue, id))
    }
}
