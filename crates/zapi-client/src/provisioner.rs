//! Get-or-create for test cycles
//!
//! Only the `NotFound` outcome of a cycle lookup leads to creation. Any other
//! failure (transport, decode, missing version) is returned as is. Two
//! provisioning calls on the same client cannot overlap because both need
//! `&mut self`; separate clients racing on the same remote version are not
//! coordinated.

use serde_json::json;
use tracing::{info, instrument};

use crate::api::{decode, paths, Identified};
use crate::client::ZapiClient;
use crate::error::ZapiError;
use crate::ids::CycleId;
use crate::obs;
use crate::transport::Transport;
use crate::Result;

impl<T: Transport> ZapiClient<T> {
    /// Return the ID of the named cycle in the current version, creating the
    /// cycle if the version has none by that name.
    ///
    /// Requires a resolved version.
    #[instrument(skip(self))]
    pub async fn get_or_create_cycle(&mut self, name: &str) -> Result<CycleId> {
        self.session.require_version()?;

        match self.resolve_cycle(name).await {
            Ok(id) => Ok(id),
            Err(ZapiError::NotFound { .. }) => {
                info!(cycle = name, "cycle not found, creating");
                self.create_cycle(name).await
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve `version`, then get or create the cycle within it.
    pub async fn get_or_create_cycle_in_version(
        &mut self,
        cycle: &str,
        version: &str,
    ) -> Result<CycleId> {
        self.resolve_version(version).await?;
        self.get_or_create_cycle(cycle).await
    }

    async fn create_cycle(&mut self, name: &str) -> Result<CycleId> {
        let (project, version) = {
            let (p, v) = self.session.require_version()?;
            (p.clone(), v.clone())
        };

        let payload = json!({
            "name": name,
            "projectId": project,
            "versionId": version,
        });
        let body = self.api.post(&paths::create_cycle(), &payload).await?;
        let created: Identified = decode(body, "cycle create")?;
        let id = created
            .id
            .map(|id| CycleId(id.into_string()))
            .ok_or_else(|| ZapiError::missing_field("id", "cycle create"))?;

        self.session.set_cycle(id.clone());
        obs::emit_cycle_created(name, id.as_str(), version.as_str());
        Ok(id)
    }
}
