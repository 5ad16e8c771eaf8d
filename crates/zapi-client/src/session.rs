//! Client-local resolution state
//!
//! One `Session` belongs to one client and tracks which project, version and
//! cycle the client currently points at. A cycle ID is only meaningful for
//! the version that was active when it was resolved; changing the version
//! does not clear it, so callers resolve the version before the cycle.

use crate::error::ZapiError;
use crate::ids::{CycleId, ProjectId, VersionId};
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    project_id: Option<ProjectId>,
    version_id: Option<VersionId>,
    cycle_id: Option<CycleId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    pub fn version_id(&self) -> Option<&VersionId> {
        self.version_id.as_ref()
    }

    pub fn cycle_id(&self) -> Option<&CycleId> {
        self.cycle_id.as_ref()
    }

    pub(crate) fn set_project(&mut self, id: ProjectId) {
        self.project_id = Some(id);
    }

    pub(crate) fn set_version(&mut self, id: VersionId) {
        self.version_id = Some(id);
    }

    pub(crate) fn set_cycle(&mut self, id: CycleId) {
        self.cycle_id = Some(id);
    }

    pub(crate) fn require_project(&self) -> Result<&ProjectId> {
        self.project_id
            .as_ref()
            .ok_or_else(|| ZapiError::InvalidState("Project ID is not set.".to_string()))
    }

    pub(crate) fn require_version(&self) -> Result<(&ProjectId, &VersionId)> {
        let project = self.require_project()?;
        let version = self
            .version_id
            .as_ref()
            .ok_or_else(|| ZapiError::InvalidState("Version ID is not set.".to_string()))?;
        Ok((project, version))
    }

    pub(crate) fn require_cycle(&self) -> Result<(&ProjectId, &VersionId, &CycleId)> {
        let project = self.require_project()?;
        match (&self.version_id, &self.cycle_id) {
            (Some(version), Some(cycle)) => Ok((project, version, cycle)),
            _ => Err(ZapiError::InvalidState(
                "Version ID and Cycle ID must both be set.".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_requires_everything() {
        let session = Session::new();
        assert!(matches!(
            session.require_project(),
            Err(ZapiError::InvalidState(_))
        ));
        assert!(matches!(
            session.require_version(),
            Err(ZapiError::InvalidState(_))
        ));
        assert!(matches!(
            session.require_cycle(),
            Err(ZapiError::InvalidState(_))
        ));
    }

    #[test]
    fn test_cycle_requires_version_even_when_cycle_set() {
        let mut session = Session::new();
        session.set_project(ProjectId::from("10"));
        session.set_cycle(CycleId::from("5"));
        assert!(session.require_cycle().is_err());

        session.set_version(VersionId::from("20"));
        let (p, v, c) = session.require_cycle().unwrap();
        assert_eq!((p.as_str(), v.as_str(), c.as_str()), ("10", "20", "5"));
    }

    #[test]
    fn test_version_change_keeps_stale_cycle() {
        let mut session = Session::new();
        session.set_project(ProjectId::from("10"));
        session.set_version(VersionId::from("20"));
        session.set_cycle(CycleId::from("5"));
        session.set_version(VersionId::from("21"));
        assert_eq!(session.cycle_id(), Some(&CycleId::from("5")));
    }
}
