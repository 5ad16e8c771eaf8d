//! `ZapiClient` - one stateful session against one Jira project
//!
//! The client owns its [`Session`]; every operation that resolves an ID takes
//! `&mut self`, so one client cannot be driven by two resolution chains at
//! once. Operations are implemented across three modules:
//!
//! - `resolver`: name → ID lookups (project, version, cycle, issue, execution)
//! - `provisioner`: get-or-create for test cycles
//! - `reporter`: status updates, report attachments and the execute-test workflow

use tracing::{info, instrument};

use crate::api::Api;
use crate::config::ZapiConfig;
use crate::http::HttpTransport;
use crate::session::Session;
use crate::transport::Transport;
use crate::Result;

/// Stateful ZAPI client
pub struct ZapiClient<T = HttpTransport> {
    pub(crate) api: Api<T>,
    pub(crate) session: Session,
}

impl ZapiClient<HttpTransport> {
    /// Build an HTTP client and resolve the configured project.
    ///
    /// # Example
    /// ```ignore
    /// let config = ZapiConfig::from_env()?;
    /// let mut client = ZapiClient::connect(&config).await?;
    /// client.get_or_create_cycle_in_version("Smoke", "2.0").await?;
    /// ```
    #[instrument(skip(config), fields(base_url = %config.base_url, project = %config.project_name))]
    pub async fn connect(config: &ZapiConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        let mut client = ZapiClient::new(transport);
        client.resolve_project(&config.project_name).await?;
        info!("ZAPI client connected");
        Ok(client)
    }
}

impl<T: Transport> ZapiClient<T> {
    /// Create a client with an empty session over any transport
    pub fn new(transport: T) -> Self {
        ZapiClient {
            api: Api::new(transport),
            session: Session::new(),
        }
    }

    /// Current resolution state
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        self.api.transport()
    }
}
