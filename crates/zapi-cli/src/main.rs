//! ZAPI CLI - report test results to Zephyr for Jira
//!
//! The `zapi` command resolves Jira/ZAPI identifiers by name and records
//! test executions.
//!
//! ## Commands
//!
//! - `auth-key`: Print the Basic auth token for a user/password pair
//! - `project` / `version` / `cycle` / `issue`: Resolve names to IDs
//! - `add-tests`: Schedule issues in a test cycle
//! - `execute`: Set an execution's status and attach a report
//!
//! Connection settings come from `--config <file>`, `./jira.properties`, or
//! the `JIRA_*` environment variables, in that order.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use zapi_client::{
    encode_auth_key, CycleId, ExecuteTestError, ExecutionStatus, FailureClass, ZapiClient,
    ZapiConfig, ZapiError,
};

/// Properties file picked up from the working directory when no `--config` is given
const DEFAULT_CONFIG_FILE: &str = "jira.properties";

#[derive(Parser)]
#[command(name = "zapi")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Report test executions to Zephyr for Jira (ZAPI)", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Connection properties file (url, user, pass, authKey, projectName)
    #[arg(short, long, global = true, env = "ZAPI_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured project name
    #[arg(short, long, global = true)]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Basic auth token for a user/password pair
    AuthKey {
        /// Jira user name
        #[arg(short, long)]
        user: String,

        /// Jira password or API token
        #[arg(long, env = "JIRA_PASS", hide_env_values = true)]
        pass: String,
    },

    #[command(flatten)]
    Remote(RemoteCommand),
}

/// Commands that talk to Jira
#[derive(Subcommand)]
enum RemoteCommand {
    /// Resolve the configured project to its ID
    Project,

    /// Resolve an unreleased version to its ID
    Version {
        /// Version name (case-insensitive)
        name: String,
    },

    /// Resolve (or create) a test cycle in a version
    Cycle {
        /// Cycle name (case-insensitive)
        name: String,

        /// Version the cycle belongs to
        #[arg(long)]
        version: String,

        /// Create the cycle if it does not exist
        #[arg(long)]
        create: bool,
    },

    /// Resolve an issue key to its ID
    Issue {
        /// Issue key (e.g. DEMO-42)
        key: String,
    },

    /// Add issues to a test cycle
    AddTests {
        /// Version the cycle belongs to
        #[arg(long)]
        version: String,

        /// Target cycle
        #[arg(long)]
        cycle: String,

        /// Create the cycle if it does not exist
        #[arg(long)]
        create_cycle: bool,

        /// Issue keys to add
        #[arg(required = true)]
        issues: Vec<String>,
    },

    /// Record a test result: update execution status and attach a report
    Execute {
        /// Version the cycle belongs to
        #[arg(long)]
        version: String,

        /// Cycle holding the execution
        #[arg(long)]
        cycle: String,

        /// Create the cycle if it does not exist
        #[arg(long)]
        create_cycle: bool,

        /// Issue key of the test
        #[arg(short, long)]
        issue: String,

        /// Result: pass, fail, in-progress, block, unexecuted (or a status code)
        #[arg(short, long)]
        status: ExecutionStatus,

        /// Report file to attach
        #[arg(short, long)]
        report: PathBuf,

        /// MIME type of the report (guessed from the extension if omitted)
        #[arg(long)]
        mime: Option<String>,
    },
}

#[derive(Serialize)]
struct CyclePosition<'a> {
    project: &'a str,
    version_id: Option<&'a str>,
    cycle_id: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    zapi_client::init_tracing(cli.json, level);

    match cli.command {
        Commands::AuthKey { user, pass } => {
            println!("{}", encode_auth_key(&user, &pass));
            Ok(())
        }
        Commands::Remote(command) => {
            let config = load_config(cli.config.as_deref(), cli.project.as_deref())?;
            run_remote(command, &config).await
        }
    }
}

/// Connect to the configured project and run one remote command
async fn run_remote(command: RemoteCommand, config: &ZapiConfig) -> Result<()> {
    let mut client = ZapiClient::connect(config)
        .await
        .classified(|| format!("connecting to Jira project {}", config.project_name))?;

    match command {
        RemoteCommand::Project => cmd_project(&client),
        RemoteCommand::Version { name } => cmd_version(&mut client, &name).await,
        RemoteCommand::Cycle {
            name,
            version,
            create,
        } => cmd_cycle(&mut client, config, &name, &version, create).await,
        RemoteCommand::Issue { key } => cmd_issue(&client, &key).await,
        RemoteCommand::AddTests {
            version,
            cycle,
            create_cycle,
            issues,
        } => cmd_add_tests(&mut client, &version, &cycle, create_cycle, &issues).await,
        RemoteCommand::Execute {
            version,
            cycle,
            create_cycle,
            issue,
            status,
            report,
            mime,
        } => {
            cmd_execute(
                &mut client,
                &version,
                &cycle,
                create_cycle,
                &issue,
                status,
                &report,
                mime.as_deref(),
            )
            .await
        }
    }
}

/// Attach the failure class to client errors so every failure line says
/// whether it was a transport, business or contract problem.
trait Classified<T> {
    fn classified<F: FnOnce() -> String>(self, what: F) -> Result<T>;
}

fn with_class<E>(err: E, class: FailureClass, what: String) -> anyhow::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    anyhow::Error::new(err).context(format!("{} failure while {}", class, what))
}

impl<T> Classified<T> for std::result::Result<T, ZapiError> {
    fn classified<F: FnOnce() -> String>(self, what: F) -> Result<T> {
        self.map_err(|e| {
            let class = e.class();
            with_class(e, class, what())
        })
    }
}

impl<T> Classified<T> for std::result::Result<T, ExecuteTestError> {
    fn classified<F: FnOnce() -> String>(self, what: F) -> Result<T> {
        self.map_err(|e| {
            let class = e.class();
            with_class(e, class, what())
        })
    }
}

/// Load connection settings: explicit file, then ./jira.properties, then env
fn load_config(path: Option<&Path>, project: Option<&str>) -> Result<ZapiConfig> {
    let default_file = Path::new(DEFAULT_CONFIG_FILE);
    let config = match path {
        Some(path) => ZapiConfig::from_file(path)
            .classified(|| format!("loading config from {}", path.display()))?,
        None if default_file.exists() => ZapiConfig::from_file(default_file)
            .classified(|| format!("loading ./{}", DEFAULT_CONFIG_FILE))?,
        None => ZapiConfig::from_env()
            .classified(|| "loading config from JIRA_* variables".to_string())?,
    };

    Ok(match project {
        Some(project) => config.with_project(project),
        None => config,
    })
}

/// Point the client at `version`/`cycle`, optionally creating the cycle
async fn position<T: zapi_client::Transport>(
    client: &mut ZapiClient<T>,
    version: &str,
    cycle: &str,
    create: bool,
) -> Result<CycleId> {
    let id = if create {
        client.get_or_create_cycle_in_version(cycle, version).await
    } else {
        client.resolve_cycle_in_version(cycle, version).await
    };
    id.classified(|| format!("resolving cycle '{}' in version '{}'", cycle, version))
}

fn cmd_project<T: zapi_client::Transport>(client: &ZapiClient<T>) -> Result<()> {
    let id = client
        .session()
        .project_id()
        .context("contract failure: project was not resolved")?;
    println!("{}", id);
    Ok(())
}

async fn cmd_version<T: zapi_client::Transport>(client: &mut ZapiClient<T>, name: &str) -> Result<()> {
    let id = client
        .resolve_version(name)
        .await
        .classified(|| format!("resolving version '{}'", name))?;
    println!("{}", id);
    Ok(())
}

async fn cmd_cycle<T: zapi_client::Transport>(
    client: &mut ZapiClient<T>,
    config: &ZapiConfig,
    name: &str,
    version: &str,
    create: bool,
) -> Result<()> {
    let cycle_id = position(client, version, name, create).await?;

    let summary = CyclePosition {
        project: &config.project_name,
        version_id: client.session().version_id().map(|v| v.as_str()),
        cycle_id: cycle_id.as_str(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn cmd_issue<T: zapi_client::Transport>(client: &ZapiClient<T>, key: &str) -> Result<()> {
    let id = client
        .resolve_issue(key)
        .await
        .classified(|| format!("resolving issue '{}'", key))?;
    println!("{}", id);
    Ok(())
}

async fn cmd_add_tests<T: zapi_client::Transport>(
    client: &mut ZapiClient<T>,
    version: &str,
    cycle: &str,
    create_cycle: bool,
    issues: &[String],
) -> Result<()> {
    position(client, version, cycle, create_cycle).await?;

    let token = client
        .add_tests_to_cycle(issues)
        .await
        .classified(|| format!("adding {} tests to cycle '{}'", issues.len(), cycle))?;
    info!(count = issues.len(), cycle = %cycle, "tests added");
    println!("{}", token);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_execute<T: zapi_client::Transport>(
    client: &mut ZapiClient<T>,
    version: &str,
    cycle: &str,
    create_cycle: bool,
    issue: &str,
    status: ExecutionStatus,
    report: &Path,
    mime: Option<&str>,
) -> Result<()> {
    position(client, version, cycle, create_cycle).await?;

    let mime = match mime {
        Some(m) => m.to_string(),
        None => mime_guess::from_path(report)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };

    let outcome = client
        .execute_test(issue, status, report, &mime)
        .await
        .classified(|| format!("reporting {} as {}", issue, status))?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
