//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ConnectorConfig;
use crate::engine::{ActionEngine, ExecuteConfig};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, Transport};
use crate::pagination::{PageFetcher, PaginationConfig};
use crate::params::JsonParameters;
use crate::resources::{Operation, Resource, TriggerResource, RESOURCES};
use crate::state::StateManager;
use crate::trigger::{IncrementalPoller, PollMode, PollerConfig, TriggerTarget};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Resources => self.resources(),
            Commands::Get {
                resource,
                id,
                expand,
            } => self.get(resource, id, expand).await,
            Commands::List {
                resource,
                org,
                all,
                limit,
                expand,
            } => {
                self.list(resource, org.as_deref(), *all, *limit, expand)
                    .await
            }
            Commands::Execute {
                params,
                params_json,
                continue_on_fail,
            } => {
                let params = match (params, params_json) {
                    (Some(path), _) => JsonParameters::from_file(path)?,
                    (None, Some(json)) => JsonParameters::from_json_str(json)?,
                    (None, None) => {
                        return Err(Error::config(
                            "Parameters not specified (use --params or --params-json)",
                        ))
                    }
                };
                self.execute(&params, *continue_on_fail).await
            }
            Commands::Poll {
                resource,
                org,
                expand,
                manual,
                interval,
            } => {
                let target = TriggerTarget::new(resource.parse::<TriggerResource>()?, org.as_str())
                    .expand(expand.as_str());
                self.poll(target, *manual, *interval).await
            }
        }
    }

    /// Load the configuration file, applying command-line overrides
    fn load_config(&self) -> Result<ConnectorConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ConnectorConfig::from_file(path)?,
            None => ConnectorConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
            config.validate()?;
        }

        debug!("Using API at {}", config.base_url);
        Ok(config)
    }

    /// Build the HTTP transport
    fn transport(config: &ConnectorConfig) -> Result<Arc<dyn Transport>> {
        let client = HttpClient::with_config(HttpClientConfig::from(&config.http))?;
        Ok(Arc::new(client))
    }

    /// Open the cursor store; `--state` wins over `state_file` in the config
    fn state_manager(&self, config: &ConnectorConfig) -> Result<StateManager> {
        match self.cli.state.as_ref().or(config.state_file.as_ref()) {
            Some(path) => StateManager::from_file(path),
            None => {
                warn!("No state file configured; poll cursors are kept in memory only");
                Ok(StateManager::in_memory())
            }
        }
    }

    fn engine(config: &ConnectorConfig, execute: ExecuteConfig) -> Result<ActionEngine> {
        let fetcher = PageFetcher::new(Self::transport(config)?, PaginationConfig::from(config));
        Ok(ActionEngine::new(fetcher).with_config(execute))
    }

    /// Print the resource table
    fn resources(&self) -> Result<()> {
        for info in &RESOURCES {
            self.output(&json!({
                "resource": info.tag,
                "path": info.path,
                "displayName": info.display_name,
                "idDisplayName": info.id_display_name,
                "idPlaceholder": info.id_placeholder,
                "organizationScoped": info.resource.is_org_scoped(),
            }))?;
        }
        Ok(())
    }

    /// Fetch one object
    async fn get(&self, resource: &str, id: &str, expand: &str) -> Result<()> {
        let resource: Resource = resource.parse()?;
        let id_param = if resource == Resource::Organization {
            "organizationId"
        } else {
            "resourceId"
        };

        let params = JsonParameters::new()
            .with_param("resource", resource.tag())
            .with_param("operation", Operation::Get.to_string())
            .with_param(id_param, id)
            .with_param("expand", expand);

        self.run_action(&params, ExecuteConfig::default(), false)
            .await
    }

    /// List objects
    async fn list(
        &self,
        resource: &str,
        org: Option<&str>,
        all: bool,
        limit: u32,
        expand: &str,
    ) -> Result<()> {
        let resource: Resource = resource.parse()?;

        let mut params = JsonParameters::new()
            .with_param("resource", resource.tag())
            .with_param("operation", Operation::GetAll.to_string())
            .with_param("returnAll", all)
            .with_param("limit", limit)
            .with_param("expand", expand);
        if let Some(org) = org {
            params = params.with_param("organizationId", org);
        }

        self.run_action(&params, ExecuteConfig::default(), false)
            .await
    }

    /// Run an action over a parameter set, printing paired records
    async fn execute(&self, params: &JsonParameters, continue_on_fail: bool) -> Result<()> {
        let config = ExecuteConfig::new().with_continue_on_fail(continue_on_fail);
        self.run_action(params, config, true).await
    }

    async fn run_action(
        &self,
        params: &JsonParameters,
        execute: ExecuteConfig,
        paired: bool,
    ) -> Result<()> {
        let config = self.load_config()?;
        let mut engine = Self::engine(&config, execute)?;

        let records = engine.execute(params, params.item_count()).await?;
        for record in &records {
            if paired {
                self.output(record)?;
            } else {
                self.output(&record.json)?;
            }
        }

        info!(
            "{} records from {} items ({} errors)",
            engine.stats().records_emitted,
            engine.stats().items_processed,
            engine.stats().errors
        );
        Ok(())
    }

    /// Poll once, or repeatedly with `--interval`
    async fn poll(&self, target: TriggerTarget, manual: bool, interval: Option<u64>) -> Result<()> {
        let config = self.load_config()?;
        let state = self.state_manager(&config)?;
        let poller = IncrementalPoller::new(
            Self::transport(&config)?,
            PollerConfig::from(&config),
            target,
        );
        let mode = if manual {
            PollMode::Manual
        } else {
            PollMode::Trigger
        };

        let Some(secs) = interval else {
            return self.poll_once(&poller, &state, mode).await;
        };
        if secs == 0 {
            return Err(Error::config("--interval must be at least 1 second"));
        }

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C, polling until killed: {e}");
                std::future::pending::<()>().await;
            }
        };
        self.poll_until(&poller, &state, mode, Duration::from_secs(secs), shutdown)
            .await
    }

    /// Poll every `period` until `shutdown` completes.
    ///
    /// Transport errors are logged and the next tick retries; any other error
    /// stops the loop.
    async fn poll_until<F>(
        &self,
        poller: &IncrementalPoller,
        state: &StateManager,
        mode: PollMode,
        period: Duration,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Polling {} every {}s",
            poller.target().key(),
            period.as_secs()
        );
        let mut ticker = tokio::time::interval(period);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("Interrupted, stopping poller");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    match self.poll_once(poller, state, mode).await {
                        Ok(()) => {}
                        Err(e) if e.is_transport() => warn!("Poll failed, will retry: {e}"),
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }

    async fn poll_once(
        &self,
        poller: &IncrementalPoller,
        state: &StateManager,
        mode: PollMode,
    ) -> Result<()> {
        let outcome = poller.poll_with_state(state, mode).await?;
        for item in outcome.items() {
            self.output(item)?;
        }
        Ok(())
    }

    /// Write one value to stdout in the selected format
    fn output<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{line}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::mock::MockTransport;
    use clap::Parser;

    fn poll_fixture(transport: &Arc<MockTransport>) -> (Runner, IncrementalPoller) {
        let cli = Cli::try_parse_from(["hcb", "poll", "--org", "hq", "--interval", "1"]).unwrap();
        let poller = IncrementalPoller::new(
            transport.clone() as Arc<dyn Transport>,
            PollerConfig::with_base_url("https://hcb.test"),
            TriggerTarget::new(TriggerResource::Transaction, "hq"),
        );
        (Runner::new(cli), poller)
    }

    #[test]
    fn test_parse_list_command() {
        let cli = Cli::try_parse_from([
            "hcb", "list", "transaction", "--org", "hq", "--limit", "10", "--format", "pretty",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Pretty);
        match cli.command {
            Commands::List {
                resource,
                org,
                all,
                limit,
                expand,
            } => {
                assert_eq!(resource, "transaction");
                assert_eq!(org.as_deref(), Some("hq"));
                assert!(!all);
                assert_eq!(limit, 10);
                assert!(expand.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_poll_defaults() {
        let cli = Cli::try_parse_from(["hcb", "poll", "--org", "hq"]).unwrap();
        match cli.command {
            Commands::Poll {
                resource,
                manual,
                interval,
                ..
            } => {
                assert_eq!(resource, "transaction");
                assert!(!manual);
                assert_eq!(interval, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_all_with_limit() {
        let result =
            Cli::try_parse_from(["hcb", "list", "donation", "--all", "--limit", "5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_override_is_validated() {
        let cli = Cli::try_parse_from(["hcb", "--base-url", "ftp://example.com", "resources"])
            .unwrap();
        let err = Runner::new(cli).load_config().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let cli = Cli::try_parse_from(["hcb", "--base-url", "http://localhost:3000", "resources"])
            .unwrap();
        let config = Runner::new(cli).load_config().unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_state_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursors.json");
        let cli = Cli::try_parse_from([
            "hcb",
            "--state",
            path.to_str().unwrap(),
            "poll",
            "--org",
            "hq",
        ])
        .unwrap();

        let config = ConnectorConfig {
            state_file: Some(dir.path().join("other.json")),
            ..ConnectorConfig::default()
        };
        let state = Runner::new(cli).state_manager(&config).unwrap();
        assert_eq!(state.path(), path.as_path());
    }

    #[test]
    fn test_command_name() {
        for (args, name) in [
            (vec!["hcb", "resources"], "resources"),
            (vec!["hcb", "get", "card", "crd_1"], "get"),
            (vec!["hcb", "list", "organization"], "list"),
            (vec!["hcb", "execute", "--params-json", "{}"], "execute"),
            (vec!["hcb", "poll", "--org", "hq"], "poll"),
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.command.name(), name);
        }
    }

    #[tokio::test]
    async fn test_poll_loop_stops_on_shutdown() {
        let transport = Arc::new(MockTransport::new());
        transport.push_body(json!([{"id": "txn_a", "date": "2024-03-10"}]));
        let (runner, poller) = poll_fixture(&transport);
        let state = StateManager::in_memory();

        let shutdown = tokio::time::sleep(Duration::from_millis(50));
        runner
            .poll_until(&poller, &state, PollMode::Trigger, Duration::from_secs(1), shutdown)
            .await
            .unwrap();

        // First tick fires at once; the shutdown lands before the second
        assert_eq!(transport.request_count(), 1);
        assert_eq!(
            state.get_cursor("transaction:hq").await.last_item_date.as_deref(),
            Some("2024-03-10")
        );
    }

    #[tokio::test]
    async fn test_poll_loop_checks_shutdown_before_polling() {
        let transport = Arc::new(MockTransport::new());
        let (runner, poller) = poll_fixture(&transport);

        runner
            .poll_until(
                &poller,
                &StateManager::in_memory(),
                PollMode::Trigger,
                Duration::from_secs(1),
                std::future::ready(()),
            )
            .await
            .unwrap();

        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_poll_loop_survives_transport_errors() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(Error::http_status(503, "maintenance"));
        let (runner, poller) = poll_fixture(&transport);

        let shutdown = tokio::time::sleep(Duration::from_millis(50));
        runner
            .poll_until(
                &poller,
                &StateManager::in_memory(),
                PollMode::Trigger,
                Duration::from_secs(1),
                shutdown,
            )
            .await
            .unwrap();

        assert_eq!(transport.request_count(), 1);
    }
}
