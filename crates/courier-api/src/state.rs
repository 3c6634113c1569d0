//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over the template repository, but AppState pins them
//! to the JSON document in the data directory and the offline transport.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use courier_core::account::{AccountRegistry, ChallengeHandler};
use courier_core::dialog::DialogResolver;
use courier_core::dispatch::Dispatcher;
use courier_core::event::EventBus;
use courier_core::template::TemplateService;
use courier_core::transport::BoxTransport;
use courier_infra::config::{connection_request, load_global_config, resolve_path};
use courier_infra::filesystem::resolve_data_dir;
use courier_infra::template::JsonTemplateRepository;
use courier_infra::transport::OfflineTransport;
use courier_types::config::GlobalConfig;
use courier_types::dialog::AccountFailure;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteTemplateService = TemplateService<JsonTemplateRepository>;

pub type ConcreteDispatcher = Dispatcher<JsonTemplateRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub template_service: Arc<ConcreteTemplateService>,
    pub registry: Arc<AccountRegistry>,
    pub resolver: Arc<DialogResolver>,
    pub dispatcher: Arc<ConcreteDispatcher>,
    pub events: EventBus,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: read config, load templates, wire services.
    ///
    /// No account is connected yet; see [`AppState::connect_configured`].
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let events = EventBus::new(config.event_capacity);

        let templates_path = resolve_path(&data_dir, &config.templates_file);
        let template_service = Arc::new(TemplateService::new(
            JsonTemplateRepository::new(templates_path),
            events.clone(),
        ));
        template_service.load().await;

        let offline_dir = resolve_path(&data_dir, &config.offline_dir);
        let registry = Arc::new(AccountRegistry::new(
            BoxTransport::new(OfflineTransport::new(offline_dir)),
            events.clone(),
        ));

        let resolver = Arc::new(DialogResolver::new(Arc::clone(&registry), events.clone()));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&template_service),
            Arc::clone(&registry),
            events.clone(),
        ));

        Ok(Self {
            template_service,
            registry,
            resolver,
            dispatcher,
            events,
            config: Arc::new(config),
            data_dir,
        })
    }

    /// Per-command network timeout from config.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs.max(1))
    }

    /// Connect every account declared in `config.toml`.
    ///
    /// Accounts that fail to connect are reported and skipped; the rest stay
    /// usable.
    pub async fn connect_configured<C: ChallengeHandler>(&self, challenge: &C) -> Vec<AccountFailure> {
        let mut failures = Vec::new();
        for account in &self.config.accounts {
            let result = match connection_request(account) {
                Ok(request) => self.registry.connect(request, challenge).await,
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                tracing::warn!(account = %account.name, error = %err, "configured account not connected");
                failures.push(AccountFailure {
                    account: account.name.clone(),
                    kind: err.kind(),
                    error: err.to_string(),
                });
            }
        }
        failures
    }
}
