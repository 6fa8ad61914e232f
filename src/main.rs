//! Dialog Engine server
//!
//! Loads configuration, wires the adapters into the dispatcher and serves
//! the channel endpoint.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dialog_engine::adapters::http::app_router;
use dialog_engine::adapters::{
    FileSessionStore, HttpSkillHandler, InMemoryAuthProvider, InMemorySessionStore,
    KeywordClassifier, SkillEndpoint, StaticContentSource,
};
use dialog_engine::application::{
    build_registry, DialogServices, Dispatcher, DispatcherSettings, RetryPolicy,
};
use dialog_engine::config::{AppConfig, LogFormat, ServerConfig, StoreBackend};
use dialog_engine::domain::dialog::DialogStackManager;
use dialog_engine::ports::SessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let store: Arc<dyn SessionStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory session store; state is lost on restart");
            Arc::new(InMemorySessionStore::new())
        }
        StoreBackend::File => {
            tracing::info!(path = %config.store.path.display(), "Using file session store");
            Arc::new(FileSessionStore::new(&config.store.path))
        }
    };

    let mut classifier =
        KeywordClassifier::new().with_general_label(config.nlu.general_label.clone());
    let mut skills = HttpSkillHandler::new(config.skills.timeout())?;
    for skill in &config.skills.catalog {
        classifier = classifier.with_dispatch_keywords(skill.id.clone(), skill.keywords.clone());
        let mut endpoint = SkillEndpoint::new(skill.id.clone(), skill.endpoint.clone());
        if let Some(key) = &skill.api_key {
            endpoint = endpoint.with_api_key(key.clone());
        }
        skills = skills.with_endpoint(endpoint);
    }
    let skill_catalog = config.skills.skill_catalog();
    tracing::info!(skills = skill_catalog.len(), "Skill catalog loaded");

    let auth = Arc::new(InMemoryAuthProvider::accepting_any_code());

    let services = DialogServices {
        auth: auth.clone(),
        content: Arc::new(StaticContentSource::new()),
        skills: Arc::new(skills),
        skill_catalog: skill_catalog.clone(),
        skill_retry: RetryPolicy::new(config.skills.max_attempts(), config.skills.timeout()),
    };
    let registry = build_registry(&services, &config.dialogs.settings());
    tracing::info!(dialogs = ?registry.ids(), "Dialog registry built");

    let dispatcher = Dispatcher::new(
        store,
        Arc::new(classifier),
        auth,
        DialogStackManager::new(Arc::new(registry), config.dialogs.max_steps_per_turn),
        config.interruption.policy()?,
        skill_catalog,
        DispatcherSettings {
            root_dialog: config.dialogs.root.clone(),
            default_locale: config.nlu.locale.clone(),
            general_label: config.nlu.general_label.clone(),
            escalation_contact: config.dialogs.escalation_contact.clone(),
            nlu_retry: RetryPolicy::new(config.nlu.max_attempts(), config.nlu.timeout()),
        },
    );

    let app = app_router(Arc::new(dispatcher), config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    tracing::info!("Dialog engine listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.clone()));
    let registry = tracing_subscriber::registry().with(filter);
    match server.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutting down");
}
