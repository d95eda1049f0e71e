//! `PromptLedger` - records incoming PromptPay payments from bank notification emails.
//!
//! Polls a Microsoft mailbox, parses SCB PromptPay notifications and stores
//! each one exactly once in a local `SQLite` ledger.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;

use std::sync::Arc;

use anyhow::Context;
use envconfig::Envconfig;
use promptledger_core::{
    GraphMailbox, IngestionPipeline, KeyringTokenStore, PipelineConfig, Scheduler,
    SqliteIngestionRepository,
};
use promptledger_graph::{
    Authority, DeviceCodeFlow, GraphClient, OAuthClient, RefreshTokenProvider,
    StaticTokenProvider, Token, TokenProvider, TokenStore,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, TokenStoreKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptledger=info,promptledger_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PromptLedger");

    let config = Config::init_from_env().context("Failed to load configuration from env")?;
    config.validate().context("Invalid configuration")?;

    let database_path = config.database_path()?;
    let repository = SqliteIngestionRepository::new(&database_path.to_string_lossy())
        .await
        .with_context(|| format!("Failed to open ledger at {}", database_path.display()))?;
    let server_time = repository
        .server_time()
        .await
        .context("Ledger database is not responding")?;
    info!(path = %database_path.display(), %server_time, "Ledger database ready");

    let tokens = token_provider(&config).await?;
    let client = GraphClient::new(tokens)?
        .with_base_url(&config.graph_base_url)?
        .with_timeout(config.http_timeout())?;

    let pipeline = IngestionPipeline::new(Arc::new(GraphMailbox::new(client)), Arc::new(repository))
        .with_config(PipelineConfig {
            fetch_limit: config.fetch_limit,
        });
    let scheduler = Scheduler::new(Arc::new(pipeline), config.poll_interval())?;

    scheduler.run_until(wait_for_shutdown_signal()).await;

    info!("PromptLedger stopped");
    Ok(())
}

/// Picks how access tokens are obtained, running a device login if needed.
async fn token_provider(config: &Config) -> anyhow::Result<Arc<dyn TokenProvider>> {
    if let Some(access_token) = config.access_token() {
        warn!("Using GRAPH_ACCESS_TOKEN; it will not be refreshed");
        return Ok(Arc::new(StaticTokenProvider::new(access_token)));
    }

    let client_id = config
        .client_id()
        .context("CLIENT_ID is required unless GRAPH_ACCESS_TOKEN is set")?;
    let oauth = OAuthClient::new(client_id, Authority::new(config.tenant.trim())?)?
        .with_timeout(config.http_timeout())?
        .with_scopes(config.scopes());

    let store: Option<Arc<dyn TokenStore>> = match config.token_store {
        TokenStoreKind::Keyring => Some(Arc::new(KeyringTokenStore::new(
            config.keyring_account.trim(),
        )?)),
        TokenStoreKind::None => None,
    };

    let stored = match &store {
        Some(store) => store.load().context("Failed to read refresh token from keyring")?,
        None => None,
    };

    let token = match config.refresh_token().map(String::from).or(stored) {
        Some(refresh_token) => Token::refresh_only(refresh_token),
        None => device_login(&oauth, store.as_deref()).await?,
    };

    let provider = RefreshTokenProvider::new(oauth, token);
    let provider = match store {
        Some(store) => provider.with_store(store),
        None => provider,
    };
    Ok(Arc::new(provider))
}

/// First login through the device code flow.
async fn device_login(
    oauth: &OAuthClient,
    store: Option<&dyn TokenStore>,
) -> anyhow::Result<Token> {
    let flow = DeviceCodeFlow::new(oauth.clone());
    let auth = flow
        .request_device_authorization()
        .await
        .context("Failed to start device login")?;

    info!(
        verification_uri = %auth.verification_uri,
        user_code = %auth.user_code,
        "No refresh token found; sign in to authorize mailbox access"
    );
    if let Some(message) = &auth.message {
        info!("{message}");
    }

    let token = flow
        .wait_for_token(&auth)
        .await
        .context("Device login did not complete")?;
    info!("Device login completed");

    match (store, token.refresh_token.as_deref()) {
        (Some(store), Some(refresh_token)) => {
            if let Err(e) = store.save(refresh_token) {
                warn!("Failed to store refresh token: {e}");
            }
        }
        (_, None) => warn!("No refresh token issued; request the offline_access scope"),
        (None, Some(_)) => {}
    }

    Ok(token)
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            error!("Failed to install SIGTERM handler: {e}");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        () = wait_for_ctrl_c() => {}
        _ = sigterm.recv() => info!("Received SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C"),
        Err(e) => {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}
