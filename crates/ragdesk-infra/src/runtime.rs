//! Startup wiring.
//!
//! Builds the production [`ClientContext`]: file-backed profile store,
//! WebSocket channel, and HTTP indexing client, all configured from
//! `{data_dir}/config.toml`.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use ragdesk_core::context::{ClientContext, ContextSettings};

use crate::config::{CHAT_LIMIT_ENV, load_client_config, resolve_chat_limit};
use crate::filesystem::profile_dir;
use crate::indexing::HttpIndexingClient;
use crate::storage::FileKvStore;
use crate::transport::WsChannel;

/// The context type a desktop or terminal front end runs against.
pub type DesktopContext = ClientContext<FileKvStore, WsChannel, HttpIndexingClient>;

/// Load config, open storage, connect the channel, and hydrate the session.
pub async fn init_context(data_dir: &Path) -> anyhow::Result<DesktopContext> {
    let config = load_client_config(data_dir).await;

    let store = FileKvStore::open(profile_dir(data_dir))
        .await
        .context("failed to open profile store")?;

    let channel = WsChannel::connect(&config.channel_url)
        .await
        .with_context(|| format!("failed to connect to {}", config.channel_url))?;

    let indexer =
        HttpIndexingClient::from_config(&config).context("failed to build indexing client")?;

    let env_limit = std::env::var(CHAT_LIMIT_ENV).ok();
    let settings = ContextSettings {
        chat_limit: resolve_chat_limit(&config, env_limit.as_deref()),
        ..ContextSettings::from_config(&config)
    };

    tracing::info!(
        data_dir = %data_dir.display(),
        indexing_url = %config.indexing_url,
        channel_url = %config.channel_url,
        "starting ragdesk client"
    );
    Ok(ClientContext::init(store, Arc::new(channel), indexer, settings).await)
}
