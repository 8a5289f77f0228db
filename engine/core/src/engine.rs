//! Engine
//!
//! Wires one shared [`AssistantApi`] into the three sessions. The sessions
//! never reference each other; each owns its state and its own channels.

use std::sync::Arc;

use anyhow::Context;

use crate::backend::{AssistantApi, HttpBackend};
use crate::catalog::DocumentCatalog;
use crate::config::EngineConfig;
use crate::conversation::ConversationSession;
use crate::lifecycle::StartOutcome;
use crate::search::SearchSession;
use crate::surface::{ConfirmPrompt, Notification, Notifier, NotifyLevel};

/// The client-side interaction engine
pub struct Engine {
    api: Arc<dyn AssistantApi>,
    notifier: Arc<dyn Notifier>,
    conversation: ConversationSession,
    catalog: DocumentCatalog,
    search: SearchSession,
}

impl Engine {
    /// Build the engine around an existing transport
    pub fn new(
        api: Arc<dyn AssistantApi>,
        config: &EngineConfig,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn ConfirmPrompt>,
    ) -> Self {
        let conversation = ConversationSession::new(Arc::clone(&api));
        let catalog = DocumentCatalog::new(Arc::clone(&api), Arc::clone(&notifier), confirm)
            .with_max_upload_bytes(config.max_upload_bytes);
        let search = SearchSession::new(Arc::clone(&api)).with_limit(config.search_limit);

        Self {
            api,
            notifier,
            conversation,
            catalog,
            search,
        }
    }

    /// Build the engine with an HTTP transport for `config`
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the HTTP client cannot be
    /// built.
    pub fn from_config(
        config: &EngineConfig,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn ConfirmPrompt>,
    ) -> anyhow::Result<Self> {
        config.validate().context("Invalid engine configuration")?;
        let backend = HttpBackend::from_settings(&config.api)
            .with_context(|| format!("Failed to create backend for {}", config.api.base_url))?;

        tracing::info!(
            base_url = %backend.base_url(),
            source = %config.source(),
            "Engine configured"
        );
        Ok(Self::new(Arc::new(backend), config, notifier, confirm))
    }

    /// Probe the service, then load the document list
    ///
    /// An unreachable service is reported as a warning, not an error; the
    /// list fetch still runs and reports its own failure.
    pub async fn start(&self) -> StartOutcome {
        if !self.api.health_check().await {
            tracing::warn!(backend = self.api.name(), "Service not reachable");
            self.notifier.notify(Notification::new(
                NotifyLevel::Warning,
                "Service not reachable - requests may fail",
            ));
        }
        self.catalog.refresh().await
    }

    /// The chat transcript
    #[must_use]
    pub fn conversation(&self) -> &ConversationSession {
        &self.conversation
    }

    /// The document catalog
    #[must_use]
    pub fn catalog(&self) -> &DocumentCatalog {
        &self.catalog
    }

    /// The search session
    #[must_use]
    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    /// Name of the transport in use
    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.api.name()
    }
}
