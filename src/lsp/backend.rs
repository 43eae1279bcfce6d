use std::sync::Arc;

use dashmap::DashMap;

use tower_lsp::{Client, ClientSocket, LspService};
use tower_lsp::lsp_types::{CompletionItem, Position, SemanticToken, Url};

use tracing::{debug, info, trace, warn};

use crate::analysis::classify;
use crate::config::ServerConfig;
use crate::framework::{
    FrameworkRegistry, FrameworkSource, FrameworkTable, framework_path_for,
};
use crate::lsp::completion;
use crate::lsp::diagnostic_provider::create_provider;
use crate::lsp::models::LspDocument;

mod handlers;
mod state;
mod utils;

pub use state::DawnBackend;
use utils::SemanticTokensBuilder;

/// Method name of the notification carrying the framework table.
pub const FRAMEWORK_NOTIFICATION: &str = "dawn/framework";

/// Builds the LSP service with the `dawn/framework` notification registered.
pub fn build_service(config: ServerConfig) -> (LspService<DawnBackend>, ClientSocket) {
    LspService::build(move |client| DawnBackend::new(client, config))
        .custom_method(FRAMEWORK_NOTIFICATION, DawnBackend::framework_notification)
        .finish()
}

impl DawnBackend {
    /// Creates a new backend for the given client and configuration.
    ///
    /// A framework file named in the configuration is loaded immediately and
    /// fills the session's registry.
    pub fn new(client: Client, config: ServerConfig) -> Self {
        let framework = FrameworkRegistry::new();
        if let Some(ref path) = config.framework_path {
            match FrameworkTable::read(path) {
                Ok(table) => {
                    framework.provide(table, FrameworkSource::CommandLine);
                }
                Err(e) => {
                    warn!("{}; using builtin framework", e);
                    framework.provide(FrameworkTable::builtin(), FrameworkSource::Builtin);
                }
            }
        }

        let diagnostic_provider: Arc<dyn crate::lsp::diagnostic_provider::DiagnosticProvider> =
            Arc::from(create_provider(config.diagnostics));
        info!(
            "Using {} diagnostics, span length mode {:?}",
            diagnostic_provider.backend_name(),
            config.span_length_mode
        );

        Self {
            client,
            documents_by_uri: Arc::new(DashMap::new()),
            diagnostic_provider,
            framework: Arc::new(framework),
            config: Arc::new(config),
        }
    }

    /// Looks up an open document.
    pub(super) fn document(&self, uri: &Url) -> Option<Arc<LspDocument>> {
        self.documents_by_uri.get(uri).map(|r| r.value().clone())
    }

    /// Handles the `dawn/framework` notification.
    pub async fn framework_notification(&self, params: FrameworkTable) {
        info!(
            "Received {} with {} categories",
            FRAMEWORK_NOTIFICATION,
            params.categories().count()
        );
        self.framework.provide(params, FrameworkSource::Notification);
    }

    /// Loads `framework.fw` next to a newly opened document if no framework
    /// has been provided yet.
    pub(super) async fn load_adjacent_framework(&self, uri: &Url) {
        if self.framework.is_loaded() {
            return;
        }

        let path = match framework_path_for(uri) {
            Ok(path) => path,
            Err(e) => {
                debug!("No adjacent framework: {}", e);
                return;
            }
        };

        match FrameworkTable::read_async(&path).await {
            Ok(table) => {
                self.framework.provide(table, FrameworkSource::AdjacentFile);
            }
            Err(e) => debug!("{}; keeping builtin framework for now", e),
        }
    }

    /// Validates a document and publishes diagnostics if the version is still current.
    pub(super) async fn publish_diagnostics(&self, document: &Arc<LspDocument>) {
        let (uri, text, version) = {
            let state = document.state.read().await;
            (state.uri.clone(), state.text.to_string(), state.version)
        };

        let diagnostics = self.diagnostic_provider.validate(&text).await;
        if document.version().await == version {
            trace!("Publishing {} diagnostics for {}", diagnostics.len(), uri);
            self.client.publish_diagnostics(uri, diagnostics, Some(version)).await;
        } else {
            debug!("Skipping stale diagnostics for {} version {}", uri, version);
        }
    }

    /// Completion candidates for a document, or `None` if it is not open.
    pub async fn completion_items(&self, uri: &Url, position: Position) -> Option<Vec<CompletionItem>> {
        let document = self.document(uri)?;
        let text = document.text().await;
        Some(completion::complete(&text, position, &self.framework.table()))
    }

    /// Delta-encoded semantic tokens for a document, or `None` if it is not open.
    pub async fn semantic_tokens(&self, uri: &Url) -> Option<Vec<SemanticToken>> {
        let document = self.document(uri)?;
        let text = document.text().await;
        let tokens = classify(&text, &self.framework.table(), self.config.span_length_mode);

        let mut builder = SemanticTokensBuilder::new();
        for token in &tokens {
            builder.push_token(token);
        }
        Some(builder.build())
    }
}
