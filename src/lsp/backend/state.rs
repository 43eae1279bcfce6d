//! Backend state management
//!
//! This module defines the DawnBackend struct, which holds the open documents,
//! the session's framework registry and the diagnostics provider.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use crate::config::ServerConfig;
use crate::framework::FrameworkRegistry;
use crate::lsp::diagnostic_provider::DiagnosticProvider;
use crate::lsp::models::LspDocument;

/// The Dawn language server backend, managing state and handling LSP requests.
#[derive(Clone)]
pub struct DawnBackend {
    pub(super) client: Client,
    pub(super) documents_by_uri: Arc<DashMap<Url, Arc<LspDocument>>>,
    /// Placeholder or disabled diagnostics
    pub(super) diagnostic_provider: Arc<dyn DiagnosticProvider>,
    /// Framework table, filled once per session
    pub(super) framework: Arc<FrameworkRegistry>,
    pub(super) config: Arc<ServerConfig>,
}

// Manual Debug implementation since DiagnosticProvider doesn't implement Debug
impl std::fmt::Debug for DawnBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DawnBackend")
            .field("diagnostics", &self.diagnostic_provider.backend_name())
            .field("documents_count", &self.documents_by_uri.len())
            .field("framework_source", &self.framework.source())
            .finish()
    }
}
