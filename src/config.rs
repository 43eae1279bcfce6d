//! Server configuration handed to the backend at construction time.

use std::path::PathBuf;

use crate::analysis::SpanLengthMode;
use crate::lsp::diagnostic_provider::DiagnosticsMode;

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Framework file loaded at startup; takes precedence over `framework.fw`
    /// next to the opened documents.
    pub framework_path: Option<PathBuf>,
    pub span_length_mode: SpanLengthMode,
    pub diagnostics: DiagnosticsMode,
}

impl ServerConfig {
    pub fn with_framework_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.framework_path = Some(path.into());
        self
    }

    pub fn with_span_length_mode(mut self, mode: SpanLengthMode) -> Self {
        self.span_length_mode = mode;
        self
    }

    pub fn with_diagnostics(mut self, mode: DiagnosticsMode) -> Self {
        self.diagnostics = mode;
        self
    }
}
