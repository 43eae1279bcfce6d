//! Diagnostic provider abstraction
//!
//! Dawn has no real validation. The default provider publishes a single
//! placeholder warning on every open and change so editors show that the
//! diagnostics channel is alive; the `off` provider publishes nothing.

use std::fmt;
use std::str::FromStr;

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};

/// Message of the placeholder diagnostic.
pub const PLACEHOLDER_MESSAGE: &str = "Something is wrong here";

/// Environment variable selecting the diagnostics provider.
pub const DIAGNOSTICS_ENV: &str = "DAWN_DIAGNOSTICS";

/// Common interface for diagnostic backends.
#[async_trait::async_trait]
pub trait DiagnosticProvider: Send + Sync {
    /// Produce diagnostics for a document snapshot.
    async fn validate(&self, source: &str) -> Vec<Diagnostic>;

    /// Get a human-readable name for this backend (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}

/// Publishes one fixed warning regardless of content.
#[derive(Debug, Default)]
pub struct PlaceholderDiagnostics;

#[async_trait::async_trait]
impl DiagnosticProvider for PlaceholderDiagnostics {
    async fn validate(&self, _source: &str) -> Vec<Diagnostic> {
        vec![Diagnostic {
            range: Range::new(Position::new(0, 0), Position::new(0, 10)),
            severity: Some(DiagnosticSeverity::WARNING),
            message: PLACEHOLDER_MESSAGE.to_string(),
            source: Some("dawn".to_string()),
            ..Default::default()
        }]
    }

    fn backend_name(&self) -> &'static str {
        "placeholder"
    }
}

/// Publishes no diagnostics.
#[derive(Debug, Default)]
pub struct NoDiagnostics;

#[async_trait::async_trait]
impl DiagnosticProvider for NoDiagnostics {
    async fn validate(&self, _source: &str) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn backend_name(&self) -> &'static str {
        "off"
    }
}

/// Configuration for selecting a diagnostic provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticsMode {
    #[default]
    Placeholder,
    Off,
}

impl DiagnosticsMode {
    /// Resolves the mode from `DAWN_DIAGNOSTICS`, then the explicit option,
    /// then the default.
    pub fn from_env_or_default(option: Option<DiagnosticsMode>) -> Self {
        if let Ok(value) = std::env::var(DIAGNOSTICS_ENV) {
            match value.parse() {
                Ok(mode) => return mode,
                Err(e) => tracing::warn!("Ignoring {}: {}", DIAGNOSTICS_ENV, e),
            }
        }
        option.unwrap_or_default()
    }
}

impl FromStr for DiagnosticsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "placeholder" => Ok(Self::Placeholder),
            "off" | "none" => Ok(Self::Off),
            other => Err(format!("unknown diagnostics mode '{}'", other)),
        }
    }
}

impl fmt::Display for DiagnosticsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder => write!(f, "placeholder"),
            Self::Off => write!(f, "off"),
        }
    }
}

/// Create a diagnostic provider for the configured mode
pub fn create_provider(mode: DiagnosticsMode) -> Box<dyn DiagnosticProvider> {
    match mode {
        DiagnosticsMode::Placeholder => Box::new(PlaceholderDiagnostics),
        DiagnosticsMode::Off => Box::new(NoDiagnostics),
    }
}
