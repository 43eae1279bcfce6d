use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use tokio::net::TcpListener;
use tower_lsp::Server;
use tracing::info;

use dawn_language_server::analysis::SpanLengthMode;
use dawn_language_server::build_service;
use dawn_language_server::config::ServerConfig;
use dawn_language_server::framework::FrameworkTable;
use dawn_language_server::logging::init_logger;
use dawn_language_server::lsp::diagnostic_provider::DiagnosticsMode;

#[derive(Parser)]
#[command(name = "dawn-language-server")]
#[command(version)]
#[command(about = "Language server for Dawn scripts", long_about = None)]
struct Cli {
    /// Communicate over stdin/stdout (default)
    #[arg(long, conflicts_with = "socket")]
    stdio: bool,

    /// Listen for a single client on a TCP socket
    #[arg(long)]
    socket: bool,

    /// Port for --socket
    #[arg(long, default_value_t = 41551, requires = "socket")]
    port: u16,

    /// Framework file loaded at startup instead of framework.fw next to the documents
    #[arg(long)]
    framework: Option<PathBuf>,

    /// Report the last word of a line with its own length instead of the line's length
    #[arg(long)]
    exact_span_lengths: bool,

    /// Diagnostics provider: placeholder or off (overridden by DAWN_DIAGNOSTICS)
    #[arg(long)]
    diagnostics: Option<DiagnosticsMode>,

    /// Log filter for stderr, e.g. "debug" (defaults to RUST_LOG, then "info")
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr output
    #[arg(long)]
    no_color: bool,

    /// Do not write a session log to the cache directory
    #[arg(long)]
    no_file_logging: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a framework file as the JSON payload of the dawn/framework notification
    Framework {
        /// Path to the framework file
        path: PathBuf,
    },
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::default()
            .with_diagnostics(DiagnosticsMode::from_env_or_default(self.diagnostics));
        if let Some(ref path) = self.framework {
            config = config.with_framework_path(path);
        }
        if self.exact_span_lengths {
            config = config.with_span_length_mode(SpanLengthMode::Exact);
        }
        config
    }
}

/// Renders a framework file as the `dawn/framework` notification payload.
fn framework_payload(path: &Path) -> anyhow::Result<String> {
    let table = FrameworkTable::read(path)?;
    Ok(serde_json::to_string_pretty(&table)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Framework { path }) = &cli.command {
        println!("{}", framework_payload(path)?);
        return Ok(());
    }

    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), !cli.no_file_logging)
        .context("failed to initialize logging")?;

    let config = cli.server_config();
    info!("Starting Dawn language server {}", env!("CARGO_PKG_VERSION"));

    if cli.socket {
        let address = ("127.0.0.1", cli.port);
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("failed to bind {}:{}", address.0, address.1))?;
        info!("Listening on {}:{}", address.0, address.1);

        let (stream, peer) = listener.accept().await.context("failed to accept client")?;
        info!("Client connected from {}", peer);
        let (read, write) = tokio::io::split(stream);

        let (service, socket) = build_service(config);
        Server::new(read, write, socket).serve(service).await;
    } else {
        let (service, socket) = build_service(config);
        Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
            .serve(service)
            .await;
    }

    info!("Dawn language server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_builds_config() {
        let cli = Cli::parse_from([
            "dawn-language-server",
            "--framework",
            "/tmp/framework.fw",
            "--exact-span-lengths",
        ]);
        let config = cli.server_config();
        assert_eq!(config.framework_path, Some(PathBuf::from("/tmp/framework.fw")));
        assert_eq!(config.span_length_mode, SpanLengthMode::Exact);
    }

    #[test]
    fn test_cli_framework_subcommand() {
        let cli = Cli::parse_from(["dawn-language-server", "framework", "framework.fw"]);
        assert!(matches!(cli.command, Some(Commands::Framework { .. })));
    }

    #[test]
    fn test_framework_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("framework.fw");
        std::fs::write(&path, "funcs:\nroar\n;\n").unwrap();

        let payload: serde_json::Value =
            serde_json::from_str(&framework_payload(&path).unwrap()).unwrap();
        assert_eq!(payload, serde_json::json!({"funcs": ["roar"]}));
    }

    #[test]
    fn test_framework_payload_reports_unreadable_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = framework_payload(&dir.path().join("missing.fw")).unwrap_err();
        assert!(err.to_string().contains("missing.fw"), "{}", err);
    }

    #[test]
    fn test_cli_rejects_port_without_socket() {
        assert!(Cli::try_parse_from(["dawn-language-server", "--port", "9000"]).is_err());
    }
}
