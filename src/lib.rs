pub mod analysis;
pub mod config;
pub mod framework;
pub mod logging;
pub mod lsp;

pub use config::ServerConfig;
pub use framework::{FrameworkRegistry, FrameworkTable};
pub use lsp::{DawnBackend, build_service};
