pub mod backend;
pub mod completion;
pub mod diagnostic_provider;
pub mod document;
pub mod models;

pub use backend::{DawnBackend, FRAMEWORK_NOTIFICATION, build_service};
