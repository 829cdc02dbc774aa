pub mod apis;
pub mod config;
pub mod errors; // Structured error handling
pub mod logger;
pub mod services; // Service lifecycle framework

pub use errors::{CoreError, ErrorCode};
pub use services::{Service, ServiceManager, ServiceMetadata, ServiceStatus, StatusCell};
