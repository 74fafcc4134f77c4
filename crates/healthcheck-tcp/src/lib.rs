//! TCP connect health check with optional payload exchange.

mod checker;
mod options;

pub use checker::TcpHealthCheck;
pub use options::{TcpOptions, DEFAULT_TIMEOUT};
