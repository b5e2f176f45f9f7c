//! API module for all HTTP handlers

pub mod index;
pub mod webhook;

// Re-export handlers
pub use index::{root, status};
pub use webhook::handle_webhook;
