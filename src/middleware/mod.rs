//! Middleware module
//!
//! This module contains cross-cutting concerns applied to every dialog turn.

pub mod auth;
pub mod logging;

pub use auth::AuthMiddleware;
pub use logging::{LoggingMiddleware, TurnTracker};
