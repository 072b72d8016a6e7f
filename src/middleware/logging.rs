//! Logging middleware
//!
//! Tracks inbound events and the outcome and duration of each dialog turn.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn, Span};
use crate::models::message::{InboundEvent, Payload};
use crate::state::context::DialogState;
use crate::utils::errors::BotError;

/// Turns slower than this are reported
const SLOW_TURN: Duration = Duration::from_secs(1);

/// Logging middleware for bot interactions
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    log_user_interactions: bool,
    log_performance: bool,
}

impl LoggingMiddleware {
    pub fn new(log_user_interactions: bool, log_performance: bool) -> Self {
        Self {
            log_user_interactions,
            log_performance,
        }
    }

    /// Log an inbound event; message text only at debug level
    pub fn log_event(&self, event: &InboundEvent) {
        if !self.log_user_interactions {
            return;
        }

        match &event.payload {
            Payload::Command { name, argument } => info!(
                user_id = event.sender.id,
                username = event.sender.username.as_deref().unwrap_or("none"),
                command = %name,
                argument = ?argument,
                "Command received"
            ),
            Payload::Text(text) => {
                debug!(user_id = event.sender.id, text = %text, "Text message received");
                info!(
                    user_id = event.sender.id,
                    username = event.sender.username.as_deref().unwrap_or("none"),
                    "Message received"
                );
            }
        }
    }

    /// Log an event no route of the current state accepted
    pub fn log_unmatched(&self, event: &InboundEvent, state: DialogState) {
        debug!(
            user_id = event.sender.id,
            state = %state,
            payload = event.payload.kind(),
            "No route for event, ignoring"
        );
    }

    /// Start timing one turn
    pub fn start_turn(&self, user_id: i64, action: &'static str) -> TurnTracker {
        TurnTracker {
            user_id,
            action,
            log_performance: self.log_performance,
            start_time: Instant::now(),
            span: tracing::info_span!("turn", user_id, action),
        }
    }

    /// Log a failed turn
    pub fn log_error(&self, error: &BotError, user_id: i64, state: DialogState) {
        error!(
            error = %error,
            severity = %error.severity(),
            recoverable = error.is_recoverable(),
            user_id,
            state = %state,
            "Turn failed, state unchanged"
        );
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Duration tracker for one dialog turn
pub struct TurnTracker {
    user_id: i64,
    action: &'static str,
    log_performance: bool,
    start_time: Instant,
    span: Span,
}

impl TurnTracker {
    /// Span the turn's work runs in
    pub fn span(&self) -> Span {
        self.span.clone()
    }

    /// Complete the tracking and log the result
    pub fn complete(self, next: Option<DialogState>, replies: usize) {
        let duration_ms = self.start_time.elapsed().as_millis();

        match next {
            Some(next) => info!(
                user_id = self.user_id,
                action = self.action,
                next_state = %next,
                replies,
                duration_ms,
                "Turn completed"
            ),
            None => warn!(
                user_id = self.user_id,
                action = self.action,
                duration_ms,
                "Turn failed"
            ),
        }

        if self.log_performance && self.start_time.elapsed() > SLOW_TURN {
            warn!(user_id = self.user_id, action = self.action, duration_ms, "Slow turn detected");
        }
    }
}
