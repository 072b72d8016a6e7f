//! Conversation engine
//!
//! Runs one dialog turn per inbound event: load the sender's context, pick the
//! action from the current state's routes and execute it inside a unit of
//! work. The next context is saved before the unit of work commits, so a
//! failed save rolls storage back; a failed commit puts the previous context
//! back. A failed turn leaves both storage and the dialog untouched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use async_trait::async_trait;
use tracing::{debug, warn, Instrument};
use chrono::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use crate::database::storage::{with_transaction, Storage, Transactional, UnitOfWork};
use crate::handlers::{self, HandlerDeps, TurnContext};
use crate::middleware::{AuthMiddleware, LoggingMiddleware};
use crate::models::message::{InboundEvent, OutboundReply};
use crate::utils::errors::Result;
use super::context::{ConversationContext, DialogState};
use super::scenarios::{self, Action};
use super::storage::StateStorage;

/// Dialog state machine over durable storage
pub struct ConversationEngine {
    storage: Arc<dyn Storage>,
    states: Arc<dyn StateStorage>,
    deps: HandlerDeps,
    auth: AuthMiddleware,
    logging: LoggingMiddleware,
    dialog_ttl: Option<Duration>,
    turn_locks: TurnLocks,
}

impl ConversationEngine {
    pub fn new(
        storage: Arc<dyn Storage>,
        states: Arc<dyn StateStorage>,
        deps: HandlerDeps,
        auth: AuthMiddleware,
    ) -> Self {
        Self {
            storage,
            states,
            deps,
            auth,
            logging: LoggingMiddleware::default(),
            dialog_ttl: None,
            turn_locks: TurnLocks::default(),
        }
    }

    /// Expire stalled admin dialogs after `ttl`
    pub fn with_dialog_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.dialog_ttl = ttl;
        self
    }

    pub fn with_logging(mut self, logging: LoggingMiddleware) -> Self {
        self.logging = logging;
        self
    }

    pub fn auth(&self) -> &AuthMiddleware {
        &self.auth
    }

    /// Process an event; failures are logged and produce no replies
    pub async fn handle(&self, event: &InboundEvent) -> Vec<OutboundReply> {
        self.try_handle(event).await.unwrap_or_default()
    }

    /// Process an event, returning the error of a failed turn
    pub async fn try_handle(&self, event: &InboundEvent) -> Result<Vec<OutboundReply>> {
        let user_id = event.sender.id;
        self.logging.log_event(event);

        let _turn = self.turn_locks.acquire(user_id).await;

        let previous = match self.states.load_context(user_id).await {
            Ok(context) => context,
            Err(e) => {
                self.logging.log_error(&e, user_id, DialogState::Idle);
                return Err(e);
            }
        };
        let conversation = previous
            .clone()
            .unwrap_or_else(|| ConversationContext::new(user_id));
        let state = conversation.state;
        let is_admin = self.auth.is_admin(user_id);

        let Some(action) = scenarios::route(state, &event.payload, is_admin) else {
            self.logging.log_unmatched(event, state);
            return Ok(Vec::new());
        };

        let tracker = self.logging.start_turn(user_id, action.as_str());
        let span = tracker.span();
        let result = self
            .run_turn(event, is_admin, previous, conversation, action)
            .instrument(span)
            .await;

        match result {
            Ok((next, replies)) => {
                tracker.complete(Some(next), replies.len());
                Ok(replies)
            }
            Err(e) => {
                tracker.complete(None, 0);
                self.logging.log_error(&e, user_id, state);
                Err(e)
            }
        }
    }

    async fn run_turn(
        &self,
        event: &InboundEvent,
        is_admin: bool,
        previous: Option<ConversationContext>,
        conversation: ConversationContext,
        action: Action,
    ) -> Result<(DialogState, Vec<OutboundReply>)> {
        let saved = AtomicBool::new(false);
        let turn = Turn {
            deps: &self.deps,
            states: self.states.as_ref(),
            dialog_ttl: self.dialog_ttl,
            saved: &saved,
            event,
            is_admin,
            conversation,
            action,
        };

        let result = with_transaction(self.storage.as_ref(), turn).await;
        if result.is_err() && saved.load(Ordering::Acquire) {
            self.restore_context(event.sender.id, previous).await;
        }
        result
    }

    /// Put back the context a failed turn may have overwritten
    async fn restore_context(&self, user_id: i64, previous: Option<ConversationContext>) {
        let restored = match &previous {
            Some(context) => self.states.save_context(context).await,
            None => self.states.delete_context(user_id).await,
        };
        if let Err(e) = restored {
            warn!(user_id, error = %e, "Failed to restore conversation context");
        }
    }

    /// Current dialog state of a user
    pub async fn current_state(&self, user_id: i64) -> Result<DialogState> {
        Ok(self
            .states
            .load_context(user_id)
            .await?
            .map(|context| context.state)
            .unwrap_or_default())
    }
}

/// One action bound to its event, run inside the turn's unit of work
struct Turn<'a> {
    deps: &'a HandlerDeps,
    states: &'a dyn StateStorage,
    dialog_ttl: Option<Duration>,
    /// Set once the next context is written
    saved: &'a AtomicBool,
    event: &'a InboundEvent,
    is_admin: bool,
    conversation: ConversationContext,
    action: Action,
}

#[async_trait]
impl<'a> Transactional<(DialogState, Vec<OutboundReply>)> for Turn<'a> {
    async fn run(self, uow: &mut dyn UnitOfWork) -> Result<(DialogState, Vec<OutboundReply>)> {
        let mut cx = TurnContext::new(self.deps, self.event, self.is_admin, self.conversation);
        handlers::execute(self.action, &mut cx, uow).await?;

        let mut next = cx.conversation;
        match self.dialog_ttl {
            Some(ttl) if next.state.is_admin_flow() => next.touch_expiry(ttl),
            _ => next.clear_expiry(),
        }

        // written before commit: a failed save rolls the turn back
        self.states.save_context(&next).await?;
        self.saved.store(true, Ordering::Release);
        debug!(context = %next.summary(), "Conversation context saved");

        Ok((next.state, cx.replies))
    }
}

/// Per-user turn serialization
///
/// Turns of the same user run one at a time; turns of different users run
/// concurrently. Entries are removed once no turn holds or awaits them.
#[derive(Default)]
struct TurnLocks {
    locks: StdMutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl TurnLocks {
    async fn acquire(&self, user_id: i64) -> TurnGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(user_id).or_default())
        };
        let guard = Arc::clone(&lock).lock_owned().await;

        TurnGuard {
            locks: self,
            user_id,
            lock,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

struct TurnGuard<'a> {
    locks: &'a TurnLocks,
    user_id: i64,
    lock: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // one reference in the map, one here: nobody else is waiting
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.user_id);
        }
    }
}
