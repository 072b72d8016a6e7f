//! State management module
//!
//! This module handles the per-user dialog: contexts, their storage, the
//! route tables and the engine that drives turns.

pub mod context;
pub mod engine;
pub mod scenarios;
pub mod storage;

pub use context::{ConversationContext, DialogState};
pub use engine::ConversationEngine;
pub use scenarios::{Action, Filter, Route};
pub use storage::{MemoryStateStorage, RedisStateStorage, StateStorage};
