//! Test context: a conversation engine over in-memory storage

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Duration;
use carry_bot::config::TemplatesConfig;
use carry_bot::database::{MemoryStorage, Storage, UnitOfWork};
use carry_bot::handlers::{DialogSettings, HandlerDeps};
use carry_bot::i18n::{I18n, TemplateParams, TemplateRenderer};
use carry_bot::middleware::AuthMiddleware;
use carry_bot::models::message::{InboundEvent, OutboundReply};
use carry_bot::models::user::{UpsertUserRequest, User};
use carry_bot::services::PayloadEncoder;
use carry_bot::state::{ConversationContext, ConversationEngine, DialogState, MemoryStateStorage, StateStorage};
use carry_bot::{BotError, Result};
use super::test_data::*;

/// Encoder returning the payload bytes, so tests can read the encoded link
pub struct StubEncoder;

impl PayloadEncoder for StubEncoder {
    fn encode(&self, payload: &str) -> Result<Vec<u8>> {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Templates that fail for selected names
pub struct FailingTemplates {
    inner: I18n,
    failing: HashSet<&'static str>,
}

impl FailingTemplates {
    pub fn new(inner: I18n, failing: &[&'static str]) -> Self {
        Self {
            inner,
            failing: failing.iter().copied().collect(),
        }
    }
}

impl TemplateRenderer for FailingTemplates {
    fn render(&self, name: &str, params: &TemplateParams) -> Result<String> {
        if self.failing.contains(name) {
            return Err(BotError::Template(format!("{} unavailable", name)));
        }
        self.inner.render(name, params)
    }
}

/// State storage whose saves can be switched to fail
pub struct FlakyStates {
    inner: Arc<MemoryStateStorage>,
    fail_saves: AtomicBool,
}

impl FlakyStates {
    pub fn new(inner: Arc<MemoryStateStorage>) -> Self {
        Self {
            inner,
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateStorage for FlakyStates {
    async fn load_context(&self, user_id: i64) -> Result<Option<ConversationContext>> {
        self.inner.load_context(user_id).await
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BotError::Storage("state storage unavailable".to_string()));
        }
        self.inner.save_context(context).await
    }

    async fn delete_context(&self, user_id: i64) -> Result<()> {
        self.inner.delete_context(user_id).await
    }
}

/// Storage whose commits can be switched to fail; a failed commit discards the work
pub struct FlakyStorage {
    inner: MemoryStorage,
    fail_commits: Arc<AtomicBool>,
}

impl FlakyStorage {
    pub fn new(inner: MemoryStorage) -> Self {
        Self {
            inner,
            fail_commits: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(FlakyUnitOfWork {
            inner: self.inner.begin().await?,
            fail_commits: Arc::clone(&self.fail_commits),
        }))
    }
}

struct FlakyUnitOfWork {
    inner: Box<dyn UnitOfWork>,
    fail_commits: Arc<AtomicBool>,
}

#[async_trait]
impl UnitOfWork for FlakyUnitOfWork {
    async fn upsert_user(&mut self, request: &UpsertUserRequest) -> Result<()> {
        self.inner.upsert_user(request).await
    }

    async fn find_user_by_id(&mut self, id: i64) -> Result<Option<User>> {
        self.inner.find_user_by_id(id).await
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>> {
        self.inner.find_user_by_username(username).await
    }

    async fn list_users(&mut self, limit: i64, offset: i64) -> Result<Vec<User>> {
        self.inner.list_users(limit, offset).await
    }

    async fn count_users(&mut self) -> Result<i64> {
        self.inner.count_users().await
    }

    async fn add_bonuses(&mut self, id: i64, amount: i64) -> Result<Option<User>> {
        self.inner.add_bonuses(id, amount).await
    }

    async fn withdraw_bonuses(&mut self, id: i64, amount: i64) -> Result<Option<User>> {
        self.inner.withdraw_bonuses(id, amount).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            self.inner.rollback().await?;
            return Err(BotError::Storage("commit failed".to_string()));
        }
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.inner.rollback().await
    }
}

pub async fn load_templates() -> I18n {
    I18n::load(&TemplatesConfig::default())
        .await
        .expect("Failed to load templates")
}

/// Engine plus direct access to its storages
pub struct TestContext {
    pub storage: MemoryStorage,
    pub states: Arc<MemoryStateStorage>,
    pub engine: Arc<ConversationEngine>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::build(Arc::new(load_templates().await), None, None)
    }

    pub async fn with_failing_templates(failing: &[&'static str]) -> Self {
        let templates = FailingTemplates::new(load_templates().await, failing);
        Self::build(Arc::new(templates), None, None)
    }

    pub async fn with_dialog_ttl(ttl: Duration) -> Self {
        Self::build(Arc::new(load_templates().await), Some(ttl), None)
    }

    /// Engine whose state saves can be made to fail
    pub async fn with_flaky_states() -> (Self, Arc<FlakyStates>) {
        let states = Arc::new(MemoryStateStorage::new());
        let flaky = Arc::new(FlakyStates::new(states.clone()));
        let engine_states: Arc<dyn StateStorage> = flaky.clone();
        let ctx = Self::build_with(
            Arc::new(load_templates().await),
            None,
            MemoryStorage::new(),
            None,
            states,
            engine_states,
        );
        (ctx, flaky)
    }

    /// Engine whose commits can be made to fail
    pub async fn with_flaky_storage() -> (Self, Arc<FlakyStorage>) {
        let storage = MemoryStorage::new();
        let flaky = Arc::new(FlakyStorage::new(storage.clone()));
        let engine_storage: Arc<dyn Storage> = flaky.clone();
        let ctx = Self::build(
            Arc::new(load_templates().await),
            None,
            Some((storage, engine_storage)),
        );
        (ctx, flaky)
    }

    fn build(
        templates: Arc<dyn TemplateRenderer>,
        ttl: Option<Duration>,
        storage: Option<(MemoryStorage, Arc<dyn Storage>)>,
    ) -> Self {
        let (storage, engine_storage) = match storage {
            Some((storage, engine_storage)) => (storage, Some(engine_storage)),
            None => (MemoryStorage::new(), None),
        };
        let states = Arc::new(MemoryStateStorage::new());
        let engine_states: Arc<dyn StateStorage> = states.clone();
        Self::build_with(templates, ttl, storage, engine_storage, states, engine_states)
    }

    fn build_with(
        templates: Arc<dyn TemplateRenderer>,
        ttl: Option<Duration>,
        storage: MemoryStorage,
        engine_storage: Option<Arc<dyn Storage>>,
        states: Arc<MemoryStateStorage>,
        engine_states: Arc<dyn StateStorage>,
    ) -> Self {
        let deps = HandlerDeps {
            templates,
            encoder: Arc::new(StubEncoder),
            settings: DialogSettings {
                bot_username: BOT_USERNAME.to_string(),
                list_page_size: 2,
                links: test_links(),
            },
        };

        let engine_storage = engine_storage.unwrap_or_else(|| Arc::new(storage.clone()));
        let engine = ConversationEngine::new(
            engine_storage,
            engine_states,
            deps,
            AuthMiddleware::new([ADMIN_ID, SECOND_ADMIN_ID]),
        )
        .with_dialog_ttl(ttl);

        Self {
            storage,
            states,
            engine: Arc::new(engine),
        }
    }

    pub async fn send(&self, event: InboundEvent) -> Vec<OutboundReply> {
        self.engine.handle(&event).await
    }

    pub async fn state(&self, user_id: i64) -> DialogState {
        self.engine.current_state(user_id).await.expect("Failed to load state")
    }

    pub async fn context(&self, user_id: i64) -> Option<ConversationContext> {
        self.states.load_context(user_id).await.expect("Failed to load context")
    }

    pub async fn balance(&self, user_id: i64) -> Option<i64> {
        self.storage.user(user_id).await.map(|user| user.bonuses)
    }

    pub async fn seed_user(&self, id: i64, username: Option<&str>, first_name: &str, bonuses: i64) {
        self.storage
            .insert_user(create_test_user(id, username, first_name, bonuses))
            .await;
    }

    /// Seed the customer with a balance and bring the admin to the menu
    pub async fn with_customer_and_admin(bonuses: i64) -> Self {
        let ctx = Self::new().await;
        ctx.seed_user(USER_ID, Some(USER_USERNAME), "Anna", bonuses).await;
        ctx.send(command(&admin(), "start", None)).await;
        ctx
    }
}
