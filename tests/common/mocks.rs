use async_trait::async_trait;
use relay_chat::{
    Error, Result,
    history::{Message, MessageStore, SqliteMessageStore},
    llm::{CompletionClient, CompletionError},
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Mock completion provider that records prompts and plays back scripted results
#[derive(Debug)]
pub struct MockCompletionClient {
    script: Mutex<VecDeque<std::result::Result<String, CompletionError>>>,
    otherwise: std::result::Result<String, CompletionError>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletionClient {
    pub fn replying(reply: &str) -> Self {
        Self::with_default(Ok(reply.to_string()))
    }

    pub fn failing(error: CompletionError) -> Self {
        Self::with_default(Err(error))
    }

    pub fn timing_out() -> Self {
        Self::failing(CompletionError::Timeout(Duration::from_secs(30)))
    }

    /// Plays `results` in order, then fails every further call.
    pub fn scripted(results: Vec<std::result::Result<String, CompletionError>>) -> Self {
        let client = Self::with_default(Err(CompletionError::Provider(
            "no more scripted results".to_string(),
        )));
        *client.script.lock().unwrap() = results.into();
        client
    }

    fn with_default(otherwise: std::result::Result<String, CompletionError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            otherwise,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.otherwise.clone())
    }
}

/// In-memory libSQL store whose writes can be made to fail on demand
pub struct FlakyStore {
    inner: SqliteMessageStore,
    planned_failures: Mutex<VecDeque<bool>>,
    down: AtomicBool,
}

impl FlakyStore {
    pub async fn new() -> Self {
        Self {
            inner: SqliteMessageStore::new(":memory:").await.unwrap(),
            planned_failures: Mutex::new(VecDeque::new()),
            down: AtomicBool::new(false),
        }
    }

    /// Each entry decides whether the next append fails (`true`) or goes through.
    pub fn plan_appends(&self, plan: &[bool]) {
        *self.planned_failures.lock().unwrap() = plan.iter().copied().collect();
    }

    /// Makes every operation fail until switched back.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(Error::storage("store is down"));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for FlakyStore {
    async fn append(&self, text: &str, is_bot: bool) -> Result<Message> {
        self.check_available()?;
        let fail = self
            .planned_failures
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(false);
        if fail {
            return Err(Error::storage("injected append failure"));
        }
        self.inner.append(text, is_bot).await
    }

    async fn list_all(&self) -> Result<Vec<Message>> {
        self.check_available()?;
        self.inner.list_all().await
    }

    async fn find(&self, id: i64) -> Result<Option<Message>> {
        self.check_available()?;
        self.inner.find(id).await
    }
}
