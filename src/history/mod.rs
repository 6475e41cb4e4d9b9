mod storage;
mod types;

pub use storage::SqliteMessageStore;
pub use types::Message;

use crate::Result;
use async_trait::async_trait;

/// Durable, append-only log of chat messages.
///
/// `append` is atomic per call and assigns `id` and `created_at`. `list_all`
/// returns every message in ascending `created_at` order, which is also
/// insertion order.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, text: &str, is_bot: bool) -> Result<Message>;

    async fn list_all(&self) -> Result<Vec<Message>>;

    async fn find(&self, id: i64) -> Result<Option<Message>>;
}
