use super::{Message, MessageStore};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use libsql::{Builder, Connection, Database, Row};
use tokio::sync::Mutex;
use tracing::{debug, info};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        is_bot INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
"#;

const CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages (created_at)";

const SELECT_COLUMNS: &str = "SELECT id, text, is_bot, created_at FROM messages";

/// `MessageStore` backed by a local libSQL database (file or `:memory:`).
pub struct SqliteMessageStore {
    // Kept alive for the lifetime of the connection.
    _db: Database,
    inner: Mutex<Writer>,
}

struct Writer {
    conn: Connection,
    // Last stamped creation time; appends never go backwards from here.
    last_created_at: Option<DateTime<Utc>>,
}

impl Writer {
    fn next_created_at(&self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(6);
        match self.last_created_at {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        }
    }
}

impl SqliteMessageStore {
    pub async fn new(db_path: &str) -> Result<Self> {
        let db = Builder::new_local(db_path).build().await?;
        let conn = db.connect()?;

        conn.execute(SCHEMA, ()).await?;
        conn.execute(CREATED_AT_INDEX, ()).await?;

        let last_created_at = Self::latest_created_at(&conn).await?;
        info!("Message store initialized: {}", db_path);

        Ok(Self {
            _db: db,
            inner: Mutex::new(Writer {
                conn,
                last_created_at,
            }),
        })
    }

    async fn latest_created_at(conn: &Connection) -> Result<Option<DateTime<Utc>>> {
        let mut rows = conn
            .query(
                "SELECT created_at FROM messages ORDER BY created_at DESC, id DESC LIMIT 1",
                (),
            )
            .await?;

        match rows.next().await? {
            Some(row) => {
                let raw: String = row.get(0)?;
                Ok(Some(parse_timestamp(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn collect(mut rows: libsql::Rows) -> Result<Vec<Message>> {
        let mut messages = Vec::new();
        while let Some(row) = rows.next().await? {
            messages.push(row_to_message(&row)?);
        }
        Ok(messages)
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn append(&self, text: &str, is_bot: bool) -> Result<Message> {
        let mut writer = self.inner.lock().await;
        let created_at = writer.next_created_at();

        writer
            .conn
            .execute(
                "INSERT INTO messages (text, is_bot, created_at) VALUES (?, ?, ?)",
                (
                    text,
                    i64::from(is_bot),
                    created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                ),
            )
            .await?;
        let id = writer.conn.last_insert_rowid();
        writer.last_created_at = Some(created_at);

        debug!("Stored message {} (is_bot: {})", id, is_bot);

        Ok(Message {
            id,
            text: text.to_string(),
            is_bot,
            created_at,
        })
    }

    async fn list_all(&self) -> Result<Vec<Message>> {
        let writer = self.inner.lock().await;
        let rows = writer
            .conn
            .query(
                &format!("{SELECT_COLUMNS} ORDER BY created_at ASC, id ASC"),
                (),
            )
            .await?;

        let messages = Self::collect(rows).await?;
        debug!("Retrieved {} messages", messages.len());
        Ok(messages)
    }

    async fn find(&self, id: i64) -> Result<Option<Message>> {
        let writer = self.inner.lock().await;
        let rows = writer
            .conn
            .query(&format!("{SELECT_COLUMNS} WHERE id = ?"), [id])
            .await?;

        Ok(Self::collect(rows).await?.into_iter().next())
    }
}

fn row_to_message(row: &Row) -> Result<Message> {
    let raw_created_at: String = row.get(3)?;
    let is_bot: i64 = row.get(2)?;

    Ok(Message {
        id: row.get(0)?,
        text: row.get(1)?,
        is_bot: is_bot != 0,
        created_at: parse_timestamp(&raw_created_at)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::storage(format!("Failed to parse timestamp '{raw}': {e}")))
}
