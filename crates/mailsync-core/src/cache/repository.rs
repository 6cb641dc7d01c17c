//! Message cache storage repository.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use super::model::CacheEntry;
use crate::Result;

/// Durable key-value mirror of mailbox state, scoped by account and mailbox.
///
/// [`CacheRepository::apply`] is the only mutation entry point; it runs as a
/// single transaction so concurrent readers observe either the pre-pass or
/// post-pass state, never a mix.
pub struct CacheRepository {
    pool: SqlitePool,
}

impl CacheRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS cached_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_email TEXT NOT NULL,
                mailbox TEXT NOT NULL,
                uid INTEGER NOT NULL,
                flags TEXT NOT NULL DEFAULT '',
                synced_at TEXT NOT NULL,
                UNIQUE(account_email, mailbox, uid)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_messages_mailbox
            ON cached_messages(account_email, mailbox)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get the cached entries for one (account, mailbox), ordered by UID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn entries(&self, account_email: &str, mailbox: &str) -> Result<Vec<CacheEntry>> {
        let rows = sqlx::query(
            r"
            SELECT account_email, mailbox, uid, flags, synced_at
            FROM cached_messages
            WHERE account_email = ? AND mailbox = ?
            ORDER BY uid ASC
            ",
        )
        .bind(account_email)
        .bind(mailbox)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .filter_map(|row| {
                let synced_at_str: String = row.get("synced_at");
                let synced_at = DateTime::parse_from_rfc3339(&synced_at_str)
                    .ok()?
                    .with_timezone(&Utc);

                Some(CacheEntry {
                    account_email: row.get("account_email"),
                    mailbox: row.get("mailbox"),
                    uid: row.get::<u32, _>("uid"),
                    flags: row.get("flags"),
                    synced_at,
                })
            })
            .collect();

        Ok(entries)
    }

    /// Apply one reconciliation pass to the cache as a single logical unit.
    ///
    /// Additions and updates are upserted, removals deleted, all inside one
    /// transaction. On any failure the transaction rolls back and the cache
    /// retains its pre-pass state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database transaction fails; nothing is
    /// partially committed in that case.
    pub async fn apply(
        &self,
        account_email: &str,
        mailbox: &str,
        additions: &[CacheEntry],
        updates: &[CacheEntry],
        removals: &[u32],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for entry in additions.iter().chain(updates) {
            sqlx::query(
                r"
                INSERT INTO cached_messages (account_email, mailbox, uid, flags, synced_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(account_email, mailbox, uid) DO UPDATE SET
                    flags = excluded.flags,
                    synced_at = excluded.synced_at
                ",
            )
            .bind(account_email)
            .bind(mailbox)
            .bind(entry.uid)
            .bind(&entry.flags)
            .bind(entry.synced_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        for uid in removals {
            sqlx::query(
                r"DELETE FROM cached_messages WHERE account_email = ? AND mailbox = ? AND uid = ?",
            )
            .bind(account_email)
            .bind(mailbox)
            .bind(*uid)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            account = account_email,
            mailbox,
            added = additions.len(),
            updated = updates.len(),
            removed = removals.len(),
            "applied reconciliation"
        );
        Ok(())
    }

    /// Remove every entry belonging to an account, across mailboxes.
    ///
    /// Used when an account is removed from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn clear_account(&self, account_email: &str) -> Result<()> {
        sqlx::query(r"DELETE FROM cached_messages WHERE account_email = ?")
            .bind(account_email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Default database location: `<data dir>/mailsync/cache.db`.
///
/// Creates the parent directory so a fresh installation can open the
/// database immediately. The daemon and one-shot `sync` invocations both
/// resolve to this path and therefore observe the same state.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined or created.
pub fn default_cache_path() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .ok_or_else(|| crate::Error::Config("could not determine data directory".to_string()))?
        .join("mailsync");
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("cache.db"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry(account: &str, mailbox: &str, uid: u32, flags: &str) -> CacheEntry {
        CacheEntry {
            account_email: account.to_string(),
            mailbox: mailbox.to_string(),
            uid,
            flags: flags.to_string(),
            synced_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_apply_and_read_back() {
        let repo = CacheRepository::in_memory().await.unwrap();
        let additions = vec![
            entry("a@example.com", "INBOX", 3, "\\Seen"),
            entry("a@example.com", "INBOX", 5, ""),
        ];

        repo.apply("a@example.com", "INBOX", &additions, &[], &[])
            .await
            .unwrap();

        let entries = repo.entries("a@example.com", "INBOX").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].uid, 3);
        assert_eq!(entries[0].flags, "\\Seen");
        assert_eq!(entries[1].uid, 5);
    }

    #[tokio::test]
    async fn test_apply_updates_and_removals() {
        let repo = CacheRepository::in_memory().await.unwrap();
        let additions = vec![
            entry("a@example.com", "INBOX", 3, ""),
            entry("a@example.com", "INBOX", 5, ""),
        ];
        repo.apply("a@example.com", "INBOX", &additions, &[], &[])
            .await
            .unwrap();

        let updates = vec![entry("a@example.com", "INBOX", 3, "\\Seen")];
        repo.apply("a@example.com", "INBOX", &[], &updates, &[5])
            .await
            .unwrap();

        let entries = repo.entries("a@example.com", "INBOX").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].uid, 3);
        assert_eq!(entries[0].flags, "\\Seen");
    }

    #[tokio::test]
    async fn test_entries_are_scoped_by_key() {
        let repo = CacheRepository::in_memory().await.unwrap();
        repo.apply(
            "a@example.com",
            "INBOX",
            &[entry("a@example.com", "INBOX", 1, "")],
            &[],
            &[],
        )
        .await
        .unwrap();
        repo.apply(
            "b@example.com",
            "INBOX",
            &[entry("b@example.com", "INBOX", 1, "")],
            &[],
            &[],
        )
        .await
        .unwrap();
        repo.apply(
            "a@example.com",
            "Archive",
            &[entry("a@example.com", "Archive", 9, "")],
            &[],
            &[],
        )
        .await
        .unwrap();

        assert_eq!(repo.entries("a@example.com", "INBOX").await.unwrap().len(), 1);
        assert_eq!(repo.entries("b@example.com", "INBOX").await.unwrap().len(), 1);
        assert_eq!(
            repo.entries("a@example.com", "Archive").await.unwrap().len(),
            1
        );
        assert!(repo.entries("c@example.com", "INBOX").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_account() {
        let repo = CacheRepository::in_memory().await.unwrap();
        repo.apply(
            "a@example.com",
            "INBOX",
            &[entry("a@example.com", "INBOX", 1, "")],
            &[],
            &[],
        )
        .await
        .unwrap();

        repo.clear_account("a@example.com").await.unwrap();
        assert!(repo.entries("a@example.com", "INBOX").await.unwrap().is_empty());
    }
}
