//! On-disk account store.
//!
//! Accounts are persisted as a JSON document in the user config directory.
//! The store supplies an ordered list of accounts; order is preserved so
//! sync passes always visit accounts in the same sequence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::Account;
use crate::{Error, Result};

/// Serialized form of the store file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    accounts: Vec<Account>,
}

/// Ordered collection of configured accounts, persisted as JSON.
#[derive(Debug)]
pub struct AccountStore {
    accounts: Vec<Account>,
    path: PathBuf,
}

impl AccountStore {
    /// Loads the store from the default config location, creating an empty
    /// store if no file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or the
    /// file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(default_store_path()?)
    }

    /// Loads the store from an explicit path; a missing file yields an
    /// empty store bound to that path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let accounts = if path.exists() {
            let data = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&data)?;
            file.accounts
        } else {
            Vec::new()
        };
        debug!(count = accounts.len(), path = %path.display(), "loaded account store");

        Ok(Self { accounts, path })
    }

    /// Persists the store back to its path, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O or serialization failure.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = StoreFile {
            accounts: self.accounts.clone(),
        };
        let data = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    /// Returns the accounts in configured order.
    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Returns true if no accounts are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Looks up an account by email.
    #[must_use]
    pub fn get(&self, email: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.email == email)
    }

    /// Resolves which account a command should use: an explicit email when
    /// given, otherwise the sole configured account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountNotFound`] for an unknown email and
    /// [`Error::Config`] when no email was given and the choice is
    /// ambiguous (zero or several accounts).
    pub fn resolve(&self, email: Option<&str>) -> Result<&Account> {
        match email {
            Some(email) => self
                .get(email)
                .ok_or_else(|| Error::AccountNotFound(email.to_string())),
            None => match self.accounts.as_slice() {
                [only] => Ok(only),
                [] => Err(Error::Config("no accounts configured".to_string())),
                _ => Err(Error::Config(
                    "multiple accounts configured; specify one with --account".to_string(),
                )),
            },
        }
    }

    /// Adds an account, replacing any existing one with the same email.
    pub fn add(&mut self, account: Account) {
        if let Some(existing) = self.accounts.iter_mut().find(|a| a.email == account.email) {
            *existing = account;
        } else {
            self.accounts.push(account);
        }
    }

    /// Removes an account by email; returns true if one was removed.
    pub fn remove(&mut self, email: &str) -> bool {
        let before = self.accounts.len();
        self.accounts.retain(|a| a.email != email);
        self.accounts.len() != before
    }

    /// Returns the path this store persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Default store location: `<config dir>/mailsync/accounts.json`.
fn default_store_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("mailsync").join("accounts.json"))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mailsync-store-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let store = AccountStore::load_from(temp_store_path("missing")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_store_path("roundtrip");
        let mut store = AccountStore::load_from(&path).unwrap();
        store.add(Account::with_email("a@gmail.com"));
        store.add(Account::with_email("b@example.org"));
        store.save().unwrap();

        let reloaded = AccountStore::load_from(&path).unwrap();
        assert_eq!(reloaded.accounts().len(), 2);
        assert_eq!(reloaded.accounts()[0].email, "a@gmail.com");
        assert!(reloaded.get("b@example.org").is_some());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_add_replaces_by_email() {
        let mut store = AccountStore::load_from(temp_store_path("replace")).unwrap();
        store.add(Account::with_email("a@gmail.com"));
        let mut updated = Account::with_email("a@gmail.com");
        updated.password = "new-secret".to_string();
        store.add(updated);

        assert_eq!(store.accounts().len(), 1);
        assert_eq!(store.get("a@gmail.com").unwrap().password, "new-secret");
    }

    #[test]
    fn test_remove() {
        let mut store = AccountStore::load_from(temp_store_path("remove")).unwrap();
        store.add(Account::with_email("a@gmail.com"));
        assert!(store.remove("a@gmail.com"));
        assert!(!store.remove("a@gmail.com"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_resolve() {
        let mut store = AccountStore::load_from(temp_store_path("resolve")).unwrap();
        assert!(store.resolve(None).is_err());

        store.add(Account::with_email("a@gmail.com"));
        assert_eq!(store.resolve(None).unwrap().email, "a@gmail.com");

        store.add(Account::with_email("b@example.org"));
        assert!(matches!(store.resolve(None), Err(Error::Config(_))));
        assert_eq!(store.resolve(Some("b@example.org")).unwrap().email, "b@example.org");
        assert!(matches!(
            store.resolve(Some("nobody@example.org")),
            Err(Error::AccountNotFound(_))
        ));
    }
}
