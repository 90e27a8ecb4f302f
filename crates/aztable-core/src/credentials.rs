//! Storage account credentials.

use std::fmt;

use crate::Result;
use crate::error::ConfigurationError;
use crate::types::AccountName;

/// Shared-key credentials for a storage account.
///
/// Holds the account name and the base64-encoded secret key exactly as the
/// service hands them out. The key is only decoded when a signer is built.
///
/// # Security
///
/// The key is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use aztable_core::StorageCredentials;
///
/// let creds = StorageCredentials::new("myaccount", "c2VjcmV0").unwrap();
/// assert_eq!(creds.account().as_str(), "myaccount");
/// ```
#[derive(Clone)]
pub struct StorageCredentials {
    account: AccountName,
    key: String,
}

impl StorageCredentials {
    /// Create new credentials.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either value is blank, and an
    /// input error if the account name is not a valid storage account name.
    pub fn new(account: impl AsRef<str>, key: impl Into<String>) -> Result<Self> {
        let account = account.as_ref().trim();
        if account.is_empty() {
            return Err(ConfigurationError::MissingAccount.into());
        }
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigurationError::MissingKey.into());
        }

        Ok(Self {
            account: AccountName::new(account)?,
            key,
        })
    }

    /// Returns the account name.
    pub fn account(&self) -> &AccountName {
        &self.account
    }

    /// Returns the base64 key.
    ///
    /// # Security
    ///
    /// Use this only when constructing a signer.
    /// Never log or display this value.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("account", &self.account)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
