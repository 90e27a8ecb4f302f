//! SharedKey signature computation.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::trace;

use aztable_core::error::ConfigurationError;
use aztable_core::types::AccountName;
use aztable_core::{Result, StorageCredentials};

type HmacSha256 = Hmac<Sha256>;

/// Which string-to-sign layout a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningProfile {
    /// Table metadata requests: create, list and delete table.
    Table,
    /// Entity requests: everything that reads or writes entities.
    Entity,
}

/// Everything that goes into one request's signature.
///
/// Built fresh for each attempt; the date changes between retries.
#[derive(Debug, Clone)]
pub struct SigningContext<'a> {
    pub profile: SigningProfile,
    pub verb: &'a str,
    /// RFC 1123 date, identical to the `x-ms-date` header.
    pub date: &'a str,
    pub content_type: &'a str,
    pub content_length: usize,
    pub if_match: Option<&'a str>,
    pub content_md5: Option<&'a str>,
    pub canonical_headers: String,
    pub canonical_resource: String,
}

impl SigningContext<'_> {
    /// The exact text that gets signed.
    pub fn string_to_sign(&self) -> String {
        match self.profile {
            SigningProfile::Table => format!(
                "{}\n\n{}\n{}\n{}",
                self.verb, self.content_type, self.date, self.canonical_resource
            ),
            SigningProfile::Entity => {
                let length = match self.verb {
                    "GET" | "HEAD" => String::new(),
                    _ => self.content_length.to_string(),
                };
                format!(
                    "{}\n\n\n{}\n{}\n\n\n\n{}\n\n\n\n{}{}",
                    self.verb,
                    length,
                    self.content_md5.unwrap_or_default(),
                    self.if_match.unwrap_or_default(),
                    self.canonical_headers,
                    self.canonical_resource
                )
            }
        }
    }
}

/// Signs requests with an account's shared key.
///
/// The key is decoded once at construction, so a malformed key fails before
/// any request is built.
///
/// # Security
///
/// The key is never exposed in Debug output to prevent accidental logging.
#[derive(Clone)]
pub struct SharedKeySigner {
    account: AccountName,
    mac: HmacSha256,
}

impl SharedKeySigner {
    /// Build a signer from credentials.
    pub fn new(credentials: &StorageCredentials) -> Result<Self> {
        let key = STANDARD
            .decode(credentials.key().trim())
            .map_err(|e| ConfigurationError::MalformedKey {
                reason: e.to_string(),
            })?;
        if key.is_empty() {
            return Err(ConfigurationError::MalformedKey {
                reason: "key decodes to zero bytes".to_string(),
            }
            .into());
        }
        let mac = HmacSha256::new_from_slice(&key).map_err(|e| ConfigurationError::MalformedKey {
            reason: e.to_string(),
        })?;

        Ok(Self {
            account: credentials.account().clone(),
            mac,
        })
    }

    /// The account requests are signed for.
    pub fn account(&self) -> &AccountName {
        &self.account
    }

    /// Base64 HMAC-SHA256 of `message`.
    pub fn sign(&self, message: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(message.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// The `Authorization` header value for a request.
    pub fn authorization(&self, context: &SigningContext<'_>) -> String {
        let message = context.string_to_sign();
        trace!(string_to_sign = %message.escape_debug(), "signing request");
        format!("SharedKey {}:{}", self.account, self.sign(&message))
    }
}

impl fmt::Debug for SharedKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedKeySigner")
            .field("account", &self.account)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
