//! Table service endpoint type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use super::AccountName;
use crate::error::{ConfigurationError, Error};

/// Host suffix of the public table service.
const SERVICE_HOST: &str = "table.core.windows.net";

/// A validated table service base URL.
///
/// The base URL always ends in `/`, so resource paths such as `Tables` or
/// `Orders()` are appended directly.
///
/// # Network URLs
///
/// Endpoints must use HTTPS. Plain HTTP is accepted only for localhost,
/// which covers local emulators and mock servers.
///
/// # Example
///
/// ```
/// use aztable_core::{AccountName, ServiceEndpoint};
///
/// let account = AccountName::new("myaccount").unwrap();
/// let endpoint = ServiceEndpoint::for_account(&account).unwrap();
/// assert_eq!(endpoint.resource_url("Tables"),
///            "https://myaccount.table.core.windows.net/Tables");
///
/// let local = ServiceEndpoint::new("http://127.0.0.1:10002").unwrap();
/// assert_eq!(local.resource_url("Orders()"), "http://127.0.0.1:10002/Orders()");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceEndpoint(Url);

impl ServiceEndpoint {
    /// Create an endpoint from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is not valid or doesn't
    /// meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let mut url = Url::parse(s).map_err(|e| ConfigurationError::Endpoint {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: always end with a slash so resources append cleanly
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self(url))
    }

    /// The public service endpoint for an account.
    pub fn for_account(account: &AccountName) -> Result<Self, Error> {
        Self::new(format!("https://{}.{}/", account, SERVICE_HOST))
    }

    /// Returns the full URL string for a resource path.
    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}{}", self.0.as_str(), resource.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            ConfigurationError::Endpoint {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        // Must be absolute
        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        // Must be HTTPS (or HTTP for localhost)
        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(invalid("must use HTTPS (HTTP allowed only for localhost)"));
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        Ok(())
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceEndpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServiceEndpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceEndpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServiceEndpoint::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ServiceEndpoint {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
