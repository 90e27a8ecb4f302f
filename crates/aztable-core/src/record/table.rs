//! Table descriptors and entry annotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A table as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// The table name.
    pub name: String,
    /// Service-assigned identifier (a URI).
    pub id: String,
    /// Last-modified time, when the service reported a parsable one.
    pub updated: Option<DateTime<Utc>>,
}

/// Author annotation for an Atom entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Author {
    /// Create an author with no email.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Build an annotation from optional parts.
    ///
    /// An email without a name has nowhere to go in the entry, so it is
    /// dropped along with the blank name.
    pub fn from_parts(name: Option<&str>, email: Option<&str>) -> Option<Self> {
        let name = name.map(str::trim).filter(|n| !n.is_empty())?;
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        Some(Self {
            name: name.to_string(),
            email: email.map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_from_parts() {
        assert_eq!(Author::from_parts(None, Some("a@b.c")), None);
        assert_eq!(Author::from_parts(Some("  "), None), None);
        assert_eq!(
            Author::from_parts(Some("Ann"), Some("ann@example.com")),
            Some(Author::new("Ann").with_email("ann@example.com"))
        );
        assert_eq!(Author::from_parts(Some("Ann"), Some("")), Some(Author::new("Ann")));
    }
}
