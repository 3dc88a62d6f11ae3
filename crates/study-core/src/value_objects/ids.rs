//! String identifiers issued by the document backend and the identity provider
//!
//! Both kinds are opaque, non-empty strings without `/`, since they are joined
//! into slash-separated document paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error when parsing an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier contains reserved character '{0}'")]
    ReservedCharacter(char),
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier
            pub fn parse(value: impl Into<String>) -> Result<Self, IdParseError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(IdParseError::Empty);
                }
                if value.contains('/') {
                    return Err(IdParseError::ReservedCharacter('/'));
                }
                Ok(Self(value))
            }

            /// Borrow the raw identifier
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Get the inner String value
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// Id of a document within a collection (question, answer, user profile)
    DocumentId
);

string_id!(
    /// Authenticated user identity (uid from the identity provider)
    UserId
);

// Both id kinds share validation rules, so a user id is always a valid
// document id (reactions and profiles are keyed by uid).
impl From<UserId> for DocumentId {
    fn from(id: UserId) -> Self {
        Self(id.0)
    }
}
