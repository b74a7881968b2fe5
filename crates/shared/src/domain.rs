use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned person identifier.
///
/// Backends disagree on the JSON type (document stores hand out strings, json-server
/// style fixtures hand out integers). The id is sent back in the form it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonId {
    Text(String),
    Integer(i64),
}

impl PersonId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Integer(number) => write!(f, "{number}"),
        }
    }
}

impl From<i64> for PersonId {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub number: String,
}

impl Person {
    pub fn new(id: impl Into<PersonId>, name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            number: number.into(),
        }
    }

    /// Copy of this record carrying a different number; identity and name are kept.
    pub fn with_number(&self, number: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            number: number.into(),
        }
    }
}

/// Create payload; the id is assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub name: String,
    pub number: String,
}

impl NewPerson {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
        }
    }
}
