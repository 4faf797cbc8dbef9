use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::UserId;

/// Kind of entity an audit event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Like,
    Review,
    Friend,
}

/// What happened to the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Like => write!(f, "LIKE"),
            EventType::Review => write!(f, "REVIEW"),
            EventType::Friend => write!(f, "FRIEND"),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Add => write!(f, "ADD"),
            Operation::Remove => write!(f, "REMOVE"),
            Operation::Update => write!(f, "UPDATE"),
        }
    }
}

/// Append-only audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub user_id: UserId,
    pub entity_id: i64,
    pub event_type: EventType,
    pub operation: Operation,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde() {
        let json = serde_json::to_string(&EventType::Review).unwrap();
        assert_eq!(json, format!("\"{}\"", EventType::Review));

        let json = serde_json::to_string(&Operation::Remove).unwrap();
        assert_eq!(json, format!("\"{}\"", Operation::Remove));
    }
}
