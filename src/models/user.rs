use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UserId;

/// Registered user; owned by the Entity Store and read-only here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
}
