use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub steamid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub appid: i64,
    pub name: String,
}

/// A user has owned this game at some point since `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedGame {
    pub steamid: String,
    pub appid: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaytimeSample {
    #[allow(dead_code)]
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub steamid: String,
    pub appid: i64,
    pub playtime_forever: i64,
}
