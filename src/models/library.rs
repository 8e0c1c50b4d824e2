use serde::{Deserialize, Serialize};

/// Body of a `GetOwnedGames` response.
///
/// Private profiles come back with an empty `response` object, so every
/// field is defaulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub response: LibraryBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryBody {
    #[serde(default)]
    pub games: Vec<OwnedGameEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedGameEntry {
    pub appid: i64,
    #[serde(default)]
    pub name: String,
    /// Lifetime playtime in minutes.
    #[serde(default)]
    pub playtime_forever: i64,
}

impl Library {
    #[cfg(test)]
    pub fn from_games(games: Vec<OwnedGameEntry>) -> Self {
        Self {
            response: LibraryBody { games },
        }
    }

    pub fn games(&self) -> &[OwnedGameEntry] {
        &self.response.games
    }

    pub fn into_games(self) -> Vec<OwnedGameEntry> {
        self.response.games
    }
}
