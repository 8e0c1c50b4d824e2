use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::models::Library;

pub const OWNED_GAMES_URL: &str = "https://api.steampowered.com/IPlayerService/GetOwnedGames/v1/";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid API key")]
    Auth,

    #[error("remote service down")]
    Unavailable,

    #[error("unexpected HTTP status {0}")]
    Unknown(StatusCode),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed library response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of a `GetOwnedGames` call, tagged by HTTP status.
#[derive(Debug)]
pub enum LibraryResponse {
    Success(Library),
    AuthFailure,
    Unavailable,
    Unknown(StatusCode),
}

impl LibraryResponse {
    /// Only a 200 body is ever parsed.
    pub fn from_parts(status: StatusCode, body: &[u8]) -> Result<Self, FetchError> {
        let response = match status {
            StatusCode::OK => Self::Success(serde_json::from_slice(body)?),
            StatusCode::UNAUTHORIZED => Self::AuthFailure,
            StatusCode::SERVICE_UNAVAILABLE => Self::Unavailable,
            other => Self::Unknown(other),
        };
        Ok(response)
    }

    pub fn into_result(self) -> Result<Library, FetchError> {
        match self {
            Self::Success(library) => Ok(library),
            Self::AuthFailure => Err(FetchError::Auth),
            Self::Unavailable => Err(FetchError::Unavailable),
            Self::Unknown(status) => Err(FetchError::Unknown(status)),
        }
    }
}

/// Anything that can produce a user's owned-game library.
pub trait LibrarySource {
    async fn fetch_library(&self, steamid: &str) -> Result<Library, FetchError>;
}

pub struct SteamClient {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl SteamClient {
    pub fn new(api_key: String, endpoint: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("playtime-tracker/1.0")
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }

    pub async fn get_owned_games(&self, steamid: &str) -> Result<LibraryResponse, FetchError> {
        tracing::debug!("Fetching owned games for {}", steamid);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", steamid),
                ("include_appinfo", "1"),
                ("include_played_free_games", "1"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = if status == StatusCode::OK {
            response.bytes().await?
        } else {
            Default::default()
        };

        LibraryResponse::from_parts(status, &body)
    }
}

impl LibrarySource for SteamClient {
    async fn fetch_library(&self, steamid: &str) -> Result<Library, FetchError> {
        self.get_owned_games(steamid).await?.into_result()
    }
}
