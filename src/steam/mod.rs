mod client;

pub use client::{FetchError, LibrarySource, SteamClient, OWNED_GAMES_URL};
