pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- users table
CREATE TABLE IF NOT EXISTS users (
    steamid TEXT PRIMARY KEY NOT NULL
);

-- games table (name is whatever the first sync saw)
CREATE TABLE IF NOT EXISTS games (
    appid INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL
);

-- owned_games table
CREATE TABLE IF NOT EXISTS owned_games (
    steamid TEXT NOT NULL REFERENCES users(steamid),
    appid INTEGER NOT NULL REFERENCES games(appid),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(steamid, appid)
);

-- playtime_samples table (append-only history)
CREATE TABLE IF NOT EXISTS playtime_samples (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    steamid TEXT NOT NULL REFERENCES users(steamid),
    appid INTEGER NOT NULL REFERENCES games(appid),
    playtime_forever INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_playtime_samples_user_game ON playtime_samples(steamid, appid);
CREATE INDEX IF NOT EXISTS idx_playtime_samples_created_at ON playtime_samples(created_at);
"#;
