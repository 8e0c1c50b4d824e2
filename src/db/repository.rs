use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Game, OwnedGame, OwnedGameEntry, PlaytimeSample, User};

use super::reconcile::{reconcile_library, ReconcileReport};
use super::schema::SCHEMA;

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Close the connection, surfacing any error from the final flush.
    ///
    /// Dropping the repository also releases the handle, so early returns
    /// never leak it.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    // User operations

    /// Insert a brand-new user together with its first library snapshot.
    ///
    /// Fails if the user already exists. Nothing is written unless the
    /// whole snapshot lands.
    pub async fn register_user(
        &self,
        steamid: String,
        games: Vec<OwnedGameEntry>,
        synced_at: DateTime<Utc>,
    ) -> Result<ReconcileReport> {
        let report = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("INSERT INTO users (steamid) VALUES (?1)", params![steamid])?;
                let report = reconcile_library(&tx, &steamid, &games, &synced_at.to_rfc3339())?;
                tx.commit()?;
                Ok(report)
            })
            .await?;
        Ok(report)
    }

    pub async fn user_exists(&self, steamid: &str) -> Result<bool> {
        let steamid = steamid.to_string();
        let exists = self
            .conn
            .call(move |conn| {
                let found = conn
                    .query_row(
                        "SELECT 1 FROM users WHERE steamid = ?1",
                        params![steamid],
                        |_| Ok(()),
                    )
                    .optional()?;
                Ok(found.is_some())
            })
            .await?;
        Ok(exists)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        let users = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT steamid FROM users ORDER BY steamid")?;
                let users = stmt
                    .query_map([], |row| {
                        Ok(User {
                            steamid: row.get(0)?,
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(users)
            })
            .await?;
        Ok(users)
    }

    // Library operations

    /// Append a library snapshot for a user that is already stored.
    pub async fn record_library(
        &self,
        steamid: String,
        games: Vec<OwnedGameEntry>,
        synced_at: DateTime<Utc>,
    ) -> Result<ReconcileReport> {
        let report = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let report = reconcile_library(&tx, &steamid, &games, &synced_at.to_rfc3339())?;
                tx.commit()?;
                Ok(report)
            })
            .await?;
        Ok(report)
    }

    // Game operations

    pub async fn get_game(&self, appid: i64) -> Result<Option<Game>> {
        let game = self
            .conn
            .call(move |conn| {
                let game = conn
                    .query_row(
                        "SELECT appid, name FROM games WHERE appid = ?1",
                        params![appid],
                        game_from_row,
                    )
                    .optional()?;
                Ok(game)
            })
            .await?;
        Ok(game)
    }

    pub async fn get_all_games(&self) -> Result<Vec<Game>> {
        let games = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT appid, name FROM games ORDER BY appid")?;
                let games = stmt
                    .query_map([], game_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(games)
            })
            .await?;
        Ok(games)
    }

    pub async fn get_owned_games(&self, steamid: &str) -> Result<Vec<OwnedGame>> {
        let steamid = steamid.to_string();
        let owned = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT steamid, appid, created_at FROM owned_games WHERE steamid = ?1 ORDER BY appid",
                )?;
                let owned = stmt
                    .query_map(params![steamid], owned_game_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(owned)
            })
            .await?;
        Ok(owned)
    }

    // Playtime history

    /// Samples for a user, oldest first. Narrow to a single game with `appid`.
    pub async fn get_playtime_samples(
        &self,
        steamid: &str,
        appid: Option<i64>,
    ) -> Result<Vec<PlaytimeSample>> {
        let steamid = steamid.to_string();
        let samples = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, created_at, steamid, appid, playtime_forever
                       FROM playtime_samples
                       WHERE steamid = ?1 AND (?2 IS NULL OR appid = ?2)
                       ORDER BY id"#,
                )?;
                let samples = stmt
                    .query_map(params![steamid, appid], sample_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(samples)
            })
            .await?;
        Ok(samples)
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Timestamps written by a sync are RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Column defaults use SQLite's datetime('now') format
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_datetime(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unrecognized timestamp: {raw}").into(),
        )
    })
}

fn game_from_row(row: &Row) -> rusqlite::Result<Game> {
    Ok(Game {
        appid: row.get(0)?,
        name: row.get(1)?,
    })
}

fn owned_game_from_row(row: &Row) -> rusqlite::Result<OwnedGame> {
    Ok(OwnedGame {
        steamid: row.get(0)?,
        appid: row.get(1)?,
        created_at: timestamp_column(row, 2)?,
    })
}

fn sample_from_row(row: &Row) -> rusqlite::Result<PlaytimeSample> {
    Ok(PlaytimeSample {
        id: row.get(0)?,
        created_at: timestamp_column(row, 1)?,
        steamid: row.get(2)?,
        appid: row.get(3)?,
        playtime_forever: row.get(4)?,
    })
}
