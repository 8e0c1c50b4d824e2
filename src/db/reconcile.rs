use rusqlite::{params, Connection, OptionalExtension};

use crate::models::OwnedGameEntry;

/// Row counts produced by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub games_added: usize,
    pub links_added: usize,
    pub samples_recorded: usize,
}

/// Merge one fetched library into the store for `steamid`.
///
/// Games and ownership links are only ever inserted, never updated, so the
/// first name seen for an appid sticks and a link keeps the time it was
/// first observed. A playtime sample is appended for every entry on every
/// call. The caller owns the transaction.
pub fn reconcile_library(
    conn: &Connection,
    steamid: &str,
    games: &[OwnedGameEntry],
    synced_at: &str,
) -> rusqlite::Result<ReconcileReport> {
    let mut report = ReconcileReport::default();

    let mut find_game = conn.prepare_cached("SELECT 1 FROM games WHERE appid = ?1")?;
    let mut insert_game = conn.prepare_cached("INSERT INTO games (appid, name) VALUES (?1, ?2)")?;
    let mut find_link =
        conn.prepare_cached("SELECT 1 FROM owned_games WHERE steamid = ?1 AND appid = ?2")?;
    let mut insert_link = conn.prepare_cached(
        "INSERT INTO owned_games (steamid, appid, created_at) VALUES (?1, ?2, ?3)",
    )?;
    let mut insert_sample = conn.prepare_cached(
        "INSERT INTO playtime_samples (created_at, steamid, appid, playtime_forever) VALUES (?1, ?2, ?3, ?4)",
    )?;

    for game in games {
        let known = find_game
            .query_row(params![game.appid], |_| Ok(()))
            .optional()?
            .is_some();
        if !known {
            insert_game.execute(params![game.appid, game.name])?;
            report.games_added += 1;
        }

        let linked = find_link
            .query_row(params![steamid, game.appid], |_| Ok(()))
            .optional()?
            .is_some();
        if !linked {
            insert_link.execute(params![steamid, game.appid, synced_at])?;
            report.links_added += 1;
        }

        insert_sample.execute(params![synced_at, steamid, game.appid, game.playtime_forever])?;
        report.samples_recorded += 1;
    }

    Ok(report)
}
