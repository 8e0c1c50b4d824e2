use chrono::Utc;

use crate::db::{ReconcileReport, Repository};
use crate::error::Result;
use crate::models::Library;
use crate::steam::LibrarySource;

/// Totals for one batch pass over every stored user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub users_synced: usize,
    pub users_failed: usize,
    pub games_added: usize,
    pub samples_recorded: usize,
}

pub struct SyncManager<S> {
    repository: Repository,
    source: S,
}

impl<S: LibrarySource> SyncManager<S> {
    pub fn new(repository: Repository, source: S) -> Self {
        Self { repository, source }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn into_repository(self) -> Repository {
        self.repository
    }

    pub async fn fetch_library(&self, steamid: &str) -> Result<Library> {
        let library = self.source.fetch_library(steamid).await?;
        tracing::debug!("Fetched {} games for {}", library.games().len(), steamid);
        Ok(library)
    }

    /// Start tracking a new user. A failed fetch leaves storage untouched.
    pub async fn register_user(&self, steamid: &str) -> Result<ReconcileReport> {
        let library = self.fetch_library(steamid).await?;
        let report = self
            .repository
            .register_user(steamid.to_string(), library.into_games(), Utc::now())
            .await?;

        tracing::info!(
            "Registered {} with {} games ({} new to the catalog)",
            steamid,
            report.links_added,
            report.games_added
        );
        Ok(report)
    }

    /// Record one more snapshot for a stored user, fetching it unless the
    /// caller already has it.
    pub async fn sync_existing_user(
        &self,
        steamid: &str,
        library: Option<Library>,
    ) -> Result<ReconcileReport> {
        let library = match library {
            Some(library) => library,
            None => self.fetch_library(steamid).await?,
        };

        let report = self
            .repository
            .record_library(steamid.to_string(), library.into_games(), Utc::now())
            .await?;

        tracing::info!(
            "Synced {}: {} samples, {} new links",
            steamid,
            report.samples_recorded,
            report.links_added
        );
        Ok(report)
    }

    /// Sync every stored user in turn. A user whose sync fails is logged and
    /// skipped; users already synced stay committed.
    pub async fn sync_all(&self) -> Result<SyncReport> {
        let users = self.repository.get_all_users().await?;
        let mut totals = SyncReport::default();

        for user in users {
            match self.sync_existing_user(&user.steamid, None).await {
                Ok(report) => {
                    totals.users_synced += 1;
                    totals.games_added += report.games_added;
                    totals.samples_recorded += report.samples_recorded;
                }
                Err(e) => {
                    tracing::warn!("Failed to sync {}: {}", user.steamid, e);
                    totals.users_failed += 1;
                }
            }
        }

        Ok(totals)
    }
}
