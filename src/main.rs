mod config;
mod db;
mod error;
mod models;
mod steam;
mod sync;

use config::Config;
use db::Repository;
use error::{AppError, Result};
use steam::SteamClient;
use sync::SyncManager;

enum Command {
    SyncAll,
    Add(String),
    Users,
    History { steamid: String, appid: i64 },
}

impl Command {
    /// Read-only commands work from the local store alone.
    fn needs_steam_api(&self) -> bool {
        matches!(self, Command::SyncAll | Command::Add(_))
    }
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args.get(1).map(String::as_str) {
        None => Ok(Command::SyncAll),
        Some("--add") => args
            .get(2)
            .map(|steamid| Command::Add(steamid.clone()))
            .ok_or_else(|| anyhow::anyhow!("usage: --add <steamid>").into()),
        Some("--users") => Ok(Command::Users),
        Some("--history") => {
            let usage = || AppError::from(anyhow::anyhow!("usage: --history <steamid> <appid>"));
            let steamid = args.get(2).ok_or_else(usage)?.clone();
            let appid = args
                .get(3)
                .and_then(|s| s.parse().ok())
                .ok_or_else(usage)?;
            Ok(Command::History { steamid, appid })
        }
        Some(other) => Err(anyhow::anyhow!("unknown argument: {}", other).into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = parse_args(&args)?;

    let config = Config::load()?;
    let client = if command.needs_steam_api() {
        let api_key = config.load_api_key()?;
        Some(SteamClient::new(api_key, config.endpoint()?, config.request_timeout())?)
    } else {
        None
    };

    let repository = Repository::open(&config.db_path).await?;

    let (repository, result) = match client {
        Some(client) => {
            let sync = SyncManager::new(repository, client);
            let result = run_remote(command, &sync).await;
            (sync.into_repository(), result)
        }
        None => {
            let result = run_local(command, &repository).await;
            (repository, result)
        }
    };

    // Close even when the command failed; the command's error wins.
    let closed = repository.close().await;
    result?;
    closed
}

async fn run_remote(command: Command, sync: &SyncManager<SteamClient>) -> Result<()> {
    match command {
        Command::SyncAll => {
            let report = sync.sync_all().await?;
            tracing::info!(
                "Synced {} users ({} failed), {} samples recorded, {} new games",
                report.users_synced,
                report.users_failed,
                report.samples_recorded,
                report.games_added
            );
        }
        Command::Add(steamid) => {
            if sync.repository().user_exists(&steamid).await? {
                return Err(AppError::AlreadyRegistered(steamid));
            }
            let report = sync.register_user(&steamid).await?;
            println!("Added {} with {} games", steamid, report.links_added);
        }
        other => return run_local(other, sync.repository()).await,
    }
    Ok(())
}

async fn run_local(command: Command, repository: &Repository) -> Result<()> {
    match command {
        Command::Users => {
            for user in repository.get_all_users().await? {
                let owned = repository.get_owned_games(&user.steamid).await?;
                match owned.iter().map(|o| o.created_at).min() {
                    Some(since) => println!(
                        "{}  {} games, tracked since {}",
                        user.steamid,
                        owned.len(),
                        since.format("%Y-%m-%d")
                    ),
                    None => println!("{}  no games", user.steamid),
                }
            }
            println!("{} games in catalog", repository.get_all_games().await?.len());
        }
        Command::History { steamid, appid } => {
            let name = repository
                .get_game(appid)
                .await?
                .map(|game| game.name)
                .unwrap_or_else(|| format!("app {appid}"));
            println!("{} / {}", steamid, name);
            for sample in repository.get_playtime_samples(&steamid, Some(appid)).await? {
                println!(
                    "{}  {} min",
                    sample.created_at.format("%Y-%m-%d %H:%M"),
                    sample.playtime_forever
                );
            }
        }
        Command::SyncAll | Command::Add(_) => {
            return Err(anyhow::anyhow!("this command needs the Steam API").into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("playtime-tracker")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_arguments_syncs_everyone() {
        assert!(matches!(parse_args(&args(&[])), Ok(Command::SyncAll)));
    }

    #[test]
    fn add_requires_steamid() {
        assert!(matches!(parse_args(&args(&["--add"])), Err(AppError::Other(_))));
        assert!(matches!(
            parse_args(&args(&["--add", "76561197960287930"])),
            Ok(Command::Add(id)) if id == "76561197960287930"
        ));
    }

    #[test]
    fn history_needs_numeric_appid() {
        assert!(parse_args(&args(&["--history", "U1", "abc"])).is_err());
        assert!(matches!(
            parse_args(&args(&["--history", "U1", "440"])),
            Ok(Command::History { appid: 440, .. })
        ));
    }

    #[test]
    fn only_network_commands_need_the_api_key() {
        assert!(Command::SyncAll.needs_steam_api());
        assert!(Command::Add("U1".to_string()).needs_steam_api());
        assert!(!Command::Users.needs_steam_api());
        assert!(!Command::History {
            steamid: "U1".to_string(),
            appid: 440,
        }
        .needs_steam_api());
    }

    #[tokio::test]
    async fn local_commands_run_against_the_store_alone() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("playtime.db");
        let repository = Repository::open(path.to_str().unwrap()).await.unwrap();

        tokio_test::assert_ok!(run_local(Command::Users, &repository).await);
        tokio_test::assert_ok!(
            run_local(
                Command::History {
                    steamid: "U1".to_string(),
                    appid: 440,
                },
                &repository,
            )
            .await
        );
        assert!(run_local(Command::SyncAll, &repository).await.is_err());

        repository.close().await.unwrap();
    }
}
