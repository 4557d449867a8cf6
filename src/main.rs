use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use shoplist::categorize::categorize;
use shoplist::config::Config;
use shoplist::storage::{Database, DatabaseError};
use shoplist::sync::{
    last_sync_key, list_id_from_queue_key, load_last_sync, Connectivity, HttpRemote, ItemRef,
    OfflineQueue, RemoteApi, SyncManager, SyncOutcome, TempId, UpdatesOutcome, QUEUE_KEY_PREFIX,
};
use shoplist::ui::{render_list, ConsoleView};
use shoplist::util::{clean_item_name, validate_server_url};

type Manager = SyncManager<Database, Arc<HttpRemote>, ConsoleView<std::io::Stdout>>;

/// Get the config directory path (~/.config/shoplist/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("shoplist"))
}

#[derive(Parser, Debug)]
#[command(
    name = "shoplist",
    about = "Offline-first shopping list client with automatic categorization"
)]
struct Args {
    /// Shopping list to operate on
    #[arg(long, global = true, value_name = "ID", default_value_t = 1)]
    list: i64,

    /// Work offline: only queue changes locally
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the category an item name would be filed under
    Categorize {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Add an item (queued, then synced when online)
    Add {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Delete an item by server id, or cancel a pending add with --temp
    Delete {
        /// Server item id
        #[arg(required_unless_present = "temp", conflicts_with = "temp")]
        item_id: Option<i64>,

        /// Temporary id of a not-yet-synced item
        #[arg(long, value_name = "TEMP_ID")]
        temp: Option<String>,
    },
    /// Replay queued changes against the server
    Sync,
    /// Fetch changes made since the last sync
    Updates,
    /// Show queued changes for every list
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Pure function, no state needed
    if let Command::Categorize { name } = &args.command {
        let name = name.join(" ");
        println!("{}", categorize(&name));
        return Ok(());
    }

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // User-only access: the database holds queued edits and sync state
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(&config_dir, std::fs::Permissions::from_mode(0o700))
        {
            tracing::warn!(
                path = %config_dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }

    let config = Config::load(&config_dir.join("config.toml")).context("Failed to load config")?;
    tracing::debug!(?config, "Effective configuration");

    let db_path = config_dir.join("offline.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of shoplist appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open database: {}", e)),
    };

    if let Command::Status = args.command {
        return print_status(&db, args.list).await;
    }

    let remote = Arc::new(build_remote(&config)?);
    let connectivity = Connectivity::new(!(args.offline || config.start_offline));

    let mut manager: Manager = SyncManager::open(
        args.list,
        config.user_id,
        db,
        Arc::clone(&remote),
        ConsoleView::stdout(),
        connectivity.subscribe(),
    )
    .await;

    match args.command {
        Command::Add { name } => {
            let name = clean_item_name(&name.join(" "))
                .ok_or_else(|| anyhow::anyhow!("Item name is empty"))?;
            let temp_id = manager.add_item(&name).await;
            if manager.is_online() {
                report_sync(manager.sync_offline_changes().await);
            } else {
                println!("Queued offline as {temp_id}");
            }
        }
        Command::Delete { item_id, temp } => {
            let item = match (temp, item_id) {
                (Some(temp), _) => ItemRef::Temporary(TempId::from(temp)),
                (None, Some(id)) => ItemRef::Server(id),
                (None, None) => anyhow::bail!("Either an item id or --temp is required"),
            };
            let is_server_item = matches!(item, ItemRef::Server(_));
            manager.queue_delete(item).await;
            if is_server_item && manager.is_online() {
                report_sync(manager.sync_offline_changes().await);
            }
        }
        Command::Sync => report_sync(manager.sync_offline_changes().await),
        Command::Updates => match manager.request_updates_since_last_sync().await {
            UpdatesOutcome::Skipped => println!("Offline: not checking for updates."),
            UpdatesOutcome::Fetched(updates) if updates.changes.is_empty() => {
                println!("No updates since your last sync.")
            }
            UpdatesOutcome::Fetched(_) => {}
            UpdatesOutcome::Failed => eprintln!("Could not fetch updates, try again later."),
        },
        Command::Categorize { .. } | Command::Status => {}
    }

    if manager.view_mut().take_refresh_request() {
        reload_list(&mut manager, remote.as_ref()).await;
    }
    manager.view_mut().write_status_line();

    Ok(())
}

fn build_remote(config: &Config) -> Result<HttpRemote> {
    let base_url = validate_server_url(&config.server_url).context("Invalid server_url")?;
    let client = reqwest::Client::builder()
        .user_agent(concat!("shoplist/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let mut remote = HttpRemote::new(client, base_url).with_timeout(config.request_timeout());
    if let Some(cookie) = config.session_secret() {
        remote = remote.with_session_cookie(cookie);
    }
    Ok(remote)
}

/// Full reload of the list after a successful sync or incoming updates.
async fn reload_list(manager: &mut Manager, remote: &HttpRemote) {
    match remote.fetch_updates(manager.list_id(), 0).await {
        Ok(updates) => {
            if let Err(e) = render_list(manager.view_mut().writer_mut(), &updates.changes) {
                tracing::warn!(error = %e, "Failed to print list");
            }
        }
        Err(e) => {
            tracing::warn!(list_id = manager.list_id(), error = %e, "Failed to reload list");
            eprintln!("Could not reload the list: {e}");
        }
    }
}

fn report_sync(outcome: SyncOutcome) {
    tracing::debug!(?outcome, "Sync finished");
    if let SyncOutcome::Skipped(reason) = outcome {
        println!("Nothing synced ({reason:?}).");
    }
}

async fn print_status(db: &Database, current_list: i64) -> Result<()> {
    let keys = db
        .keys_with_prefix(QUEUE_KEY_PREFIX)
        .await
        .context("Failed to read queued changes")?;

    let mut any = false;
    for key in keys {
        let Some(list_id) = list_id_from_queue_key(&key) else {
            continue;
        };
        let queue = OfflineQueue::load(db, list_id).await;
        if queue.is_empty() {
            continue;
        }
        any = true;
        println!("list {list_id}: {} pending changes", queue.len());
        for op in queue.operations() {
            println!("  {} @ {}", op.kind(), op.timestamp());
        }
    }
    if !any {
        println!("No pending changes.");
    }

    match load_last_sync(db, current_list).await {
        Some(ts) => println!("list {current_list}: last sync {}", format_ms(ts)),
        None => println!(
            "list {current_list}: never synced ({} unset)",
            last_sync_key(current_list)
        ),
    }
    Ok(())
}

fn format_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}
