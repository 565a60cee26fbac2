use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use flowganise::admin::{AjaxAction, AjaxRequest, Caller, NonceSigner, SessionGuard};
use flowganise::config::{
    self, ADMIN_CAPABILITY, NONCE_ACTION, PLUGIN_BASENAME, PLUGIN_SLUG, PluginConfig,
};
use flowganise::plugin::Plugin;
use flowganise::store::SqliteStore;

#[derive(Parser)]
#[command(name = "flowganise")]
#[command(version, about = "Self-update, cache invalidation and site connection for Flowganise Analytics")]
struct Cli {
    /// Configuration file (defaults to the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store database (defaults to the data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the activation hook
    Activate,
    /// Run the deactivation hook
    Deactivate,
    /// Run the post-install hook after a self-update
    UpgradeComplete,
    /// Record the installed version, check for a newer release and rewrite
    /// the update metadata
    CheckUpdate,
    /// Print plugin details for the "view details" dialog
    PluginInfo {
        #[arg(long, default_value = PLUGIN_SLUG)]
        slug: String,
    },
    /// Clear every present cache layer
    ClearCaches,
    /// Print the tracking snippet
    Snippet,
    /// Issue an anti-forgery token for a user
    Nonce {
        #[arg(long)]
        user_id: u64,
    },
    /// Run an admin request
    Ajax {
        /// connect, disconnect, save_settings or debug (with or without the
        /// flowganise_ prefix)
        action: AjaxAction,
        #[arg(long)]
        nonce: String,
        #[arg(long)]
        user_id: u64,
        /// Caller holds the administrator capability
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        organization_id: Option<String>,
        #[arg(long)]
        domain: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = PluginConfig::load(&cli.config.unwrap_or_else(config::config_path))?;
    let db_path = cli.db.unwrap_or_else(config::db_path);
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let store = Arc::new(SqliteStore::new(&db_path)?);
    let signer = NonceSigner::new(&config.nonce_secret);
    let plugin = Plugin::new(config, store)?;

    match cli.command {
        Command::Activate => print_json(&plugin.activate().await?)?,
        Command::Deactivate => print_json(&plugin.deactivate().await)?,
        Command::UpgradeComplete => print_json(&plugin.upgrade_complete().await)?,
        Command::CheckUpdate => {
            // Stands in for the host's scan of installed plugins
            let mut record = plugin.load_update_metadata()?;
            record
                .checked
                .insert(PLUGIN_BASENAME.to_string(), plugin.version().to_string());
            plugin.save_update_metadata(&record)?;

            plugin.run_update_check().await?;
            print_json(&plugin.load_update_metadata()?)?;
        }
        Command::PluginInfo { slug } => print_json(&plugin.plugin_info(&slug).await)?,
        Command::ClearCaches => print_json(&plugin.clear_caches().await)?,
        Command::Snippet => {
            if let Some(snippet) = plugin.tracking_snippet()? {
                print!("{}", snippet.render());
            }
        }
        Command::Nonce { user_id } => println!("{}", signer.create(NONCE_ACTION, user_id)),
        Command::Ajax {
            action,
            nonce,
            user_id,
            admin,
            organization_id,
            domain,
        } => {
            let capabilities: &[&str] = if admin { &["read", ADMIN_CAPABILITY] } else { &["read"] };
            let guard = SessionGuard::new(signer, Caller::new(user_id, capabilities));
            let request = AjaxRequest {
                action,
                nonce,
                organization_id,
                domain,
            };
            print_json(&plugin.handle_ajax(&guard, &request).await)?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = flowganise::logging::init(&config::log_path(), cli.json_logs)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
