//! therakit - Pediatric therapy practice management client
//!
#![doc = "therakit - Pediatric therapy practice management client"]
#![doc = "Main entry point for the therakit CLI."]

use std::sync::Arc;

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use therakit::api::{HttpApi, PracticeApi};
use therakit::auth::KeyringTokenSource;
use therakit::cli::{ActivityCommand, AuthCommand, Cli, Commands, DocsCommand};
use therakit::commands;
use therakit::config::Config;
use therakit::store::{ActivityLog, DataStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Optional metrics exporter (no-op without the prometheus feature)
    therakit::metrics::init_metrics_exporter();

    // If the user supplied an activity DB path on the CLI, mirror it into
    // THERAKIT_ACTIVITY_DB so the activity log initializer picks it up.
    if let Some(db_path) = &cli.activity_db {
        std::env::set_var("THERAKIT_ACTIVITY_DB", db_path);
        tracing::info!("Using activity DB override from CLI: {}", db_path.display());
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("therakit.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Assemble the shared components: API client, activity log, data store
    let tokens = Arc::new(KeyringTokenSource::default());
    let api: Arc<dyn PracticeApi> = Arc::new(HttpApi::new(&config.api, tokens)?);
    let activity = ActivityLog::new(config.activity.max_entries)?;
    let store = Arc::new(DataStore::new(api.clone(), activity));

    // Execute command
    match cli.command {
        Commands::Auth { command } => {
            match command {
                AuthCommand::Login {
                    token,
                    expires_in,
                    label,
                } => commands::auth::login(&store, token, expires_in, label)?,
                AuthCommand::Logout => commands::auth::logout(&store)?,
                AuthCommand::Status => commands::auth::status()?,
            }
            Ok(())
        }
        Commands::Learners { mine, temp, json } => {
            commands::learners::list_learners(&store, mine, temp, json).await?;
            Ok(())
        }
        Commands::Goals {
            learner_id,
            force,
            json,
        } => {
            commands::goals::show_goals(&store, &learner_id, force, json).await?;
            Ok(())
        }
        Commands::Prefs { learner_id, set } => {
            match set {
                Some(text) => {
                    commands::prefs::set(api.as_ref(), &store, &learner_id, &text).await?
                }
                None => commands::prefs::show(api.as_ref(), &learner_id).await?,
            }
            Ok(())
        }
        Commands::Sessions {
            today,
            summary,
            json,
        } => {
            commands::sessions::list_sessions(&store, today, summary, json).await?;
            Ok(())
        }
        Commands::Refresh => {
            commands::refresh::run_refresh(&store).await?;
            Ok(())
        }
        Commands::Chat {
            learner_id,
            no_notes,
            no_prefs,
        } => {
            tracing::info!("Starting assistant chat for learner {}", learner_id);
            commands::chat::run_chat(
                &config,
                api.clone(),
                store.clone(),
                learner_id,
                no_notes,
                no_prefs,
            )
            .await?;
            Ok(())
        }
        Commands::Enroll { file } => {
            commands::enroll::run_enroll(api.as_ref(), &store, &file).await?;
            Ok(())
        }
        Commands::Docs { command } => {
            match command {
                DocsCommand::Upload { path, child_id } => {
                    commands::docs::upload(api.as_ref(), &store, &path, child_id).await?
                }
                DocsCommand::Delete { file_id } => {
                    commands::docs::delete(api.as_ref(), &file_id).await?
                }
                DocsCommand::View { file_id } => {
                    commands::docs::view(api.as_ref(), &file_id).await?
                }
            }
            Ok(())
        }
        Commands::Activity { command } => {
            match command.unwrap_or(ActivityCommand::List { json: false }) {
                ActivityCommand::List { json } => commands::activity::list(&store, json)?,
                ActivityCommand::Add { message, kind } => {
                    commands::activity::add(&store, &message, &kind)?
                }
                ActivityCommand::Clear => commands::activity::clear(&store)?,
            }
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `--verbose` lowers the default level to debug; RUST_LOG still wins
/// when set.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "therakit=debug"
    } else {
        "therakit=info"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
