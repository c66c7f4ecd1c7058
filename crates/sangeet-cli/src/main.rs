use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use sangeet_backend::Config;
use sangeet_core::CompositionDraft;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sangeet", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of the local storage partition (default: ~/.local/share/sangeet/storage)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Manage locally saved compositions
    ///
    /// Saved compositions live in a single JSON array under the
    /// 'saved_compositions' key of the storage partition, newest first.
    /// The partition is a plain directory, so it can be shared with other
    /// tools; concurrent writers are not coordinated and the last write wins.
    #[command(subcommand)]
    Compositions(CompositionCommand),

    /// Show what a role-guarded route does for a given sign-in state
    ///
    /// Evaluates the same decision the web client makes on every render:
    ///
    /// - still loading: show a loading indicator, no redirect
    /// - signed out: redirect to '/' and ask the user to sign in
    /// - wrong role: redirect to '/dashboard'
    /// - otherwise: render the page
    Guard {
        /// Route guard: student, astrologer or authenticated
        #[arg(long)]
        route: String,

        /// Role of the signed-in user (student, doctor, astrologer, admin, ...)
        #[arg(long, conflicts_with_all = ["signed_out", "loading"])]
        role: Option<String>,

        /// Evaluate with no signed-in user
        #[arg(long, conflicts_with = "loading")]
        signed_out: bool,

        /// Evaluate while authentication is still resolving
        #[arg(long)]
        loading: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Provision privileged accounts on the hosted backend
    ///
    /// Requires backend.project_id in the config file and a service
    /// credential file (see 'sangeet config example'). Any failure exits
    /// with status 1.
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, clap::Subcommand)]
enum CompositionCommand {
    /// List saved compositions, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Search title, raga, tala, mood, instruments and description
    Search {
        /// Case-insensitive text to look for; blank lists everything
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Show a single composition
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Save a new composition
    Save {
        #[arg(long)]
        title: String,
        #[arg(long)]
        raga: String,
        #[arg(long)]
        tala: String,
        /// Instrument (repeat for several)
        #[arg(long = "instrument")]
        instruments: Vec<String>,
        /// Tempo in beats per minute
        #[arg(long, default_value_t = 90.0)]
        tempo: f64,
        #[arg(long, default_value = "")]
        mood: String,
        /// URL of the generated audio
        #[arg(long, default_value = "")]
        audio_url: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a composition by id
    Delete { id: String },
    /// Remove all saved compositions
    Clear,
}

#[derive(Debug, clap::Subcommand)]
enum AdminCommand {
    /// Create an account and mark it as admin
    Create {
        #[arg(long)]
        email: String,
        /// Account password (falls back to SANGEET_ADMIN_PASSWORD)
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        /// Reset password and display name if the account already exists
        #[arg(long)]
        update_existing: bool,
        /// Service credential file (overrides credentials_path)
        #[arg(long)]
        credentials: Option<PathBuf>,
    },
    /// Mark an existing account as admin
    Promote {
        #[arg(long)]
        email: String,
        #[arg(long)]
        credentials: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print one value, or the whole effective configuration as TOML
    Get { key: Option<String> },
    /// Set a value in the config file
    Set { key: String, value: String },
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
}

fn load_config(storage_dir: Option<PathBuf>) -> Result<Config> {
    match storage_dir {
        Some(dir) => Config::load_with_storage_dir(dir),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compositions(command) => {
            let config = load_config(cli.storage_dir)?;
            let dir = config.storage_dir.as_path();
            log::debug!("Using storage partition at {}", dir.display());

            match command {
                CompositionCommand::List { json } => commands::compositions::list(dir, json)?,
                CompositionCommand::Search { query, json } => {
                    commands::compositions::search(dir, &query, json)?;
                }
                CompositionCommand::Show { id, json } => {
                    commands::compositions::show(dir, &id, json)?;
                }
                CompositionCommand::Save {
                    title,
                    raga,
                    tala,
                    instruments,
                    tempo,
                    mood,
                    audio_url,
                    description,
                } => {
                    let mut draft = CompositionDraft::new(title, raga, tala)
                        .with_instruments(instruments)
                        .with_tempo(tempo)
                        .with_mood(mood)
                        .with_audio_url(audio_url);
                    if let Some(description) = description {
                        draft = draft.with_description(description);
                    }
                    commands::compositions::save(dir, draft)?;
                }
                CompositionCommand::Delete { id } => commands::compositions::delete(dir, &id)?,
                CompositionCommand::Clear => commands::compositions::clear(dir)?,
            }
        }
        Commands::Guard {
            route,
            role,
            signed_out,
            loading,
            json,
        } => {
            commands::check_guard(&route, role, signed_out, loading, json)?;
        }
        Commands::Admin(command) => {
            let config = load_config(cli.storage_dir)?;

            match command {
                AdminCommand::Create {
                    email,
                    password,
                    display_name,
                    update_existing,
                    credentials,
                } => {
                    let password = match password {
                        Some(password) => password,
                        None => std::env::var("SANGEET_ADMIN_PASSWORD").map_err(|_| {
                            anyhow::anyhow!("Pass --password or set SANGEET_ADMIN_PASSWORD")
                        })?,
                    };
                    commands::admin::create_admin(
                        &config,
                        credentials,
                        email,
                        password,
                        display_name,
                        update_existing,
                    )
                    .await?;
                }
                AdminCommand::Promote { email, credentials } => {
                    commands::admin::promote(&config, credentials, email).await?;
                }
            }
        }
        Commands::Config(command) => match command {
            ConfigCommand::Show => commands::config::show_config()?,
            ConfigCommand::Get { key } => commands::config::get_config(key)?,
            ConfigCommand::Set { key, value } => commands::config::set_config(key, value)?,
            ConfigCommand::Path => commands::config::show_path()?,
            ConfigCommand::Example => commands::config::show_example()?,
            ConfigCommand::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
