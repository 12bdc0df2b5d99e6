mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use herald_core::{Engine, HeraldConfig};
use herald_storage::{Disposition, FilterMode};

#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Decide which notifications get read aloud", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List categories and their filter modes
    Categories,
    /// Category management
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Regenerate the block/private sets from the categories
    Apply,
    /// Show the block/private sets the announcement pipeline reads
    Filters {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-app overrides
    Override {
        #[command(subcommand)]
        action: OverrideAction,
    },
    /// Notification rules
    Rule {
        #[command(subcommand)]
        action: RuleAction,
    },
    /// Resolve what would happen to a notification
    Check {
        /// Notifying package
        package: String,
        /// Notification title
        #[arg(long)]
        title: Option<String>,
        /// Notification text
        #[arg(long)]
        text: Option<String>,
        /// Connected accessory (repeatable)
        #[arg(long = "device")]
        devices: Vec<String>,
        /// Connected WiFi network
        #[arg(long)]
        wifi: Option<String>,
        /// Foreground reports, oldest first (repeatable)
        #[arg(long = "foreground")]
        foreground: Vec<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config,
    /// Erase all stored categories, overrides and rules
    Reset {
        /// Required; nothing is erased without it
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryAction {
    /// Set a category's filter mode (allow, block, private)
    Set {
        /// Category ID
        id: String,
        /// Filter mode
        mode: FilterMode,
    },
    /// Restore the built-in categories
    Reset,
}

#[derive(Subcommand, Debug)]
enum OverrideAction {
    /// List overrides
    List,
    /// Override one package's filter mode
    Set {
        /// Exact package name
        package: String,
        /// Filter mode
        mode: FilterMode,
    },
    /// Remove a package's override
    Clear {
        /// Exact package name
        package: String,
    },
}

#[derive(Subcommand, Debug)]
enum RuleAction {
    /// List rules
    List,
    /// Add a rule
    Add {
        /// Rule name
        #[arg(short, long)]
        name: String,
        /// What to do when the condition holds (speak, block, private)
        #[arg(short, long)]
        action: Disposition,
        #[command(subcommand)]
        condition: ConditionArg,
    },
    /// Delete a rule by ID (or unique ID prefix)
    Remove { id: String },
    /// Enable a rule
    Enable { id: String },
    /// Disable a rule
    Disable { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ConditionArg {
    /// Any of these accessories is connected (none given: any accessory)
    Bluetooth { devices: Vec<String> },
    /// Connected to one of these networks
    Wifi {
        #[arg(required = true)]
        ssids: Vec<String>,
    },
    /// One of these apps is in the foreground
    Foreground {
        #[arg(required = true)]
        packages: Vec<String>,
    },
    /// The notifying app is in this category
    Category { id: String },
    /// Title or text contains one of these words
    Words {
        #[arg(required = true)]
        words: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = HeraldConfig::load()?;
    log::debug!("Using {config:?}");
    let engine = Engine::from_config(&config)?;

    match cli.command {
        Commands::Categories => commands::categories::list(&engine),
        Commands::Category { action } => match action {
            CategoryAction::Set { id, mode } => commands::categories::set_mode(&engine, &id, mode),
            CategoryAction::Reset => commands::categories::reset(&engine),
        },
        Commands::Apply => commands::categories::apply(&engine),
        Commands::Filters { json } => commands::categories::show_filters(&engine, json),
        Commands::Override { action } => match action {
            OverrideAction::List => commands::overrides::list(&engine),
            OverrideAction::Set { package, mode } => {
                commands::overrides::set(&engine, &package, Some(mode))
            }
            OverrideAction::Clear { package } => commands::overrides::set(&engine, &package, None),
        },
        Commands::Rule { action } => match action {
            RuleAction::List => commands::rules::list(&engine),
            RuleAction::Add {
                name,
                action,
                condition,
            } => commands::rules::add(&engine, name, action, condition),
            RuleAction::Remove { id } => commands::rules::remove(&engine, &id),
            RuleAction::Enable { id } => commands::rules::set_enabled(&engine, &id, true),
            RuleAction::Disable { id } => commands::rules::set_enabled(&engine, &id, false),
        },
        Commands::Check {
            package,
            title,
            text,
            devices,
            wifi,
            foreground,
            json,
        } => {
            let request = commands::check::CheckRequest {
                package,
                title,
                text,
                devices,
                wifi,
                foreground,
            };
            commands::check::check(&engine, request, json)
        }
        Commands::Reset { force } => commands::categories::reset_all(&engine, force),
        Commands::Config => {
            println!("Configuration");
            println!("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}");
            println!("fallback_window_ms = {}", config.fallback_window_ms);
            match &config.database_path {
                Some(path) => println!("database_path = {}", path.display()),
                None => println!("database_path = (default)"),
            }
            Ok(())
        }
    }
}
