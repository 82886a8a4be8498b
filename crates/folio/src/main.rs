mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error, info};

use folio_core::constants;
use folio_core::storage::StorageLocation;
use folio_core::{SettingsStore, StorageConfig, StorageService};

use crate::cli::SettingsPage;

/// Folio: application-local storage with a persisted settings page
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Print "pong" and exit
    #[arg(long)]
    ping: bool,

    /// Base directory holding the storage locations (overrides FOLIO_STORAGE_DIR)
    #[arg(long, value_name = "DIR")]
    storage_dir: Option<PathBuf>,

    /// Storage location the settings file lives in
    #[arg(long, default_value_t = StorageLocation::Local)]
    location: StorageLocation,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the toggle and the selected choice
    Show,
    /// Turn the sample toggle on or off
    SetToggle {
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Select a choice by name
    SetChoice {
        name: String,
    },
    /// List the available choices, marking the selected one
    Choices,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = env_logger::try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> folio_core::Result<()> {
    info!("{} {}", constants::APP_NAME, constants::APP_VERSION);

    let mut config = StorageConfig::default().with_env_overrides()?;
    if let Some(dir) = args.storage_dir {
        config.base_dir = dir;
    }
    debug!("Using storage base directory {}", config.base_dir.display());

    let storage = StorageService::open(args.location, &config).await?;
    let store = SettingsStore::open(storage).await?;
    let mut page = SettingsPage::open(&store);

    match args.command.unwrap_or(Commands::Show) {
        Commands::Show => println!("{}", page.render()),
        Commands::SetToggle { value } => {
            page.toggle = value;
            save(&page, &store).await?;
            println!("{}", page.render());
        }
        Commands::SetChoice { name } => {
            page.choices.select_name(&name)?;
            save(&page, &store).await?;
            println!("{}", page.render());
        }
        Commands::Choices => {
            let selected = page.choices.selected_item();
            for (item, name) in page.choices.items().iter().zip(page.choices.names()) {
                let marker = if *item == selected { "*" } else { " " };
                println!("{} {}", marker, name);
            }
        }
    }
    Ok(())
}

async fn save(page: &SettingsPage, store: &SettingsStore) -> folio_core::Result<()> {
    page.commit(store)?;
    store.save().await?;
    Ok(())
}
