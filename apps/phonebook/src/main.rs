use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{ActionOutcome, ContactListController, DraftEntry, HttpPersonService};
use tracing_subscriber::EnvFilter;

mod config;
mod shell;

use config::load_settings;
use shell::{load_phonebook, print_banner, render_persons, settle, Console};

#[derive(Parser, Debug)]
#[command(name = "phonebook", about = "Keep a phonebook in sync with a phonebook service")]
struct Cli {
    /// Base url of the phonebook service; overrides config and environment.
    #[arg(long)]
    server_url: Option<String>,
    /// Config file to read instead of ./phonebook.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the phonebook, optionally filtered by name.
    List {
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Add a person, or replace the number of an existing one.
    Add {
        name: String,
        number: String,
        /// Answer yes to the replace prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Remove a person by exact name.
    Remove {
        name: String,
        #[arg(long)]
        yes: bool,
    },
    /// Interactive session.
    Shell,
}

fn succeeded(outcome: &ActionOutcome) -> bool {
    !matches!(
        outcome,
        ActionOutcome::Rejected(_) | ActionOutcome::AlreadyRemoved(_)
    )
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref());
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }

    let service = HttpPersonService::with_timeout(&settings.server_url, settings.request_timeout())
        .context("failed to set up phonebook service client")?;
    let controller = ContactListController::with_notifier(Arc::new(service), settings.notifier());

    if let Err(banner) = load_phonebook(&controller).await {
        eprintln!("{banner}");
        return Ok(ExitCode::FAILURE);
    }

    let outcome = match cli.command {
        Command::List { filter } => {
            controller.set_filter(filter).await;
            println!("{}", render_persons(&controller.filtered_view().await));
            return Ok(ExitCode::SUCCESS);
        }
        Command::Add { name, number, yes } => {
            let mut console = Console::new(yes);
            let outcome = controller
                .submit_contact(DraftEntry::new(name, number))
                .await;
            settle(&controller, &mut console, outcome).await?
        }
        Command::Remove { name, yes } => {
            let Some(person) = controller.find_by_name(&name).await else {
                bail!("no entry named '{name}'");
            };
            let mut console = Console::new(yes);
            let outcome = controller.delete_contact(&person);
            settle(&controller, &mut console, outcome).await?
        }
        Command::Shell => {
            let mut console = Console::new(false);
            shell::run(&controller, &mut console).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    print_banner(&controller).await;
    Ok(if succeeded(&outcome) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
