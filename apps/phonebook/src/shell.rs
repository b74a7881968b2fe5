//! Terminal front-end: rendering, confirmation prompts and the interactive loop.

use anyhow::{Context, Result};
use client_core::{
    ActionOutcome, ContactListController, DraftEntry, Notification, NotificationKind,
};
use shared::domain::Person;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

pub const HELP: &str = "\
commands:
  ls                   show the (filtered) phonebook
  filter [TEXT]        set the name filter; no TEXT clears it
  name TEXT            set the draft name
  number TEXT          set the draft number
  draft                show the draft
  save                 submit the draft
  add NAME NUMBER      add NAME, or replace the number if NAME exists
  rm NAME              remove NAME
  help                 show this text
  quit                 leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Filter(String),
    DraftName(String),
    DraftNumber(String),
    ShowDraft,
    Save,
    Add { name: String, number: String },
    Remove(String),
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "ls" | "list" => Ok(Self::List),
            "filter" => Ok(Self::Filter(rest.to_string())),
            "name" if !rest.is_empty() => Ok(Self::DraftName(rest.to_string())),
            "number" if !rest.is_empty() => Ok(Self::DraftNumber(rest.to_string())),
            "draft" => Ok(Self::ShowDraft),
            "save" => Ok(Self::Save),
            "add" => {
                // The number is the last word; everything before it is the name.
                let (name, number) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| "usage: add NAME NUMBER".to_string())?;
                Ok(Self::Add {
                    name: name.trim().to_string(),
                    number: number.to_string(),
                })
            }
            "rm" | "remove" if !rest.is_empty() => Ok(Self::Remove(rest.to_string())),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "name" | "number" | "rm" | "remove" => Err(format!("usage: {verb} TEXT")),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

pub fn render_banner(notification: Option<&Notification>) -> Option<String> {
    notification.map(|n| match n.kind {
        NotificationKind::Info => format!("[info] {}", n.message),
        NotificationKind::Error => format!("[error] {}", n.message),
    })
}

pub fn render_persons(persons: &[Person]) -> String {
    if persons.is_empty() {
        return "(no entries)".to_string();
    }
    persons
        .iter()
        .map(|p| format!("{} {}", p.name, p.number))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Line-oriented stdin/stdout used for commands and yes/no prompts.
pub struct Console {
    lines: Lines<BufReader<Stdin>>,
    assume_yes: bool,
}

impl Console {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            lines: BufReader::new(io::stdin()).lines(),
            assume_yes,
        }
    }

    pub async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;
        self.lines.next_line().await.context("failed to read stdin")
    }

    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let answer = self.read_line(&format!("{question} [y/N] ")).await?;
        Ok(answer.as_deref().map(parse_answer).unwrap_or(false))
    }
}

/// Runs an action outcome to completion, asking for confirmation when needed.
pub async fn settle(
    controller: &ContactListController,
    console: &mut Console,
    outcome: ActionOutcome,
) -> Result<ActionOutcome> {
    match outcome {
        ActionOutcome::ConfirmationRequired(confirmation) => {
            let accepted = console.confirm(&confirmation.prompt()).await?;
            Ok(controller.resolve(confirmation, accepted).await)
        }
        other => Ok(other),
    }
}

/// Loads the phonebook. On failure the error banner is handed back; it already
/// names the cause.
pub async fn load_phonebook(controller: &ContactListController) -> Result<usize, String> {
    match controller.initialize().await {
        Ok(count) => Ok(count),
        Err(err) => Err(render_banner(controller.notification().await.as_ref())
            .unwrap_or_else(|| format!("[error] failed to load phonebook: {err}"))),
    }
}

pub async fn print_banner(controller: &ContactListController) {
    if let Some(banner) = render_banner(controller.notification().await.as_ref()) {
        println!("{banner}");
    }
}

pub async fn run(controller: &ContactListController, console: &mut Console) -> Result<()> {
    println!("{HELP}");
    loop {
        let Some(line) = console.read_line("phonebook> ").await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };

        match command {
            ShellCommand::List => {
                println!("{}", render_persons(&controller.filtered_view().await));
            }
            ShellCommand::Filter(text) => {
                controller.set_filter(text).await;
                println!("{}", render_persons(&controller.filtered_view().await));
            }
            ShellCommand::DraftName(name) => controller.set_draft_name(name).await,
            ShellCommand::DraftNumber(number) => controller.set_draft_number(number).await,
            ShellCommand::ShowDraft => {
                let draft = controller.draft().await;
                println!("name: {}\nnumber: {}", draft.name, draft.number);
            }
            ShellCommand::Save => {
                let outcome = controller.submit_draft().await;
                settle(controller, console, outcome).await?;
            }
            ShellCommand::Add { name, number } => {
                let outcome = controller
                    .submit_contact(DraftEntry::new(name, number))
                    .await;
                settle(controller, console, outcome).await?;
            }
            ShellCommand::Remove(name) => match controller.find_by_name(&name).await {
                Some(person) => {
                    let outcome = controller.delete_contact(&person);
                    settle(controller, console, outcome).await?;
                }
                None => println!("no entry named '{name}'"),
            },
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
        }

        print_banner(controller).await;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
