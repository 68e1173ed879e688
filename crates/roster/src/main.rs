//! `roster` - CLI for roster
//!
//! Opens the student database, runs the requested action, and closes the
//! database again before exiting.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, StdinLock, Stdout};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use roster::cli::{AddCommand, Cli, Command, ConfigCommand, DeleteCommand};
use roster::console::{run_session, Console};
use roster::shell::Notice;
use roster::{
    init_logging, Config, DocumentStore, Feedback, Field, Outcome, RecordId, RecordStore, Shell,
};

type TerminalConsole = Console<StdinLock<'static>, Stdout>;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => handle_run(&config),
        Command::Add(cmd) => handle_add(&config, cmd),
        Command::List(cmd) => handle_list(&config, cmd.json),
        Command::Delete(cmd) => handle_delete(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn terminal() -> TerminalConsole {
    Console::new(io::stdin().lock(), io::stdout())
}

/// Open the configured database once for the whole command.
fn open_shell(config: &Config) -> anyhow::Result<Shell<DocumentStore>> {
    let path = config.database_path();
    let store = DocumentStore::open(&path, &config.store.collection)
        .with_context(|| format!("could not open student database at {}", path.display()))?;
    Ok(Shell::new(store).with_confirm_delete(config.ui.confirm_delete))
}

fn close_shell(shell: Shell<DocumentStore>) -> anyhow::Result<()> {
    shell
        .into_store()
        .close()
        .context("could not close student database")
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn handle_run(config: &Config) -> anyhow::Result<ExitCode> {
    let mut shell = open_shell(config)?;
    let mut console = terminal();
    run_session(&mut shell, &mut console)?;
    close_shell(shell)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_add(config: &Config, cmd: AddCommand) -> anyhow::Result<ExitCode> {
    let mut shell = open_shell(config)?;
    let mut console = terminal();

    let form = shell.form_mut();
    form.set(Field::Name, cmd.name);
    form.set(Field::Age, cmd.age);
    form.set(Field::Email, cmd.email);
    form.set(Field::Course, cmd.course);

    let outcome = shell.add(&mut console);
    if let Outcome::Added(id) = &outcome {
        console.print(&format!("{id}\n"))?;
    }

    close_shell(shell)?;
    Ok(exit_code(matches!(outcome, Outcome::Added(_))))
}

fn handle_list(config: &Config, json: bool) -> anyhow::Result<ExitCode> {
    let mut shell = open_shell(config)?;

    let success = if json {
        let records = shell.store().list_all()?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        true
    } else {
        let mut console = terminal();
        let refreshed = matches!(shell.refresh(&mut console), Outcome::Refreshed(_));
        if refreshed && !shell.table().is_empty() {
            console.print(&shell.table().to_text())?;
        }
        refreshed
    };

    close_shell(shell)?;
    Ok(exit_code(success))
}

fn handle_delete(config: &Config, cmd: &DeleteCommand) -> anyhow::Result<ExitCode> {
    let mut shell = open_shell(config)?;
    let mut console = terminal().assume_yes(cmd.yes);

    let mut success = false;
    if let Outcome::Refreshed(_) = shell.refresh(&mut console) {
        let id = RecordId::from_token(cmd.id.trim());
        if shell.table_mut().select_identifier(&id) {
            success = matches!(shell.delete(&mut console), Outcome::Deleted(_));
        } else {
            console.notify(Notice::warning(
                "Not Found",
                format!("No student record has identifier {id}."),
            ));
        }
    }

    close_shell(shell)?;
    Ok(exit_code(success))
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<ExitCode> {
    let shell = open_shell(config)?;
    let stats = shell.store().stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        let format_time = |time: Option<chrono::DateTime<chrono::Utc>>| {
            time.map_or_else(|| "-".to_string(), |t| t.to_rfc3339())
        };
        println!("roster status");
        println!("-------------");
        println!("Database:      {}", stats.path.display());
        println!("Collection:    {}", stats.collection);
        println!("Records:       {}", stats.total_records);
        println!("Oldest insert: {}", format_time(stats.oldest_insert));
        println!("Newest insert: {}", format_time(stats.newest_insert));
        println!("File size:     {} bytes", stats.db_size_bytes);
    }

    close_shell(shell)?;
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Data directory:     {}", config.data_dir().display());
                println!("  Database:           {}", config.store.database);
                println!("  Database file:      {}", config.database_path().display());
                println!("  Collection:         {}", config.store.collection);
                println!();
                println!("[UI]");
                println!("  Confirm delete:     {}", config.ui.confirm_delete);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
