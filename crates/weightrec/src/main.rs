//! `weightrec` - CLI for recording weigh-ins
//!
//! This binary provides the command-line front end over the weightrec
//! library: adding, listing, correcting and deleting entries, and showing
//! the rolling-average trend.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use weightrec::cli::output::{render_entries, render_trend};
use weightrec::cli::{
    AddCommand, Cli, Command, ConfigCommand, ListCommand, StatusCommand, TrendCommand,
};
use weightrec::{init_logging, Config, Dashboard, SportsActivity, Tracker};

fn main() -> ExitCode {
    // A .env file is optional; variables already set win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let rejected = err
                .downcast_ref::<weightrec::Error>()
                .is_some_and(weightrec::Error::is_validation);
            if rejected {
                eprintln!("Rejected: {err}");
                ExitCode::from(2)
            } else {
                eprintln!("Error: {err:#}");
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone()).context("could not load configuration")?;

    // Config commands never touch the store
    let command = match cli.command {
        Command::Config(cmd) => return handle_config(&config, cmd),
        command => command,
    };

    let mut tracker = Tracker::open(&config)?;

    match command {
        Command::Add(cmd) => handle_add(&mut tracker, &cmd)?,
        Command::List(cmd) => handle_list(&mut tracker, &cmd)?,
        Command::Delete(cmd) => {
            if tracker.delete(&cmd.id)? == 0 {
                eprintln!("Warning: ID not found.");
            } else {
                println!("Deleted {}", cmd.id.trim());
            }
        }
        Command::Update(cmd) => {
            if tracker.update_weight(&cmd.id, cmd.weight)? == 0 {
                eprintln!("Warning: no change made.");
            } else {
                println!("Updated {} to {:.1} kg", cmd.id.trim(), cmd.weight);
            }
        }
        Command::Trend(cmd) => handle_trend(&mut tracker, &cmd)?,
        Command::Status(cmd) => handle_status(&config, &mut tracker, &cmd)?,
        Command::Config(_) => {}
    }
    Ok(())
}

fn handle_add(tracker: &mut Tracker, cmd: &AddCommand) -> anyhow::Result<()> {
    let date = cmd
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let id = tracker.add(date, cmd.weight, SportsActivity::from(cmd.sport))?;
    println!("Added {id} ({date}, {:.1} kg)", cmd.weight);
    Ok(())
}

fn handle_list(tracker: &mut Tracker, cmd: &ListCommand) -> anyhow::Result<()> {
    let dashboard = tracker.dashboard(cmd.sport)?;
    println!("{}", render_entries(&dashboard.table, cmd.format)?);
    Ok(())
}

fn handle_trend(tracker: &mut Tracker, cmd: &TrendCommand) -> anyhow::Result<()> {
    let dashboard = match cmd.window {
        Some(0) => anyhow::bail!("--window must be greater than 0"),
        Some(window) => Dashboard::build(tracker.entries()?, false, window),
        None => tracker.dashboard(false)?,
    };
    let window = cmd.window.unwrap_or_else(|| tracker.window());
    println!("{}", render_trend(&dashboard.chart, window, cmd.format)?);
    Ok(())
}

fn handle_status(
    config: &Config,
    tracker: &mut Tracker,
    cmd: &StatusCommand,
) -> anyhow::Result<()> {
    let backend = tracker.handle().backend();
    let target = tracker.handle().target().to_string();
    let entries = tracker.entries()?;
    let count = entries.len();
    let latest = entries.last().map(|entry| (entry.date, entry.weight));

    if cmd.json {
        let status = serde_json::json!({
            "backend": backend,
            "target": target,
            "database": config.store.database,
            "collection": config.store.collection,
            "entries": count,
            "latest": latest.map(|(date, weight)| serde_json::json!({
                "date": date,
                "weight": weight,
            })),
            "rolling_window": config.view.rolling_window,
            "cache_ttl_secs": config.view.cache_ttl_secs,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("weightrec status");
        println!("----------------");
        println!("Backend:        {backend}");
        println!("Target:         {target}");
        println!("Collection:     {}.{}", config.store.database, config.store.collection);
        println!("Entries:        {count}");
        match latest {
            Some((date, weight)) => println!("Latest:         {date} ({weight:.1} kg)"),
            None => println!("Latest:         -"),
        }
        println!("Rolling window: {}", config.view.rolling_window);
        println!("Cache TTL:      {}s", config.view.cache_ttl_secs);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!(
                    "  URI:                {}",
                    config.store.uri.as_deref().unwrap_or("(not set)")
                );
                println!("  Database:           {}", config.store.database);
                println!("  Collection:         {}", config.store.collection);
                println!("  Secrets file:       {}", config.secrets_path().display());
                println!();
                println!("[View]");
                println!("  Rolling window:     {}", config.view.rolling_window);
                println!("  Cache TTL (secs):   {}", config.view.cache_ttl_secs);
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
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
