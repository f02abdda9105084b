use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{GameEvent, GameServices, GameSession, HttpGameApi, RegistrationForm};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::{Command, CommandError};

#[derive(Parser, Debug)]
#[command(name = "bulls-bears", about = "Play Bulls & Bears from the terminal")]
struct Args {
    /// Game server base URL, e.g. http://127.0.0.1:5000
    #[arg(long)]
    server_url: Option<String>,
    /// Config file; defaults to ./bulls_bears.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(log_filter) = args.log_filter {
        settings.log_filter = log_filter;
    }
    init_tracing(&settings.log_filter);
    info!(server_url = %settings.server_url, "terminal: starting");

    let api = HttpGameApi::new(&settings.server_url, settings.request_timeout())?;
    let session = GameSession::new(GameServices::from_backend(Arc::new(api)));
    let renderer = tokio::spawn(print_events(session.subscribe_events()));

    println!("Bulls & Bears\n{}", commands::HELP);
    if session.resume().await.is_none() {
        println!("Not signed in. Use `login` or `register`.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match commands::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => run_command(&session, command).await,
            Err(CommandError::Empty) => {}
            Err(err) => println!("{err}"),
        }
    }

    renderer.abort();
    info!("terminal: bye");
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Failures are already published as notices, so results are only inspected
/// for the data they carry.
async fn run_command(session: &Arc<GameSession>, command: Command) {
    debug!(command = command.name(), "terminal: command");
    match command {
        Command::Login { username, password } => {
            let _ = session.login(&username, &password).await;
        }
        Command::Register {
            username,
            password,
            display_name,
            email,
        } => {
            let form = RegistrationForm {
                username,
                password,
                display_name,
                email: email.unwrap_or_default(),
            };
            let _ = session.register(form).await;
        }
        Command::Start => {
            let _ = session.start_round().await;
        }
        Command::Guess(word) => {
            // Keeps the prompt responsive while the guess is evaluated.
            let session = Arc::clone(session);
            tokio::spawn(async move {
                let _ = session.submit_guess(&word).await;
            });
        }
        Command::Board => println!("{}", render::board(&session.round_snapshot().await)),
        Command::Leaderboard => {
            let _ = session.show_leaderboard().await;
        }
        Command::Rules => {
            let _ = session.show_rules().await;
        }
        Command::Profile => {
            if let Ok(profile) = session.load_profile().await {
                println!("{}", render::profile(&profile));
            }
        }
        Command::ProfileSet {
            display_name,
            email,
        } => {
            let email = match email {
                Some(email) => email,
                None => session
                    .identity()
                    .await
                    .and_then(|identity| identity.email)
                    .unwrap_or_default(),
            };
            let _ = session.update_profile(&display_name, &email).await;
        }
        Command::Logout => session.logout().await,
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => {}
    }
}

async fn print_events(mut events: broadcast::Receiver<GameEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(line) = render::event_line(&event) {
                    println!("{line}");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "terminal: renderer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
