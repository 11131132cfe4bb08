// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadenza chat` command implementation.
//!
//! Interactive REPL with a coloured prompt and readline history. Each line
//! is one controller turn; lines starting with `/` are shell commands.

use cadenza_agent::SessionController;
use cadenza_config::CadenzaConfig;
use cadenza_core::CadenzaError;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Quit,
    NewChat,
    Stop,
    Save,
    Replay,
    History,
    Help,
    UnknownCommand(&'a str),
    Message(&'a str),
    Empty,
}

fn parse_input(line: &str) -> ShellInput<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => ShellInput::Empty,
        "/quit" | "/exit" => ShellInput::Quit,
        "/new" => ShellInput::NewChat,
        "/stop" => ShellInput::Stop,
        "/save" => ShellInput::Save,
        "/replay" => ShellInput::Replay,
        "/history" => ShellInput::History,
        "/help" => ShellInput::Help,
        cmd if cmd.starts_with('/') => ShellInput::UnknownCommand(cmd),
        text => ShellInput::Message(text),
    }
}

/// Runs the `cadenza chat` interactive REPL.
pub async fn run_shell(config: CadenzaConfig) -> Result<(), CadenzaError> {
    crate::init_tracing("warn");

    let mut controller = crate::build_controller(&config).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| CadenzaError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} chat", config.agent.name).bold().green());
    println!(
        "session {}. Type {} for commands, {} to exit.\n",
        controller.session().id.to_string().dimmed(),
        "/help".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "you".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let input = parse_input(&line);
                if input == ShellInput::Empty {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                if input == ShellInput::Quit {
                    break;
                }
                handle_input(&mut controller, input).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

async fn handle_input(controller: &mut SessionController, input: ShellInput<'_>) {
    match input {
        ShellInput::Message(text) => {
            debug!(bytes = text.len(), "shell turn");
            let reply = controller.handle_user_message(text).await;
            println!("{}\n", reply.cyan());
        }
        ShellInput::NewChat => println!("{}\n", controller.new_chat().dimmed()),
        ShellInput::Stop => println!("{}\n", controller.stop_music().await),
        ShellInput::Save => println!("{}\n", controller.save_current_code().await),
        ShellInput::Replay => println!("{}\n", controller.replay_session().await),
        ShellInput::History => {
            for message in controller.history() {
                let who = if message.is_from_user {
                    "you".green()
                } else {
                    "model".magenta()
                };
                println!("{who}: {}", message.content);
            }
            println!();
        }
        ShellInput::Help => {
            println!("  /new      clear the conversation");
            println!("  /stop     stop the music");
            println!("  /save     save the current code");
            println!("  /replay   replay this session's snapshots");
            println!("  /history  show the conversation");
            println!("  /quit     exit\n");
        }
        ShellInput::UnknownCommand(cmd) => {
            eprintln!("{}: unknown command {cmd}, try /help\n", "error".red());
        }
        ShellInput::Quit | ShellInput::Empty => {}
    }
}
