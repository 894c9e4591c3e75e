//! Interactive assistant chat handler
//!
//! Runs a readline loop over an [`AssistantFlow`] for a single learner.
//! Plain input is sent as a conversation turn; slash commands drive
//! retries, activity assignment, and status display.

use std::sync::Arc;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::api::{PracticeApi, SuggestedActivity};
use crate::assistant::{
    AssignmentOutcome, AssistantFlow, ChatMessage, MessageBody, MessageStatus, Role, Transcript,
};
use crate::config::{AssistantConfig, Config};
use crate::error::Result;
use crate::store::DataStore;

/// A parsed line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Regular text, sent to the assistant as a turn.
    Message,
    Help,
    Status,
    /// Retry the most recent failed message.
    Retry,
    /// Assign the n-th activity of the latest suggestion list (1-based).
    Assign(usize),
    Quit,
    Unknown(String),
}

/// Parse one line of REPL input.
///
/// Anything not starting with `/` is a message; bare `exit` and `quit`
/// also leave the chat, matching what people type out of habit.
pub fn parse_chat_command(input: &str) -> ChatCommand {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return ChatCommand::Quit;
    }
    if !trimmed.starts_with('/') {
        return ChatCommand::Message;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    match command {
        "/help" => ChatCommand::Help,
        "/status" => ChatCommand::Status,
        "/retry" => ChatCommand::Retry,
        "/quit" | "/exit" => ChatCommand::Quit,
        "/assign" => match rest.parse::<usize>() {
            Ok(n) if n >= 1 => ChatCommand::Assign(n),
            _ => ChatCommand::Unknown(trimmed.to_string()),
        },
        _ => ChatCommand::Unknown(command.to_string()),
    }
}

/// Start interactive chat with the activity assistant
///
/// # Arguments
///
/// * `config` - Global configuration (assistant context knobs)
/// * `api` - Practice API client
/// * `store` - Shared data store; warmed before the session opens so the
///   profile snapshot has real learner data
/// * `learner_id` - Learner the conversation is about
/// * `no_notes` - Disable session-note attachment for this run
/// * `no_prefs` - Disable AI-preference attachment for this run
pub async fn run_chat(
    config: &Config,
    api: Arc<dyn PracticeApi>,
    store: Arc<DataStore>,
    learner_id: String,
    no_notes: bool,
    no_prefs: bool,
) -> Result<()> {
    tracing::info!(learner_id = %learner_id, "Starting assistant chat");

    let mut assistant_cfg = config.assistant.clone();
    if no_notes {
        assistant_cfg.attach_session_notes = false;
    }
    if no_prefs {
        assistant_cfg.attach_ai_preferences = false;
    }

    // Warm the store so the session opens with a real profile snapshot.
    // Failures are not fatal; the flow falls back to a minimal profile.
    if let Err(e) = store.fetch_learners().await {
        tracing::warn!("Could not fetch learners before chat: {}", e);
    }
    if let Err(e) = store.goals_for_learner(&learner_id, false).await {
        tracing::warn!("Could not fetch goals before chat: {}", e);
    }

    let learner_name = store
        .learners()
        .items
        .iter()
        .find(|learner| learner.id == learner_id)
        .map(|learner| learner.name.clone())
        .unwrap_or_else(|| learner_id.clone());

    let mut flow = AssistantFlow::new(api, store, learner_id).with_config(&assistant_cfg);

    let mut rl = DefaultEditor::new()?;
    print_welcome_banner(&learner_name, &assistant_cfg);

    loop {
        let prompt = format!("[{}] >> ", learner_name);
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match parse_chat_command(trimmed) {
                    ChatCommand::Help => {
                        print_help();
                        continue;
                    }
                    ChatCommand::Status => {
                        print_status_display(&flow);
                        continue;
                    }
                    ChatCommand::Retry => {
                        handle_retry(&mut flow).await;
                        continue;
                    }
                    ChatCommand::Assign(n) => {
                        handle_assign(&mut flow, n).await;
                        continue;
                    }
                    ChatCommand::Quit => break,
                    ChatCommand::Unknown(command) => {
                        println!(
                            "Unknown command: {}. Type /help for available commands.",
                            command
                        );
                        continue;
                    }
                    ChatCommand::Message => {}
                }

                match flow.send(trimmed).await {
                    Ok(appended) => render_appended(&appended),
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Retry the most recent failed message, if there is one
async fn handle_retry(flow: &mut AssistantFlow) {
    let target = flow.transcript().last_retryable().map(|m| m.id.clone());
    match target {
        Some(id) => match flow.retry(&id).await {
            Ok(appended) => render_appended(&appended),
            Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
        },
        None => println!("Nothing to retry."),
    }
}

/// Assign the n-th activity of the latest suggestion list
async fn handle_assign(flow: &mut AssistantFlow, index: usize) {
    let activity = match latest_suggestions(flow.transcript()) {
        Some(activities) if index >= 1 && index <= activities.len() => {
            activities[index - 1].clone()
        }
        Some(activities) => {
            println!("Pick a number between 1 and {}.", activities.len());
            return;
        }
        None => {
            println!("No suggested activities to assign yet.");
            return;
        }
    };

    let before = flow.transcript().len();
    let outcome = flow.assign_activity(&activity).await;
    render_appended(&flow.transcript().messages()[before..]);

    if outcome == AssignmentOutcome::AlreadyAssigned {
        println!(
            "{}",
            format!("\"{}\" is already assigned.", activity.name).yellow()
        );
    }
}

/// Most recent suggestion list in the transcript, if any.
///
/// `/assign <n>` always targets this list; earlier lists are display-only
/// history.
pub fn latest_suggestions(transcript: &Transcript) -> Option<&[SuggestedActivity]> {
    transcript
        .messages()
        .iter()
        .rev()
        .find_map(|message| match &message.body {
            MessageBody::Activities { activities } => Some(activities.as_slice()),
            _ => None,
        })
}

/// Render the entries a flow call appended, skipping the echoed user text
fn render_appended(messages: &[ChatMessage]) {
    for message in messages {
        if message.role == Role::User {
            continue;
        }
        render_message(message);
    }
}

fn render_message(message: &ChatMessage) {
    match &message.body {
        MessageBody::Text { content } => {
            if message.status == MessageStatus::Error {
                eprintln!("{}", content.red());
                println!("Type /retry to send it again.");
            } else {
                println!("\n{}\n", content);
            }
        }
        MessageBody::Activities { activities } => {
            println!("\nSuggested activities:");
            for (i, activity) in activities.iter().enumerate() {
                println!("{}", format_activity_line(i + 1, activity));
            }
            println!("\nType /assign <number> to add one to the learner's goals.\n");
        }
        MessageBody::System { content } => {
            if message.status == MessageStatus::Error {
                eprintln!("{}", content.red());
            } else {
                println!("{}", content.cyan());
            }
        }
    }
}

/// One numbered line for a suggested activity
fn format_activity_line(number: usize, activity: &SuggestedActivity) -> String {
    let mut details = Vec::new();
    if let Some(domain) = &activity.domain {
        details.push(domain.clone());
    }
    if let Some(level) = &activity.difficulty_level {
        details.push(level.clone());
    }
    if let Some(duration) = &activity.estimated_duration {
        details.push(duration.clone());
    }

    let suffix = if details.is_empty() {
        String::new()
    } else {
        format!(" ({})", details.join(", "))
    };

    if activity.description.is_empty() {
        format!("  {}. {}{}", number, activity.name, suffix)
    } else {
        format!("  {}. {}{}: {}", number, activity.name, suffix, activity.description)
    }
}

fn attach_label(enabled: bool) -> &'static str {
    if enabled {
        "attached"
    } else {
        "off"
    }
}

/// Display welcome banner at the start of interactive chat
fn print_welcome_banner(learner_name: &str, config: &AssistantConfig) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║               therakit Activity Assistant Chat               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Learner:          {}", learner_name);
    println!(
        "Session notes:    {}",
        attach_label(config.attach_session_notes)
    );
    println!(
        "AI preferences:   {}",
        attach_label(config.attach_ai_preferences)
    );
    println!("\nType '/help' for available commands, '/quit' to leave\n");
}

/// Display session phase and transcript details
///
/// Called when the user types the '/status' command.
fn print_status_display(flow: &AssistantFlow) {
    println!("\nAssistant session status\n");
    println!("Learner:      {}", flow.learner_id());
    println!("Phase:        {}", flow.phase().name());
    if let Some(session_id) = flow.phase().session_id() {
        println!("Session id:   {}", session_id);
    }
    println!("Transcript:   {} messages", flow.transcript().len());
    println!("Assigned:     {} activities", flow.assigned_ids().len());
    println!();
}

fn print_help() {
    println!("\nAvailable commands:");
    println!("  /assign <n>  Assign the n-th suggested activity to the learner");
    println!("  /retry       Retry the most recent failed message");
    println!("  /status      Show session phase and transcript size");
    println!("  /help        Show this help");
    println!("  /quit        Leave the chat (also: exit, CTRL-D)");
    println!("\nAnything else is sent to the activity assistant.\n");
}
