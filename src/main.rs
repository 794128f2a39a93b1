use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use solace_voice::db::{self, JournalRepo, MoodRepo, NewMoodEntry, SessionRepo};
use solace_voice::responder::{HttpResponder, KeywordResponder, ResponseGenerator};
use solace_voice::voice::sim::{SimCapture, SimPlayback};
use solace_voice::{
    CaptureConfig, ChatConfig, ChatSession, ChatTranscript, Config, ConversationMode,
    PlaybackOptions, VoiceSession,
};

/// Solace - voice-first AI wellness companion
#[derive(Parser)]
#[command(name = "solace", version, about)]
struct Cli {
    /// User identifier for stored data
    #[arg(short, long, env = "SOLACE_USER", default_value = "local")]
    user: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat (the default)
    Chat {
        /// Resume a stored session by id
        #[arg(short, long)]
        session: Option<String>,
    },
    /// List stored chat sessions
    Sessions,
    /// Print a stored session's messages
    History {
        /// Session id
        session: String,
    },
    /// Journal entries
    #[command(subcommand)]
    Journal(JournalCommand),
    /// Mood check-ins
    #[command(subcommand)]
    Mood(MoodCommand),
}

#[derive(Subcommand)]
enum JournalCommand {
    /// Add a journal entry
    Add {
        /// Entry title
        title: String,
        /// Entry body
        content: String,
    },
    /// List journal entries, newest first
    List,
}

#[derive(Subcommand)]
enum MoodCommand {
    /// Record a mood check-in (scores are 1-10)
    Add {
        #[arg(long)]
        mood: u8,
        #[arg(long)]
        anxiety: u8,
        #[arg(long)]
        sleep: u8,
        #[arg(long)]
        energy: u8,
        #[arg(long)]
        notes: Option<String>,
        /// Date of the check-in (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List check-ins with per-dimension averages
    List {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,solace_voice=info",
        1 => "info,solace_voice=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load();
    let pool = db::init(config.db_path())?;

    match cli.command.unwrap_or(Command::Chat { session: None }) {
        Command::Chat { session } => chat(&config, pool, &cli.user, session).await,
        Command::Sessions => list_sessions(pool, &cli.user),
        Command::History { session } => show_history(pool, &session),
        Command::Journal(cmd) => journal(pool, &cli.user, cmd),
        Command::Mood(cmd) => mood(pool, &cli.user, cmd),
    }
}

/// Interactive chat REPL
///
/// Voice hardware is simulated: in voice mode, typed lines stand in for
/// dictation and replies are "spoken" by the simulated playback adapter.
async fn chat(
    config: &Config,
    pool: db::DbPool,
    user: &str,
    resume: Option<String>,
) -> anyhow::Result<()> {
    let repo = SessionRepo::new(pool);

    let (session_id, history) = match resume {
        Some(id) => {
            let stored = repo.find(&id)?;
            let history = repo.messages(&stored.id)?;
            (stored.id, history)
        }
        None => (repo.create(user, None)?.id, Vec::new()),
    };

    let responder: Arc<dyn ResponseGenerator> = match &config.responder.api_url {
        Some(url) => Arc::new(HttpResponder::new(
            url.clone(),
            config.responder.api_key.clone(),
            config.responder.model.clone(),
            config.responder.max_tokens,
        )),
        None => Arc::new(KeywordResponder::new().with_delay(Duration::from_millis(600))),
    };

    let voice = VoiceSession::new(
        Arc::new(SimCapture::new(Vec::<String>::new()).with_config(CaptureConfig {
            language: config.voice.language.clone(),
            ..CaptureConfig::default()
        })),
        Arc::new(SimPlayback::new()),
        PlaybackOptions {
            rate: config.voice.rate,
            pitch: config.voice.pitch,
            voice_hint: config.voice.voice_hint.clone(),
        },
    );

    let mut transcript = ChatTranscript::with_mirror(repo.clone(), &session_id);
    let resumed = !history.is_empty();
    // Resumed history is loaded before construction so the greeting is only
    // appended to brand-new sessions
    transcript.hydrate(history);
    let mut session = ChatSession::new(
        transcript,
        voice,
        responder,
        ChatConfig {
            reply_timeout: config.responder.reply_timeout,
            greeting: config.greeting.clone(),
            fallback_reply: config.fallback_reply.clone(),
        },
    );

    if resumed {
        println!("resumed session {session_id}");
        for message in session.transcript().visible() {
            println!("[{}] {}", message.role.as_str(), message.content);
        }
    } else {
        println!("session {session_id}");
        println!("solace: {}", config.greeting);
    }
    println!("(/voice toggles voice mode, /quit exits)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        match line.as_str() {
            "/quit" | "/exit" => break,
            "/voice" => {
                if !config.voice.enabled {
                    println!("voice is disabled in the configuration");
                    continue;
                }
                let mode = session.voice().toggle_voice_mode();
                match mode {
                    ConversationMode::Voice => println!("voice mode on (type to dictate)"),
                    ConversationMode::Text => println!("voice mode off"),
                }
                continue;
            }
            _ => {}
        }

        let reply = if session.voice().mode() == ConversationMode::Voice {
            // Typed input stands in for dictation
            if let Err(e) = session.voice().start_listening() {
                println!("voice unavailable: {e}");
                continue;
            }
            session
                .voice()
                .handle_capture_event(solace_voice::CaptureEvent::Interim(line));
            session.voice().stop_listening()?;
            session.submit_transcript().await
        } else {
            Some(session.send_message(line).await)
        };

        if let Some(reply) = reply {
            println!("solace: {}\n", reply.content);
        }
    }

    Ok(())
}

/// List stored chat sessions
fn list_sessions(pool: db::DbPool, user: &str) -> anyhow::Result<()> {
    let repo = SessionRepo::new(pool);
    let sessions = repo.list_for_user(user)?;

    if sessions.is_empty() {
        println!("no stored sessions");
        return Ok(());
    }

    for session in sessions {
        let count = repo.message_count(&session.id)?;
        println!(
            "{}  {}  {} messages  {}",
            session.id,
            session.updated_at.format("%Y-%m-%d %H:%M"),
            count,
            session.title.as_deref().unwrap_or("(untitled)"),
        );
    }
    Ok(())
}

/// Print a stored session's messages
fn show_history(pool: db::DbPool, session_id: &str) -> anyhow::Result<()> {
    let repo = SessionRepo::new(pool);
    for message in repo.messages(session_id)? {
        let marker = if message.is_voice { " (voice)" } else { "" };
        println!(
            "[{} {}{}] {}",
            message.created_at.format("%Y-%m-%d %H:%M"),
            message.role.as_str(),
            marker,
            message.content,
        );
    }
    Ok(())
}

fn journal(pool: db::DbPool, user: &str, cmd: JournalCommand) -> anyhow::Result<()> {
    let repo = JournalRepo::new(pool);
    match cmd {
        JournalCommand::Add { title, content } => {
            let entry = repo.add(user, &title, &content)?;
            println!("added journal entry {}", entry.id);
        }
        JournalCommand::List => {
            let entries = repo.list_for_user(user)?;
            if entries.is_empty() {
                println!("no journal entries");
            }
            for entry in entries {
                println!(
                    "{}  {}  {}",
                    entry.created_at.format("%Y-%m-%d"),
                    entry.title,
                    entry.content,
                );
            }
        }
    }
    Ok(())
}

fn mood(pool: db::DbPool, user: &str, cmd: MoodCommand) -> anyhow::Result<()> {
    let repo = MoodRepo::new(pool);
    match cmd {
        MoodCommand::Add {
            mood,
            anxiety,
            sleep,
            energy,
            notes,
            date,
        } => {
            let entry = repo.add(
                user,
                NewMoodEntry {
                    mood_score: mood,
                    anxiety_level: anxiety,
                    sleep_quality: sleep,
                    energy_level: energy,
                    notes,
                    recorded_on: date.unwrap_or_else(|| chrono::Utc::now().date_naive()),
                },
            )?;
            println!("recorded check-in for {}", entry.recorded_on);
        }
        MoodCommand::List { from, to } => {
            let entries = repo.list_for_user(user, from, to)?;
            if entries.is_empty() {
                println!("no check-ins");
                return Ok(());
            }
            for entry in &entries {
                println!(
                    "{}  mood {}  anxiety {}  sleep {}  energy {}  {}",
                    entry.recorded_on,
                    entry.mood_score,
                    entry.anxiety_level,
                    entry.sleep_quality,
                    entry.energy_level,
                    entry.notes.as_deref().unwrap_or(""),
                );
            }
            if let Some(avg) = repo.averages(user, from, to)? {
                println!(
                    "averages over {} check-ins: mood {:.1}  anxiety {:.1}  sleep {:.1}  energy {:.1}",
                    avg.entry_count,
                    avg.mood_score,
                    avg.anxiety_level,
                    avg.sleep_quality,
                    avg.energy_level,
                );
            }
        }
    }
    Ok(())
}
