use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Text};
use tokio::sync::Mutex;
use tracing::info;

use scheduleAssistant::config::Settings;
use scheduleAssistant::error::ScheduleError;
use scheduleAssistant::events::worker::{
    ConsoleSink, NotificationSink, drain_notifications, run_notification_worker,
};
use scheduleAssistant::export::ics::{IcsExporter, ScheduleExporter};
use scheduleAssistant::models::schedule_event::{normalize_clock, ScheduleEvent, Weekday};
use scheduleAssistant::service::chat_session::{ChatError, ChatSession, MessageKind};
use scheduleAssistant::service::openai_service::{OpenAIService, SuggestionError};
use scheduleAssistant::service::schedule_store::ScheduleStore;
use scheduleAssistant::service::suggestion_parser::lookup_day_token;
use scheduleAssistant::storage::FileStorage;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "scheduleAssistant", about = "Weekly schedule with an AI planning assistant")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the week, or a single day.
    List {
        #[arg(long)]
        day: Option<String>,
    },
    Add {
        title: String,
        day: String,
        start: String,
        end: String,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        day: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    Remove {
        id: String,
    },
    /// Import schedule lines from a file, or stdin when no file is given.
    Import {
        file: Option<PathBuf>,
    },
    /// Ask the assistant for a schedule and optionally add it.
    Suggest {
        text: Option<String>,
        #[arg(long)]
        yes: bool,
    },
    Chat {},
    Export {
        #[arg(long)]
        week_start: Option<NaiveDate>,
        #[arg(long)]
        output: PathBuf,
    },
}

pub async fn cli(settings: Settings) -> CliResult {
    // Fine to exit here on bad arguments
    let cli = Cli::parse();
    let mut store = ScheduleStore::open(Box::new(FileStorage::new(&settings.data_location)));
    let mut notifications = store.subscribe();
    let sink = ConsoleSink;

    match cli.command {
        Commands::List { day } => {
            let day = day.as_deref().map(parse_day).transpose()?;
            print_week(&store, day);
        }
        Commands::Add { title, day, start, end } => {
            let event = ScheduleEvent::new(&title, parse_day(&day)?, &start, &end)?;
            println!("{}", event.id);
            store.add_event(event)?;
        }
        Commands::Update { id, title, day, start, end } => {
            let Some(mut event) = store.get(&id).cloned() else {
                println!("No event with id {}", id);
                return Ok(());
            };
            if let Some(title) = title {
                event.title = title.trim().to_string();
            }
            if let Some(day) = day {
                event.day = parse_day(&day)?;
            }
            if let Some(start) = start {
                event.start_time = normalize_clock(&start)?;
            }
            if let Some(end) = end {
                event.end_time = normalize_clock(&end)?;
            }
            event.validate()?;
            store.update_event(event);
        }
        Commands::Remove { id } => {
            if store.remove_event(&id).is_none() {
                println!("No event with id {}", id);
            }
        }
        Commands::Import { file } => {
            let text = match file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            report_import(store.add_events_from_suggestion(&text))?;
        }
        Commands::Suggest { text, yes } => {
            let result = suggest_once(&settings, Arc::new(Mutex::new(store)), text, yes).await;
            drain_notifications(&mut notifications, &sink);
            return result;
        }
        Commands::Chat {} => {
            drop(notifications);
            return chat(&settings, store).await;
        }
        Commands::Export { week_start, output } => {
            let week_start = week_start.unwrap_or_else(|| Local::now().date_naive());
            let ics = IcsExporter::new().export(store.events(), week_start);
            fs::write(&output, ics)?;
            info!(path = %output.display(), events = store.len(), "schedule exported");
            println!("Exported {} events to {}", store.len(), output.display());
        }
    }

    drain_notifications(&mut notifications, &sink);
    Ok(())
}

fn parse_day(value: &str) -> Result<Weekday, Box<dyn Error>> {
    if let Some(day) = Weekday::from_name(value) {
        return Ok(day);
    }
    match lookup_day_token(value.trim()) {
        Some([day]) => Ok(*day),
        _ => Err(format!("'{}' is not a single weekday", value).into()),
    }
}

fn print_week(store: &ScheduleStore, only: Option<Weekday>) {
    if store.is_empty() {
        println!("No events scheduled.");
        return;
    }
    for (day, events) in store.week() {
        if only.is_some_and(|d| d != day) || (only.is_none() && events.is_empty()) {
            continue;
        }
        println!("{}", capitalize(day.as_str()));
        for event in events {
            println!(
                "  {} - {}  {}  [{}]",
                event.start_time, event.end_time, event.title, event.id
            );
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn report_import(result: Result<usize, ScheduleError>) -> CliResult {
    match result {
        Ok(count) => {
            info!(count, "events imported");
            Ok(())
        }
        // Already reported through the store notification.
        Err(ScheduleError::ParseYieldedNothing) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn open_service(settings: &Settings) -> Result<OpenAIService, SuggestionError> {
    let key = settings.openai_api_key.clone().ok_or(SuggestionError::MissingApiKey)?;
    Ok(OpenAIService::new(key)?
        .with_model(settings.openai_model.clone())
        .with_api_url(settings.openai_api_url.clone()))
}

async fn suggest_once(
    settings: &Settings,
    store: Arc<Mutex<ScheduleStore>>,
    text: Option<String>,
    yes: bool,
) -> CliResult {
    let preferences = match text {
        Some(text) => text,
        None => specify_prompt()?,
    };
    let session = ChatSession::new(Arc::new(open_service(settings)?));
    let reply = session.submit(&preferences).await?;
    println!("{}", reply.content);
    if reply.kind != MessageKind::Suggestion {
        return Ok(());
    }

    let add = yes || Confirm::new("Add to calendar?").with_default(true).prompt()?;
    if add {
        match session.add_to_calendar(&reply.id, &store).await {
            Ok(_) | Err(ChatError::Import(ScheduleError::ParseYieldedNothing)) => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

async fn chat(settings: &Settings, mut store: ScheduleStore) -> CliResult {
    let sink: Arc<dyn NotificationSink> = Arc::new(ConsoleSink);
    let worker = tokio::spawn(run_notification_worker(store.subscribe(), sink));
    let store = Arc::new(Mutex::new(store));
    let session = ChatSession::new(Arc::new(open_service(settings)?));

    for message in session.messages().await {
        println!("{}", message.content);
    }
    println!("Commands: /add adds the latest suggestion, /list shows the week, /quit exits.");

    loop {
        let Ok(line) = Text::new("You:").prompt() else {
            break;
        };
        match line.trim() {
            "/quit" => break,
            "/list" => print_week(&*store.lock().await, None),
            "/add" => match session.latest_suggestion().await {
                Some(message) => match session.add_to_calendar(&message.id, &store).await {
                    Ok(_) | Err(ChatError::Import(ScheduleError::ParseYieldedNothing)) => {}
                    Err(err) => println!("Failed to add suggestion: {}", err),
                },
                None => println!("There is no suggestion to add yet."),
            },
            input => match session.submit(input).await {
                Ok(reply) => println!("{}", reply.content),
                Err(ChatError::EmptyInput) => {}
                Err(err) => println!("{}", err),
            },
        }
        // Let the worker print anything the last command produced.
        tokio::task::yield_now().await;
    }

    worker.abort();
    Ok(())
}

fn specify_prompt() -> Result<String, Box<dyn Error>> {
    Ok(Text::new("Describe your perfect schedule...").prompt()?)
}
