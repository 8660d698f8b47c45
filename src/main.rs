use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tracing_subscriber::EnvFilter;

use titlegen::cli::{self, CliAction, GenerateOptions};
use titlegen::commands::{self, EventSink, SharedState, EVENT_TITLES};
use titlegen::core::catalog::CATALOG;
use titlegen::core::clipboard;
use titlegen::core::{normalize, storage};
use titlegen::state::AppState;

// Generation runs on a timer thread; allow this much beyond the configured delay.
const RESULT_GRACE_MS: u64 = 5_000;

struct ChannelSink {
    tx: Mutex<Sender<(String, Value)>>,
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &str, payload: Value) {
        log::debug!("event {event}: {payload}");
        if let Ok(tx) = self.tx.lock() {
            let _ = tx.send((event.to_string(), payload));
        }
    }
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let action = match cli::parse_cli_action(&args) {
        Ok(action) => action,
        Err(err) => {
            eprintln!("{err}\n\n{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };

    let result = match action {
        CliAction::Help => {
            println!("{}", cli::USAGE);
            Ok(())
        }
        CliAction::Version => {
            println!("titlegen {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliAction::ListTemplates => {
            for (index, template) in CATALOG.iter().enumerate() {
                println!("{:>2}  {:<18} {}", index + 1, template.id, template.pattern);
            }
            Ok(())
        }
        CliAction::InitConfig => {
            let path = storage::default_settings_path();
            storage::init_config(&path).map(|_| println!("{}", path.display()))
        }
        CliAction::Generate(options) => run(options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // The fmt subscriber also installs the `log` bridge, so library `log::` calls show up here.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(options: GenerateOptions) -> Result<(), String> {
    if normalize::is_blank(&options.topic) {
        log::debug!("blank topic, nothing to generate");
        return Ok(());
    }

    let mut settings = storage::load_settings();
    if let Some(count) = options.count {
        settings.generation.title_count = count;
    }
    if options.seed.is_some() {
        settings.generation.seed = options.seed;
    }
    if options.no_delay {
        settings.generation.delay_ms = 0;
    }
    let timeout = Duration::from_millis(settings.generation.delay_ms + RESULT_GRACE_MS);

    let state: SharedState = Arc::new(Mutex::new(AppState::new(settings)?));
    let (tx, rx) = mpsc::channel();
    let events: Arc<dyn EventSink> = Arc::new(ChannelSink { tx: Mutex::new(tx) });

    commands::set_topic(&state, &options.topic)?;
    if commands::generate_titles(&state, events.clone())?.is_none() {
        return Ok(());
    }
    wait_for_event(&rx, EVENT_TITLES, timeout)?;

    let copied = match options.copy {
        Some(position) => Some(commands::copy_title(
            &state,
            position - 1,
            clipboard::system_clipboard().as_ref(),
            events,
        )?),
        None => None,
    };

    let snapshot = commands::snapshot(&state)?;
    commands::teardown(&state)?;

    if options.json {
        let encoded = serde_json::to_string_pretty(&snapshot).map_err(|err| err.to_string())?;
        println!("{encoded}");
    } else {
        for (index, title) in snapshot.titles.iter().enumerate() {
            println!("{}. {}", index + 1, title.text);
        }
        if let Some(text) = copied {
            eprintln!("Copied: {text}");
            if clipboard::copy_needs_running_process() {
                eprintln!(
                    "note: on X11 the copy only survives exit if a clipboard manager is running"
                );
            }
        }
    }

    Ok(())
}

fn wait_for_event(
    rx: &Receiver<(String, Value)>,
    event: &str,
    timeout: Duration,
) -> Result<Value, String> {
    loop {
        let (name, payload) = rx
            .recv_timeout(timeout)
            .map_err(|err| format!("waiting for {event}: {err}"))?;
        if name == event {
            return Ok(payload);
        }
    }
}
