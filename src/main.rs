mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppEvent, AppModel, Pacing, SessionSettings};
use crate::cli::{CliInvocation, TuiOptions};
use crate::domain::{DeliveryOutcome, EmailRequest};
use crate::infra::{
    EmailRelay, Outbox, UreqRelay, default_config_path, deliver, init_file_logging,
    load_config_with_env, resolve_state_dir,
};
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};
use thiserror::Error;

// Short enough for the typing animation to look smooth.
const FRAME_POLL: Duration = Duration::from_millis(16);

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] crate::app::AppError),

    #[error(transparent)]
    Cli(#[from] crate::cli::CliRunError),
}

#[derive(Clone, Debug)]
enum DeliverySignal {
    Finished(DeliveryOutcome),
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui(options) => Ok(run_tui(options)?),
        CliInvocation::Command(command) => {
            let state_dir = resolve_state_dir().map_err(app::AppError::from)?;
            crate::cli::run(command, &state_dir)?;
            Ok(())
        }
    }
}

fn print_help() {
    let mut out = io::stdout().lock();
    let _ = write!(out, "{}", crate::cli::help_text(env!("CARGO_PKG_NAME")));
}

fn run_tui(options: TuiOptions) -> Result<(), crate::app::AppError> {
    let state_dir = resolve_state_dir()?;
    let config_path: PathBuf = options
        .config_path
        .unwrap_or_else(|| default_config_path(&state_dir));
    let config = load_config_with_env(&config_path)?;

    let notice = match init_file_logging(&state_dir) {
        Ok(log_path) => {
            tracing::info!(
                log = %log_path.display(),
                config = %config_path.display(),
                "orbit terminal starting"
            );
            None
        }
        Err(error) => Some(format!("Logging disabled: {error}")),
    };

    let mut settings = SessionSettings::from_config(&config);
    if options.no_delay {
        settings.pacing = Pacing::instant();
    }
    let missing = settings.identity.missing_fields();
    if !missing.is_empty() {
        tracing::warn!(
            missing = %missing.join(", "),
            "email relay is not configured; submissions will fail"
        );
    }

    let relay: Arc<dyn EmailRelay> = Arc::new(UreqRelay::new(
        &config.relay.endpoint,
        config.relay.timeout(),
    ));
    let outbox = Outbox::in_state_dir(&state_dir);
    let mut model = AppModel::new(settings).with_notice(notice);

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut model, relay, outbox);
    restore_terminal(&mut terminal)?;
    tracing::info!("orbit terminal stopped");
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, app::AppError> {
    enable_raw_mode()?;
    undo_on_error(enter_alternate_screen(), || {
        let _ = disable_raw_mode();
    })
}

fn enter_alternate_screen() -> Result<Terminal<CrosstermBackend<Stdout>>, app::AppError> {
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let _ = stdout.execute(EnableBracketedPaste);
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// Runs `undo` when `result` failed, so a half-finished setup does not leave
/// the shell in raw mode.
fn undo_on_error<T, E>(result: Result<T, E>, undo: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        undo();
    }
    result
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<(), app::AppError> {
    disable_raw_mode()?;
    let _ = execute!(terminal.backend_mut(), DisableBracketedPaste);
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
    relay: Arc<dyn EmailRelay>,
    outbox: Outbox,
) -> Result<(), app::AppError> {
    let (delivery_tx, delivery_rx) = channel::<DeliverySignal>();

    loop {
        drain_deliveries(model, &delivery_rx);

        let (next, command) = app::update(model.clone(), AppEvent::Tick(Instant::now()));
        *model = next;
        if handle_command(command, &relay, &outbox, &delivery_tx) {
            return Ok(());
        }

        terminal.draw(|frame| ui::render(frame, model))?;

        if !event::poll(FRAME_POLL)? {
            continue;
        }
        let event = match event::read()? {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                AppEvent::Key(key)
            }
            Event::Paste(text) => AppEvent::Paste(text),
            _ => continue,
        };
        let (next, command) = app::update(model.clone(), event);
        *model = next;
        if handle_command(command, &relay, &outbox, &delivery_tx) {
            return Ok(());
        }
    }
}

fn drain_deliveries(model: &mut AppModel, rx: &Receiver<DeliverySignal>) {
    while let Ok(signal) = rx.try_recv() {
        match signal {
            DeliverySignal::Finished(outcome) => {
                let (next, _command) =
                    app::update(model.clone(), AppEvent::DeliveryFinished(outcome));
                *model = next;
            }
        }
    }
}

/// Returns `true` when the session should end.
fn handle_command(
    command: AppCommand,
    relay: &Arc<dyn EmailRelay>,
    outbox: &Outbox,
    tx: &Sender<DeliverySignal>,
) -> bool {
    match command {
        AppCommand::None => false,
        AppCommand::Quit => true,
        AppCommand::Submit(request) => {
            spawn_delivery(Arc::clone(relay), outbox.clone(), request, tx.clone());
            false
        }
    }
}

fn spawn_delivery(
    relay: Arc<dyn EmailRelay>,
    outbox: Outbox,
    request: EmailRequest,
    tx: Sender<DeliverySignal>,
) {
    std::thread::spawn(move || {
        let outcome = deliver(relay.as_ref(), Some(&outbox), &request);
        let _ = tx.send(DeliverySignal::Finished(outcome));
    });
}
