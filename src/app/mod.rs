mod line_editor;
mod script;

use crate::domain::{
    ContactDraft, DeliveryOutcome, EmailRequest, FormStep, RelayIdentity, TerminalCommand,
    Transcript, about_lines, complete_command, help_lines, services_lines, unrecognized_lines,
};
use crate::infra::TerminalConfig;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use thiserror::Error;

pub use line_editor::LineEditor;
pub use script::Pacing;
use script::{OutputScript, Step};

pub const WELCOME_LINE: &str = "Welcome to Orbit-Ops Terminal.";
pub const WELCOME_HINT: &str = "Type \"help\" for available commands or \"contact\" to get in touch.";
pub const CONFIRM_REMINDER: &str = "Type \"yes\" to send or \"no\" to restart.";
pub const SUBMITTING_LINE: &str = "Submitting your message...";
pub const SENT_LINE: &str = "✓ Message sent successfully! We'll get back to you soon.";
pub const MAILBOX_ERROR_LINES: [&str; 2] = [
    "⚠ There appears to be an issue with our email service.",
    "Your message has been saved. We'll process it manually.",
];
pub const AFTER_SUBMIT_HINT: &str = "Type \"clear\" to reset or \"help\" for more commands.";
pub const INPUT_PLACEHOLDER: &str = "Type a command...";

const SCROLL_PAGE: usize = 5;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ResolveStateDir(#[from] crate::infra::ResolveStateDirError),

    #[error(transparent)]
    LoadConfig(#[from] crate::infra::LoadConfigError),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Command,
    Wizard(FormStep),
    Confirm,
}

/// Everything the session needs from configuration.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub identity: RelayIdentity,
    pub to_name: String,
    pub fallback_email: String,
    pub pacing: Pacing,
}

impl SessionSettings {
    pub fn from_config(config: &TerminalConfig) -> Self {
        Self {
            identity: config.relay.identity(),
            to_name: config.contact.to_name.clone(),
            fallback_email: config.contact.fallback_email.clone(),
            pacing: config.pacing.into(),
        }
    }
}

/// The terminal session: transcript, input mode, contact draft, and the
/// output that is still being "typed".
#[derive(Clone, Debug)]
pub struct AppModel {
    pub transcript: Transcript,
    pub mode: Mode,
    pub draft: ContactDraft,
    pub input: LineEditor,
    pub submitting: bool,
    /// Transcript lines scrolled up from the bottom; 0 follows new output.
    pub scroll_back: usize,
    pub notice: Option<String>,
    script: OutputScript,
    settings: SessionSettings,
}

impl AppModel {
    /// Starts a session; the welcome lines arrive after the welcome delay.
    pub fn new(settings: SessionSettings) -> Self {
        let mut script = OutputScript::default();
        script.push(Step::Pause(settings.pacing.welcome));
        script.say(WELCOME_LINE);
        script.say(WELCOME_HINT);

        Self {
            transcript: Transcript::new(),
            mode: Mode::Command,
            draft: ContactDraft::new(&settings.to_name),
            input: LineEditor::new(),
            submitting: false,
            scroll_back: 0,
            notice: None,
            script,
            settings,
        }
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.submitting || !self.script.is_idle()
    }

    pub fn status(&self) -> &'static str {
        if self.submitting {
            "Sending..."
        } else if !self.script.is_idle() {
            "Processing..."
        } else {
            "Ready"
        }
    }

    pub fn input_prompt(&self) -> &'static str {
        match self.mode {
            Mode::Command => ">",
            Mode::Wizard(_) | Mode::Confirm => "?",
        }
    }

    /// Hint for the next expected input; hidden while output is pending.
    pub fn pending_prompt(&self) -> Option<&'static str> {
        if self.is_busy() {
            return None;
        }
        match self.mode {
            Mode::Command => None,
            Mode::Wizard(step) => Some(step.prompt()),
            Mode::Confirm => Some(CONFIRM_REMINDER),
        }
    }

    /// Processes one submitted line. Returns `false` when the line was
    /// ignored (blank, or the session is busy).
    pub fn submit_line(&mut self, text: &str) -> bool {
        if text.trim().is_empty() || self.is_busy() {
            return false;
        }

        self.transcript.push_user(text);
        self.scroll_back = 0;
        self.script.push(Step::Pause(self.settings.pacing.processing));

        match self.mode {
            Mode::Command => self.dispatch_command(text),
            Mode::Wizard(step) => self.accept_field(step, text),
            Mode::Confirm => self.confirm(text),
        }
        true
    }

    /// Applies every scheduled step that is due; stops at a submission so the
    /// caller can start the relay call.
    pub fn tick(&mut self, now: Instant) -> AppCommand {
        let pacing = self.settings.pacing;
        while let Some(step) = self.script.poll(now, &pacing) {
            match step {
                Step::Pause(_) => {}
                Step::Say(text) => {
                    self.transcript.push_system(&text);
                    self.scroll_back = 0;
                }
                Step::Clear => {
                    self.transcript.clear();
                    self.scroll_back = 0;
                }
                Step::Submit(request) => return AppCommand::Submit(request),
            }
        }
        AppCommand::None
    }

    pub fn finish_delivery(&mut self, outcome: DeliveryOutcome) {
        if !self.submitting {
            return;
        }

        match outcome {
            DeliveryOutcome::Sent => self.script.say(SENT_LINE),
            DeliveryOutcome::MailboxUnavailable => {
                for line in MAILBOX_ERROR_LINES {
                    self.script.say(line);
                }
            }
            DeliveryOutcome::Failed { .. } => self.script.say(self.failure_line()),
        }

        self.submitting = false;
        self.script.say(AFTER_SUBMIT_HINT);
        self.draft.reset();
        self.mode = Mode::Command;
    }

    pub fn failure_line(&self) -> String {
        format!(
            "⚠ Failed to send message. Please try again later or contact us directly at {}",
            self.settings.fallback_email
        )
    }

    fn dispatch_command(&mut self, text: &str) {
        match TerminalCommand::parse(text) {
            Some(TerminalCommand::Help) => self.say_all(help_lines()),
            Some(TerminalCommand::Contact) => {
                self.script.say("Starting contact form...");
                self.draft.reset();
                self.mode = Mode::Wizard(FormStep::FIRST);
            }
            Some(TerminalCommand::Clear) => self.script.push(Step::Clear),
            Some(TerminalCommand::About) => self.say_all(about_lines()),
            Some(TerminalCommand::Services) => self.say_all(services_lines()),
            None => {
                for line in unrecognized_lines(text) {
                    self.script.say(line);
                }
            }
        }
    }

    fn accept_field(&mut self, step: FormStep, text: &str) {
        if let Err(error) = step.validate(text) {
            self.script.say(format!("⚠ {error}"));
            self.script.say(step.prompt());
            return;
        }

        self.draft.set(step, text);
        match step.next() {
            Some(next) => self.mode = Mode::Wizard(next),
            None => {
                self.mode = Mode::Confirm;
                for line in self.draft.summary_lines() {
                    self.script.say(line);
                }
            }
        }
    }

    fn confirm(&mut self, text: &str) {
        match text.trim().to_lowercase().as_str() {
            "yes" => {
                self.submitting = true;
                self.script.say(SUBMITTING_LINE);
                let request = EmailRequest::from_draft(&self.settings.identity, &self.draft);
                self.script.push(Step::Submit(request));
            }
            "no" => {
                self.script
                    .say("Form cancelled. Type \"contact\" to start again.");
                self.draft.reset();
                self.mode = Mode::Command;
            }
            _ => self
                .script
                .say("Please type \"yes\" to send or \"no\" to restart."),
        }
    }

    fn say_all(&mut self, lines: &[&str]) {
        for line in lines {
            self.script.say(*line);
        }
    }
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Tick(Instant),
    DeliveryFinished(DeliveryOutcome),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    Submit(EmailRequest),
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Key(key) => update_on_key(model, key),
        AppEvent::Paste(text) => update_on_paste(model, text),
        AppEvent::Tick(now) => {
            let mut model = model;
            let command = model.tick(now);
            (model, command)
        }
        AppEvent::DeliveryFinished(outcome) => {
            let mut model = model;
            model.finish_delivery(outcome);
            (model, AppCommand::None)
        }
    }
}

fn update_on_key(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    model.notice = None;

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
        return (model, AppCommand::Quit);
    }

    match key.code {
        KeyCode::Esc => return (model, AppCommand::Quit),
        KeyCode::PageUp => {
            model.scroll_back = model.scroll_back.saturating_add(SCROLL_PAGE);
            return (model, AppCommand::None);
        }
        KeyCode::PageDown => {
            model.scroll_back = model.scroll_back.saturating_sub(SCROLL_PAGE);
            return (model, AppCommand::None);
        }
        _ => {}
    }

    // The prompt is disabled while output is pending or a message is in flight.
    if model.is_busy() {
        return (model, AppCommand::None);
    }

    match key.code {
        KeyCode::Enter => {
            let line = model.input.text.clone();
            if model.submit_line(&line) {
                model.input.clear();
            }
        }
        KeyCode::Tab => {
            if model.mode == Mode::Command {
                if let Some(name) = complete_command(&model.input.text) {
                    model.input = LineEditor::from_text(name);
                }
            }
        }
        KeyCode::Backspace => model.input.backspace(),
        KeyCode::Delete => model.input.delete_forward(),
        KeyCode::Left => model.input.move_left(),
        KeyCode::Right => model.input.move_right(),
        KeyCode::Home => model.input.move_home(),
        KeyCode::End => model.input.move_end(),
        KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            model.input.insert_char(ch);
        }
        _ => {}
    }
    (model, AppCommand::None)
}

fn update_on_paste(model: AppModel, text: String) -> (AppModel, AppCommand) {
    let mut model = model;
    if !model.is_busy() {
        model.input.insert_str(&text);
    }
    (model, AppCommand::None)
}
