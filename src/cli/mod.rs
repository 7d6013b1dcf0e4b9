use crate::infra::{
    LoadConfigError, Outbox, OutboxError, OutboxRecord, default_config_path, load_config_with_env,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TuiOptions {
    pub config_path: Option<PathBuf>,
    pub no_delay: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui(TuiOptions),
    Command(CliCommand),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    Outbox { json: bool },
    Config { config_path: Option<PathBuf> },
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    Outbox(#[from] OutboxError),

    #[error(transparent)]
    LoadConfig(#[from] LoadConfigError),

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut iter = args.iter().skip(1).peekable();
    let mut options = TuiOptions::default();
    while let Some(arg) = iter.peek() {
        match arg.as_str() {
            "--config" | "-c" => {
                let _ = iter.next();
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--config".to_string()))?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--no-delay" => {
                let _ = iter.next();
                options.no_delay = true;
            }
            "--" => {
                let _ = iter.next();
                break;
            }
            other if other.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(other.to_string()));
            }
            _ => break,
        }
    }

    let Some(subcommand) = iter.next() else {
        return Ok(CliInvocation::Tui(options));
    };

    match subcommand.as_str() {
        "outbox" => {
            let mut json = false;
            for arg in iter {
                match arg.as_str() {
                    "--json" => json = true,
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => return Err(CliParseError::UnexpectedArgument(arg.to_string())),
                }
            }
            Ok(CliInvocation::Command(CliCommand::Outbox { json }))
        }
        "config" => {
            let mut config_path = options.config_path;
            let mut args = iter;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--config" | "-c" => {
                        let value = args.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--config".to_string())
                        })?;
                        config_path = Some(PathBuf::from(value));
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => return Err(CliParseError::UnexpectedArgument(arg.to_string())),
                }
            }
            Ok(CliInvocation::Command(CliCommand::Config { config_path }))
        }
        other => Err(CliParseError::UnknownSubcommand(other.to_string())),
    }
}

pub fn run(command: CliCommand, state_dir: &Path) -> Result<(), CliRunError> {
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    run_with_output(command, state_dir, &mut out, &mut err)
}

pub fn run_with_output(
    command: CliCommand,
    state_dir: &Path,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliRunError> {
    match command {
        CliCommand::Outbox { json } => {
            let outbox = Outbox::in_state_dir(state_dir);
            let listing = outbox.load()?;
            if listing.skipped > 0 {
                writeln!(
                    err,
                    "warning: skipped {} malformed line(s) in {}",
                    listing.skipped,
                    outbox.path().display()
                )?;
            }

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&listing.records)?)?;
            } else {
                for record in &listing.records {
                    writeln!(out, "{}", outbox_row(record))?;
                }
            }
            Ok(())
        }
        CliCommand::Config { config_path } => {
            let path = config_path.unwrap_or_else(|| default_config_path(state_dir));
            let config = load_config_with_env(&path)?;
            writeln!(err, "config: {}", path.display())?;
            writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
            Ok(())
        }
    }
}

// saved_at<TAB>id<TAB>from_name<TAB>reply_to<TAB>message
fn outbox_row(record: &OutboxRecord) -> String {
    let message = record.message.replace(['\t', '\n', '\r'], " ");
    format!(
        "{}\t{}\t{}\t{}\t{}",
        record.saved_at, record.id, record.from_name, record.reply_to, message
    )
}

pub fn help_text(name: &str) -> String {
    format!(
        "{name}: Orbit-Ops contact terminal\n\nUSAGE:\n  {name} [--config PATH] [--no-delay]   Start the terminal UI\n  {name} outbox [--json]                List messages saved after relay mailbox errors\n  {name} config [--config PATH]         Print the resolved configuration\n  {name} --help | --version\n\nFLAGS:\n  --config PATH  Config file (default: ~/.orbit-terminal/config.json)\n  --no-delay     Skip the simulated typing delay\n\nENV:\n  ORBIT_TERMINAL_HOME       Override the state dir (default: ~/.orbit-terminal)\n  ORBIT_TERMINAL_LOG        Log filter (default: info), written to <state dir>/terminal.log\n  ORBIT_RELAY_ENDPOINT      Email relay send endpoint\n  ORBIT_RELAY_SERVICE_ID    Email relay service id\n  ORBIT_RELAY_TEMPLATE_ID   Email relay template id\n  ORBIT_RELAY_PUBLIC_KEY    Email relay public key\n"
    )
}
