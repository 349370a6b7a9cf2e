//! Reminders CLI - Command-line interface for Reminder Flux
//!
//! Commands:
//! - run: Read the roster, send the notification and record metrics
//! - preview: Show the payload a run would send, without side effects
//! - validate: Check that the roster parses
//! - doctor: Diagnose configuration, roster, webhook and metrics history

use chrono::{NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use reminder_flux::config::WEBHOOK_URL_ENV;
use reminder_flux::delivery::{DeliverySink, DryRunSink};
use reminder_flux::types::ClassifiedEvent;
use reminder_flux::{
    RelayConfig, RelayError, ReminderPipeline, RunPlan, PRODUCER_NAME, RELAY_VERSION,
};

/// Reminders - classify an event roster and relay it to a webhook
#[derive(Parser)]
#[command(name = "reminders")]
#[command(version = RELAY_VERSION)]
#[command(about = "Send tomorrow's classes and upcoming reminders to a webhook", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Append log lines to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Roster overrides shared by the commands that read it
#[derive(Args)]
struct SourceArgs {
    /// Roster file path
    #[arg(long)]
    source: Option<PathBuf>,

    /// Roster text encoding (e.g. utf-8, big5)
    #[arg(long)]
    encoding: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the roster, send the notification and record metrics
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Metrics history file
        #[arg(long)]
        metrics: Option<PathBuf>,

        /// Webhook URL
        #[arg(long, env = WEBHOOK_URL_ENV, hide_env_values = true)]
        webhook_url: Option<String>,

        /// Webhook request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print the payload instead of posting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the payload a run would send, without delivering or recording
    Preview {
        #[command(flatten)]
        source: SourceArgs,

        /// Reference date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the roster parses
    Validate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration, roster, webhook and metrics history
    Doctor {
        /// Webhook URL
        #[arg(long, env = WEBHOOK_URL_ENV, hide_env_values = true)]
        webhook_url: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("failed to open log file: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:?}");
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> io::Result<()> {
    let default_filter = if verbose {
        "reminder_flux=debug,reminders=debug"
    } else {
        "reminder_flux=info,reminders=info"
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => {
            builder
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), ReminderCliError> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            source,
            metrics,
            webhook_url,
            timeout_secs,
            dry_run,
        } => {
            source.apply(&mut config);
            if let Some(path) = metrics {
                config.metrics.path = path;
            }
            if let Some(url) = webhook_url {
                config.delivery.webhook_url = Some(url);
            }
            if let Some(secs) = timeout_secs {
                config.delivery.timeout_secs = secs;
            }
            cmd_run(&config, dry_run)
        }

        Commands::Preview { source, date, json } => {
            source.apply(&mut config);
            cmd_preview(&config, date, json)
        }

        Commands::Validate { source, json } => {
            source.apply(&mut config);
            cmd_validate(&config, json)
        }

        Commands::Doctor { webhook_url, json } => {
            if let Some(url) = webhook_url {
                config.delivery.webhook_url = Some(url);
            }
            cmd_doctor(&config, cli.config.as_deref(), json)
        }
    }
}

impl SourceArgs {
    fn apply(self, config: &mut RelayConfig) {
        if let Some(path) = self.source {
            config.source.path = path;
        }
        if let Some(encoding) = self.encoding {
            config.source.encoding = encoding;
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RelayConfig, RelayError> {
    match path {
        Some(path) => RelayConfig::from_file(path),
        None => Ok(RelayConfig::default()),
    }
}

fn cmd_run(config: &RelayConfig, dry_run: bool) -> Result<(), ReminderCliError> {
    let sink: Box<dyn DeliverySink> = if dry_run {
        Box::new(DryRunSink::stdout())
    } else {
        Box::new(config.webhook_client()?)
    };
    let pipeline = ReminderPipeline::from_config(config, sink)?;

    let report = pipeline.run()?;
    tracing::info!(
        run_id = %report.run_id,
        delivered = report.outcome.is_ok(),
        total_reminders = report.record.total_reminders_count,
        "run complete"
    );
    Ok(())
}

fn cmd_preview(
    config: &RelayConfig,
    date: Option<NaiveDate>,
    json: bool,
) -> Result<(), ReminderCliError> {
    let pipeline = ReminderPipeline::from_config(config, DryRunSink::stdout())?;

    let plan = match date {
        Some(date) => {
            let noon = date
                .and_hms_opt(12, 0, 0)
                .ok_or_else(|| ReminderCliError::Usage(format!("invalid date {date}")))?;
            pipeline.plan_at(&Utc.from_utc_datetime(&noon))?
        }
        None => pipeline.plan_at(&chrono::Local::now())?,
    };

    if json {
        let report = PreviewReport::from(&plan);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_preview(&plan);
    }
    Ok(())
}

fn print_preview(plan: &RunPlan) {
    println!("Reminder Preview ({})", plan.reference_date);
    println!("==========================");
    println!("\nClasses tomorrow:\n{}", plan.payload.classes_tomorrow);
    println!("\nTomorrow:\n{}", plan.payload.reminders_tomorrow);
    println!("\nWithin window:\n{}", plan.payload.reminders_window);
    println!("\nNext marked weekday:\n{}", plan.payload.reminders_next_weekday);

    println!("\nEvents:");
    for classified in &plan.classified {
        println!(
            "  - {} ({}): {}",
            classified.event.name,
            classified.event.scheduled_at.format("%Y-%m-%d %H:%M"),
            bucket_list(classified)
        );
    }
}

fn bucket_list(classified: &ClassifiedEvent) -> String {
    let buckets: Vec<&str> = classified.buckets.iter().map(|b| b.as_str()).collect();
    if buckets.is_empty() {
        "-".to_string()
    } else {
        buckets.join(", ")
    }
}

fn cmd_validate(config: &RelayConfig, json: bool) -> Result<(), ReminderCliError> {
    let events = config.source.read_events()?;

    let report = ValidationReport {
        source: config.source.path.display().to_string(),
        encoding: config.source.encoding.clone(),
        total_events: events.len(),
        events: events
            .iter()
            .enumerate()
            .map(|(index, event)| EventSummary {
                row: index + 1,
                name: event.name.clone(),
                scheduled_at: event.scheduled_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                weekday_label: event.weekday_label.clone(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Source:       {}", report.source);
        println!("Encoding:     {}", report.encoding);
        println!("Total events: {}", report.total_events);
        for event in &report.events {
            println!("  {:>3}. {} @ {} {}", event.row, event.name, event.scheduled_at, event.weekday_label);
        }
    }
    Ok(())
}

fn cmd_doctor(
    config: &RelayConfig,
    config_path: Option<&Path>,
    json: bool,
) -> Result<(), ReminderCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck::ok(
        "version",
        format!("{PRODUCER_NAME} {RELAY_VERSION}"),
    ));

    checks.push(match config.validate() {
        Ok(()) => DoctorCheck::ok(
            "config",
            match config_path {
                Some(path) => format!("Loaded {}", path.display()),
                None => "Using built-in defaults".to_string(),
            },
        ),
        Err(e) => DoctorCheck::error("config", e.to_string()),
    });

    checks.push(match config.source.read_events() {
        Ok(events) => DoctorCheck::ok(
            "source",
            format!(
                "{} parsed ({} events)",
                config.source.path.display(),
                events.len()
            ),
        ),
        Err(e) => DoctorCheck::error("source", e.to_string()),
    });

    checks.push(match config.webhook_client() {
        Ok(client) => DoctorCheck::ok(
            "webhook",
            format!("Webhook host {}", client.url().host_str().unwrap_or("?")),
        ),
        Err(e) => DoctorCheck::warning("webhook", e.to_string()),
    });

    let store = config.metrics_store();
    checks.push(if !store.path().exists() {
        DoctorCheck::warning(
            "metrics",
            format!("{} does not exist yet", store.path().display()),
        )
    } else {
        match store.len() {
            Ok(records) => DoctorCheck::ok(
                "metrics",
                format!("{} holds {} records", store.path().display(), records),
            ),
            Err(e) => DoctorCheck::error("metrics", e.to_string()),
        }
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: RELAY_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Reminders Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ReminderCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum ReminderCliError {
    Relay(RelayError),
    Io(io::Error),
    Json(serde_json::Error),
    Usage(String),
    DoctorFailed,
}

impl std::fmt::Display for ReminderCliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderCliError::Relay(e) => write!(f, "{e}"),
            ReminderCliError::Io(e) => write!(f, "{e}"),
            ReminderCliError::Json(e) => write!(f, "{e}"),
            ReminderCliError::Usage(msg) => write!(f, "{msg}"),
            ReminderCliError::DoctorFailed => write!(f, "One or more health checks failed"),
        }
    }
}

impl From<RelayError> for ReminderCliError {
    fn from(e: RelayError) -> Self {
        ReminderCliError::Relay(e)
    }
}

impl From<io::Error> for ReminderCliError {
    fn from(e: io::Error) -> Self {
        ReminderCliError::Io(e)
    }
}

impl From<serde_json::Error> for ReminderCliError {
    fn from(e: serde_json::Error) -> Self {
        ReminderCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ReminderCliError> for CliError {
    fn from(e: ReminderCliError) -> Self {
        let message = e.to_string();
        match e {
            ReminderCliError::Relay(relay) => {
                let hint = match &relay {
                    RelayError::Parse(_) => {
                        "Roster needs 'Event name', 'Event date and time' (MM/DD/YYYY HH:MM:SS) and 'Weekday' columns; run 'reminders validate'"
                    }
                    RelayError::Config(_) => "Check the config file and flags; run 'reminders doctor'",
                    RelayError::CorruptMetricsStore { .. } => {
                        "Repair or move the metrics file; it was left untouched"
                    }
                    RelayError::Io(_) => "Check file paths and permissions",
                    RelayError::Json(_) => "Check JSON syntax",
                };
                CliError {
                    code: relay.code().to_string(),
                    message,
                    hint: Some(hint.to_string()),
                }
            }
            ReminderCliError::Io(_) => CliError {
                code: "IO_ERROR".to_string(),
                message,
                hint: Some("Check file paths and permissions".to_string()),
            },
            ReminderCliError::Json(_) => CliError {
                code: "JSON_ERROR".to_string(),
                message,
                hint: None,
            },
            ReminderCliError::Usage(_) => CliError {
                code: "USAGE_ERROR".to_string(),
                message,
                hint: Some("Run 'reminders --help'".to_string()),
            },
            ReminderCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message,
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct PreviewReport<'a> {
    reference_date: String,
    payload: &'a reminder_flux::NotificationPayload,
    events: Vec<PreviewEvent<'a>>,
}

#[derive(serde::Serialize)]
struct PreviewEvent<'a> {
    name: &'a str,
    scheduled_at: String,
    buckets: Vec<&'static str>,
}

impl<'a> From<&'a RunPlan> for PreviewReport<'a> {
    fn from(plan: &'a RunPlan) -> Self {
        Self {
            reference_date: plan.reference_date.to_string(),
            payload: &plan.payload,
            events: plan
                .classified
                .iter()
                .map(|c| PreviewEvent {
                    name: &c.event.name,
                    scheduled_at: c.event.scheduled_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    buckets: c.buckets.iter().map(|b| b.as_str()).collect(),
                })
                .collect(),
        }
    }
}

#[derive(serde::Serialize)]
struct ValidationReport {
    source: String,
    encoding: String,
    total_events: usize,
    events: Vec<EventSummary>,
}

#[derive(serde::Serialize)]
struct EventSummary {
    row: usize,
    name: String,
    scheduled_at: String,
    weekday_label: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

impl DoctorCheck {
    fn ok(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message,
        }
    }

    fn warning(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message,
        }
    }

    fn error(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message,
        }
    }
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
