use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser};
use hron::{Schedule, ScheduleError};
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const MAX_OCCURRENCES: usize = 1000;

#[derive(Parser)]
#[command(name = "hron", about = "Human-readable cron", version)]
struct Cli {
    /// Schedule expression (e.g. "every weekday at 9:00")
    #[arg(required_unless_present_any = ["from_cron", "explain"])]
    expression: Option<String>,

    /// Show the next N occurrences after --now
    #[arg(
        short = 'n',
        long,
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = "1",
        group = "query"
    )]
    next: Option<usize>,

    /// Show the last occurrence before --now
    #[arg(long, group = "query")]
    previous: bool,

    /// Show every occurrence in (FROM, TO]
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"], group = "query")]
    between: Option<Vec<String>>,

    /// Check whether the schedule fires at exactly DATETIME
    #[arg(long, value_name = "DATETIME", group = "query")]
    matches: Option<String>,

    /// Convert the expression to a 5-field cron string
    #[arg(long, group = "query")]
    to_cron: bool,

    /// Validate the expression without computing anything
    #[arg(long, group = "query")]
    check: bool,

    /// Convert a cron expression to hron
    #[arg(long, value_name = "CRON", conflicts_with = "expression")]
    from_cron: Option<String>,

    /// Explain a cron expression in hron terms
    #[arg(long, value_name = "CRON", conflicts_with_all = ["expression", "from_cron"])]
    explain: Option<String>,

    /// JSON output: the parsed AST, or a list of instants
    #[arg(long)]
    json: bool,

    /// Reference instant (RFC 9557, RFC 3339 or a civil datetime)
    #[arg(long, env = "HRON_NOW", value_name = "DATETIME")]
    now: Option<String>,

    /// Zone for datetimes given without one; defaults to the schedule's zone
    #[arg(long, env = "HRON_TZ", value_name = "ZONE")]
    tz: Option<String>,

    /// More logging on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<ScheduleError>() {
                Some(schedule_err) => eprintln!("{}", schedule_err.display_rich()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("hron=debug"),
        _ => EnvFilter::new("hron=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    if let Some(cron) = &cli.explain {
        println!("{}", hron::cron::explain_cron(cron)?);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(cron) = &cli.from_cron {
        let schedule = Schedule::from_cron(cron)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(schedule.data())?);
        } else {
            println!("{schedule}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(expression) = cli.expression.as_deref() else {
        bail!("no expression provided");
    };
    let schedule = Schedule::parse(expression)?;
    debug!(canonical = %schedule, "parsed expression");

    if cli.check {
        println!("\u{2713} valid");
        return Ok(ExitCode::SUCCESS);
    }

    if cli.to_cron {
        println!("{}", schedule.to_cron()?);
        return Ok(ExitCode::SUCCESS);
    }

    let zone = reference_zone(cli, &schedule)?;

    if let Some(text) = &cli.matches {
        let instant = parse_instant(text, &zone)?;
        let fires = schedule.matches(&instant);
        println!("{fires}");
        return Ok(if fires {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let results: Vec<Zoned> = if let Some(bounds) = &cli.between {
        let [from, to] = bounds.as_slice() else {
            bail!("--between takes exactly two datetimes");
        };
        let (from, to) = (parse_instant(from, &zone)?, parse_instant(to, &zone)?);
        if to < from {
            bail!("--between end {to} is before start {from}");
        }
        schedule.between(&from, &to).collect()
    } else if cli.previous {
        let now = reference_now(cli, &zone)?;
        schedule.previous_from(&now).into_iter().collect()
    } else if let Some(mut n) = cli.next {
        if n > MAX_OCCURRENCES {
            warn!("capped at {MAX_OCCURRENCES} occurrences");
            n = MAX_OCCURRENCES;
        }
        let now = reference_now(cli, &zone)?;
        schedule.next_n_from(&now, n)
    } else {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(schedule.data())?);
        } else {
            println!("{schedule}");
        }
        return Ok(ExitCode::SUCCESS);
    };

    if results.is_empty() {
        eprintln!("no occurrences");
        return Ok(ExitCode::SUCCESS);
    }

    if cli.json {
        let iso: Vec<String> = results.iter().map(Zoned::to_string).collect();
        println!("{}", serde_json::to_string(&iso)?);
    } else {
        for instant in &results {
            println!("{instant}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// `--tz`, then the schedule's own zone, then UTC.
fn reference_zone(cli: &Cli, schedule: &Schedule) -> anyhow::Result<TimeZone> {
    match cli.tz.as_deref().or(schedule.timezone()) {
        Some(name) => TimeZone::get(name).with_context(|| format!("unknown timezone '{name}'")),
        None => Ok(TimeZone::UTC),
    }
}

fn reference_now(cli: &Cli, zone: &TimeZone) -> anyhow::Result<Zoned> {
    match &cli.now {
        Some(text) => parse_instant(text, zone),
        None => Ok(Zoned::now().with_time_zone(zone.clone())),
    }
}

/// Accepts a bracketed zone, an offset, or a civil datetime read in `zone`.
fn parse_instant(text: &str, zone: &TimeZone) -> anyhow::Result<Zoned> {
    if let Ok(zoned) = text.parse::<Zoned>() {
        return Ok(zoned);
    }
    if let Ok(timestamp) = text.parse::<Timestamp>() {
        return Ok(timestamp.to_zoned(zone.clone()));
    }
    let civil: DateTime = text
        .parse()
        .with_context(|| format!("invalid datetime '{text}'"))?;
    civil
        .to_zoned(zone.clone())
        .with_context(|| format!("invalid datetime '{text}'"))
}
