use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Confirm, CustomType, DateSelect, Select, Text};
use tracing::debug;

use sos_core::{
    Config, ObservationQuery, ObservationSeries, ResolvedServer, Session, SosError, SpatialMode,
    export::{export_csv, write_json},
    query::{DEFAULT_TIMEOUT_SECS, default_time_window, is_long_window, request_timeout},
    service_from_url,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "sos", version, about = "Sensor Observation Service (SOS 2.0) client")]
pub struct Cli {
    /// Configured server name or a service URL; defaults to the configured default server.
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save a server under a short name.
    Configure {
        name: String,
        url: String,

        /// GetObservation timeout in seconds for this server (0 for none).
        #[arg(long, allow_negative_numbers = true)]
        timeout: Option<i64>,

        /// Make this the default server.
        #[arg(long)]
        default: bool,
    },

    /// List configured servers.
    Servers,

    /// Show service identification and provider contact.
    Info,

    /// List stations (offerings grouped by observed area).
    Stations {
        #[arg(long)]
        json: bool,
    },

    /// List the offerings of a station.
    Offerings {
        #[arg(long)]
        station: usize,
    },

    /// List the observed properties of an offering.
    Properties {
        #[arg(long)]
        station: usize,
        #[arg(long)]
        offering: usize,
    },

    /// Fetch one observation series.
    Fetch {
        #[arg(long)]
        station: usize,
        #[arg(long)]
        offering: usize,
        #[arg(long)]
        property: usize,

        /// Window start (RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`, UTC).
        #[arg(long)]
        start: Option<String>,

        /// Window end, same formats as --start.
        #[arg(long)]
        end: Option<String>,

        /// Request timeout in seconds (capped at 7200, 0 for none).
        #[arg(long, allow_negative_numbers = true)]
        timeout: Option<i64>,

        /// Wait for the server as long as it takes.
        #[arg(long, conflicts_with = "timeout")]
        no_timeout: bool,

        /// Also export the series to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the series as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Walk station → offering → property interactively and fetch a series.
    Browse,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let server = self.server.as_deref();

        match self.command {
            Command::Configure { name, url, timeout, default } => {
                configure(&name, &url, timeout, default)
            }
            Command::Servers => list_servers(),
            Command::Info => {
                let (session, _) = connect(server).await?;
                print!("{}", output::render_info(session.snapshot()?.capabilities()));
                Ok(())
            }
            Command::Stations { json } => {
                let (session, _) = connect(server).await?;
                let stations = session.snapshot()?.describe_stations();
                if json {
                    println!("{}", serde_json::to_string_pretty(&stations)?);
                } else {
                    print!("{}", output::render_stations(&stations));
                }
                Ok(())
            }
            Command::Offerings { station } => {
                let (session, _) = connect(server).await?;
                print!("{}", output::render_offerings(&session.offerings(station)?));
                Ok(())
            }
            Command::Properties { station, offering } => {
                let (session, _) = connect(server).await?;
                let selected = session.offering(station, offering)?;
                let (start, end) = default_time_window(selected, Utc::now());

                println!("Offering: {}", output::offering_label(selected));
                println!("Time extent: {}", output::time_extent(selected));
                println!(
                    "Default window: {} / {}",
                    output::format_time(start),
                    output::format_time(end)
                );
                for (index, property) in selected.observed_properties.iter().enumerate() {
                    println!("{index:>3}  {property}");
                }
                Ok(())
            }
            Command::Fetch { station, offering, property, start, end, timeout, no_timeout, csv, json } => {
                let (mut session, resolved) = connect(server).await?;
                let selected = session.offering(station, offering)?;
                let (default_start, default_end) = default_time_window(selected, Utc::now());

                let start = start.as_deref().map(parse_datetime_arg).transpose()?;
                let end = end.as_deref().map(parse_datetime_arg).transpose()?;

                let query = ObservationQuery {
                    station_index: station,
                    offering_index: offering,
                    property_index: property,
                    start: start.unwrap_or(default_start),
                    end: end.unwrap_or(default_end),
                    timeout: fetch_timeout(timeout, no_timeout, resolved.timeout),
                };

                let series = fetch(&mut session, &query).await?;
                report_series(&series, json)?;

                if let Some(path) = csv {
                    write_export(&series, &path)?;
                }
                Ok(())
            }
            Command::Browse => browse(server).await,
        }
    }
}

fn configure(name: &str, url: &str, timeout: Option<i64>, default: bool) -> Result<()> {
    service_from_url(url)?;

    let mut config = Config::load()?;
    config.upsert_server(name, url, timeout);
    if default {
        config.set_default_server(name)?;
    }
    config.save()?;

    println!("Saved server '{name}' ({url}).");
    if config.default_server.as_deref() == Some(name) {
        println!("'{name}' is the default server.");
    }
    Ok(())
}

fn list_servers() -> Result<()> {
    let config = Config::load()?;
    let names = config.server_names();
    if names.is_empty() {
        println!("No servers configured. Run `sos configure <name> <url>` to add one.");
        return Ok(());
    }

    for name in names {
        let Some(server) = config.server(name) else {
            continue;
        };
        let marker = if config.default_server.as_deref() == Some(name) { "*" } else { " " };
        let timeout = match server.timeout() {
            Some(timeout) => format!("timeout {}s", timeout.as_secs()),
            None => "no timeout".to_string(),
        };
        println!("{marker} {name:<16} {}  ({timeout})", server.url);
    }
    Ok(())
}

/// Resolve the server, open a session and load its metadata.
async fn connect(server: Option<&str>) -> Result<(Session, ResolvedServer)> {
    let resolved = Config::load()?.resolve_server(server)?;
    debug!(url = %resolved.url, name = ?resolved.name, "connecting");

    let mut session = Session::new(service_from_url(&resolved.url)?);
    session
        .reload()
        .await
        .with_context(|| format!("Failed to load capabilities from {}", resolved.url))?;

    match session.spatial_mode()? {
        SpatialMode::NoOfferings => bail!("The server at {} declares no offerings.", resolved.url),
        SpatialMode::Unlocated => eprintln!(
            "Note: no offering declares an observed area; all offerings are listed under one station without location."
        ),
        SpatialMode::Located => {}
    }

    Ok((session, resolved))
}

/// `--no-timeout` wins, then `--timeout` (0 meaning none), then the server setting.
fn fetch_timeout(timeout: Option<i64>, no_timeout: bool, server: Option<Duration>) -> Option<Duration> {
    if no_timeout {
        return None;
    }
    match timeout {
        Some(secs) => request_timeout(secs),
        None => server,
    }
}

/// Long windows are only flagged when no timeout bounds the request.
fn warns_long_window(query: &ObservationQuery) -> bool {
    query.timeout.is_none() && is_long_window(query.start, query.end)
}

async fn fetch(session: &mut Session, query: &ObservationQuery) -> Result<ObservationSeries> {
    if warns_long_window(query) {
        eprintln!(
            "Note: the requested window is longer than 3 days and no timeout is set; the request may take a while."
        );
    }

    let generation = session.snapshot()?.generation();
    session.execute(generation, query).await.map_err(|err| {
        if let Some(details) = output::error_details(&err) {
            eprintln!("{details}");
        }
        err.into()
    })
}

fn report_series(series: &ObservationSeries, json: bool) -> Result<()> {
    for warning in output::series_warnings(series) {
        eprintln!("Warning: {warning}");
    }
    if let Some(details) = output::empty_series_details(series) {
        eprintln!("{details}");
    }

    if json {
        write_json(series, std::io::stdout().lock())?;
    } else if !series.is_empty() {
        print!("{}", output::render_series(series));
    }
    Ok(())
}

fn write_export(series: &ObservationSeries, path: &Path) -> Result<()> {
    if export_csv(series, path)? {
        println!("Exported {} rows to {}", series.len(), path.display());
    } else {
        eprintln!("Nothing to export: the series is empty.");
    }
    Ok(())
}

/// Accepts RFC 3339, a naive `YYYY-MM-DD[T ]HH:MM[:SS]` taken as UTC, or a bare date.
pub fn parse_datetime_arg(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            anyhow!("Invalid date '{value}'. Use RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`.")
        })
}

async fn browse(server: Option<&str>) -> Result<()> {
    let (mut session, resolved) = connect(server).await?;

    let station = match session.spatial_mode()? {
        SpatialMode::Located => {
            let stations = session.snapshot()?.describe_stations();
            let labels: Vec<String> = stations.iter().map(output::station_label).collect();
            Select::new("Station:", labels).raw_prompt()?.index
        }
        _ => 0,
    };

    let offerings = session.offerings(station)?;
    let labels: Vec<String> = offerings.iter().map(|o| output::offering_label(o)).collect();
    let offering = Select::new("Offering:", labels).raw_prompt()?.index;

    let properties = session.properties(station, offering)?.to_vec();
    if properties.is_empty() {
        bail!("The selected offering declares no observed properties.");
    }
    let property = Select::new("Observed property:", properties).raw_prompt()?.index;

    let selected = session.offering(station, offering)?;
    let (default_start, default_end) = default_time_window(selected, Utc::now());
    let start_date = DateSelect::new("Start date:")
        .with_default(default_start.date_naive())
        .prompt()?;
    let end_date = DateSelect::new("End date:")
        .with_default(default_end.date_naive())
        .with_min_date(start_date)
        .prompt()?;

    let mut query = ObservationQuery {
        station_index: station,
        offering_index: offering,
        property_index: property,
        start: start_date.and_time(NaiveTime::MIN).and_utc(),
        end: end_of_day(end_date),
        timeout: None,
    };

    let mut timeout = resolved.timeout;
    let series = loop {
        timeout = prompt_timeout(timeout)?;
        query.timeout = timeout;

        match fetch(&mut session, &query).await {
            Ok(series) => break series,
            Err(err) => {
                let retryable = err.downcast_ref::<SosError>().is_some_and(SosError::is_retryable);
                if retryable && Confirm::new("Retry the request?").with_default(true).prompt()? {
                    continue;
                }
                return Err(err);
            }
        }
    };

    report_series(&series, false)?;

    if !series.is_empty() && Confirm::new("Export to CSV?").with_default(false).prompt()? {
        let default_name = format!("{}.csv", series.offering.replace(['/', ':', '\\'], "_"));
        let path = Text::new("CSV file:").with_default(&default_name).prompt()?;
        write_export(&series, Path::new(&path))?;
    }

    Ok(())
}

/// Ask whether to bound the request, then for how long. `previous` seeds the defaults.
fn prompt_timeout(previous: Option<Duration>) -> Result<Option<Duration>> {
    let wanted = Confirm::new("Set a request timeout?")
        .with_default(previous.is_some())
        .prompt()?;
    if !wanted {
        return Ok(None);
    }

    let default_secs = previous.map_or(DEFAULT_TIMEOUT_SECS, |t| t.as_secs());
    let secs = CustomType::<i64>::new("Request timeout (seconds):")
        .with_default(default_secs as i64)
        .with_help_message("values above 7200 are capped, 0 means no timeout")
        .prompt()?;
    Ok(request_timeout(secs))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    date.and_time(last_second).and_utc()
}
