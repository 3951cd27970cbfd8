//! Human-readable rendering of core types.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use sos_core::{Capabilities, ObservationSeries, Offering, ResponseBody, SosError, Station};

/// Longest server body echoed back on errors.
const MAX_BODY_CHARS: usize = 2000;

pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn format_optional_time(time: Option<DateTime<Utc>>) -> String {
    time.map(format_time).unwrap_or_else(|| "?".to_string())
}

pub fn format_location(station: &Station) -> String {
    match station.location() {
        Some((lon, lat)) => format!("lon {lon:.5}, lat {lat:.5}"),
        None => "no location".to_string(),
    }
}

/// One-line label used in tables and interactive pickers.
pub fn station_label(station: &Station) -> String {
    let count = station.offering_ids.len();
    let noun = if count == 1 { "offering" } else { "offerings" };
    format!("#{} {} ({count} {noun})", station.index, format_location(station))
}

pub fn offering_label(offering: &Offering) -> String {
    match &offering.name {
        Some(name) if name != &offering.id => format!("{} ({name})", offering.id),
        _ => offering.id.clone(),
    }
}

pub fn time_extent(offering: &Offering) -> String {
    format!(
        "{} / {}",
        format_optional_time(offering.begin_position),
        format_optional_time(offering.end_position)
    )
}

pub fn render_info(caps: &Capabilities) -> String {
    let mut out = String::new();
    let id = &caps.identification;
    let provider = &caps.provider;
    let contact = &provider.contact;

    let _ = writeln!(out, "Title:     {}", id.title);
    if !id.abstract_text.is_empty() {
        let _ = writeln!(out, "Abstract:  {}", id.abstract_text);
    }
    let _ = writeln!(out, "Offerings: {}", caps.offerings.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "Provider:  {}", provider.name);

    let fields = [
        ("Site", &provider.url),
        ("Phone", &contact.phone),
        ("Email", &contact.email),
        ("Address", &contact.address),
        ("City", &contact.city),
        ("Region", &contact.region),
        ("Postcode", &contact.postcode),
        ("Country", &contact.country),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            let _ = writeln!(out, "{:<10} {value}", format!("{label}:"));
        }
    }

    out
}

pub fn render_stations(stations: &[Station]) -> String {
    let mut out = String::new();
    for station in stations {
        let _ = writeln!(out, "{}", station_label(station));
        if let Some(bbox) = station.key {
            if !bbox.is_point() {
                let _ = writeln!(
                    out,
                    "    box: south {} west {} north {} east {}",
                    bbox.south, bbox.west, bbox.north, bbox.east
                );
            }
        }
        for id in &station.offering_ids {
            let _ = writeln!(out, "    - {id}");
        }
    }
    out
}

pub fn render_offerings(offerings: &[&Offering]) -> String {
    let mut out = String::new();
    for (index, offering) in offerings.iter().enumerate() {
        let _ = writeln!(out, "{index:>3}  {}", offering_label(offering));
        let _ = writeln!(out, "     time: {}", time_extent(offering));
        let _ = writeln!(out, "     properties: {}", offering.observed_properties.len());
    }
    out
}

pub fn render_series(series: &ObservationSeries) -> String {
    let mut out = String::new();
    let label = series.column_label();
    let _ = writeln!(out, "{:<22} {label}", "Date");
    for point in &series.points {
        let _ = writeln!(out, "{:<22} {}", format_time(point.time), point.value);
    }
    out
}

/// Warnings worth surfacing for a series the server returned successfully.
pub fn series_warnings(series: &ObservationSeries) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if series.dates().is_empty() {
        warnings.push("the server returned no dates for this selection");
    }
    if series.values().is_empty() {
        warnings.push("the server returned no values for this selection");
    }
    warnings
}

/// Server body shown under the empty-series warnings.
pub fn empty_series_details(series: &ObservationSeries) -> Option<String> {
    if !series.is_empty() {
        return None;
    }
    match &series.response {
        ResponseBody::Empty => Some("Empty GetObservation response".to_string()),
        body => Some(server_response(body)),
    }
}

fn server_response(body: &ResponseBody) -> String {
    let text = body.to_string();
    let shown: String = text.chars().take(MAX_BODY_CHARS).collect();
    let suffix = if shown.len() < text.len() { "\n[...]" } else { "" };
    format!("Server response:\n{shown}{suffix}")
}

/// Extra detail printed below a failed request.
pub fn error_details(err: &SosError) -> Option<String> {
    if err.is_retryable() {
        return Some(
            "The server did not answer in time. Retry with a larger --timeout, --timeout 0 for none, or a shorter window."
                .to_string(),
        );
    }

    err.response_body().map(server_response)
}
