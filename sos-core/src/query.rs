//! Turning a cascade selection into one GetObservation call and a flat series.

use std::time::Duration;

use chrono::{DateTime, Duration as TimeDelta, Utc};
use tracing::{debug, info};

use crate::{
    error::{IndexKind, ResponseBody, SosError},
    model::{Observation, ObservationPoint, ObservationQuery, ObservationSeries, Offering},
    observation::parse_observations,
    service::{GetObservationRequest, ObservationService},
    station::{group_into_stations, offerings_for_station},
};

/// O&M 2.0 response format.
pub const OM_RESPONSE_FORMAT: &str = "http://www.opengis.net/om/2.0";
/// Declares the `om` prefix used by the temporal filter.
pub const OM_NAMESPACE: &str = "xmlns(om,http://www.opengis.net/om/2.0)";

/// Length of the window proposed when an offering is picked.
pub const DEFAULT_WINDOW_DAYS: i64 = 2;
/// Windows longer than this are worth a "this may take a while" notice.
pub const LONG_WINDOW_DAYS: i64 = 3;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const MAX_TIMEOUT_SECS: u64 = 7200;

/// Negative values count as positive, anything above two hours is capped.
pub fn clamp_timeout(secs: i64) -> Duration {
    Duration::from_secs(secs.unsigned_abs().min(MAX_TIMEOUT_SECS))
}

/// Request timeout from user input; `0` means no client-side timeout.
pub fn request_timeout(secs: i64) -> Option<Duration> {
    (secs != 0).then(|| clamp_timeout(secs))
}

/// `om:phenomenonTime,<start>/<end>`.
///
/// Both ends are naive UTC date-times without an offset (`2024-05-01T00:00:00`).
/// Sub-second digits only appear when present.
pub fn event_time(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!("om:phenomenonTime,{}/{}", naive_iso(start), naive_iso(end))
}

fn naive_iso(time: DateTime<Utc>) -> String {
    time.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

fn pick<T>(items: &[T], index: usize, kind: IndexKind) -> Result<&T, SosError> {
    items.get(index).ok_or(SosError::Index { kind, index, len: items.len() })
}

/// Resolve the cascade indices against `offerings` and build the request.
///
/// No I/O happens here, so an out-of-range index never reaches the server.
pub fn build_request(
    offerings: &[Offering],
    query: &ObservationQuery,
) -> Result<(GetObservationRequest, String), SosError> {
    let stations = group_into_stations(offerings);
    let station = pick(&stations, query.station_index, IndexKind::Station)?;

    let station_offerings = offerings_for_station(offerings, station);
    let offering = *pick(&station_offerings, query.offering_index, IndexKind::Offering)?;

    let property = pick(&offering.observed_properties, query.property_index, IndexKind::Property)?;

    let request = GetObservationRequest {
        response_format: OM_RESPONSE_FORMAT.to_string(),
        offering: offering.id.clone(),
        observed_property: property.clone(),
        event_time: event_time(query.start, query.end),
        namespaces: OM_NAMESPACE.to_string(),
        timeout: query.timeout,
    };

    Ok((request, property.clone()))
}

/// Flatten decoded observations into a series.
///
/// The unit comes from the first observation that has a result. Observations
/// missing either a result time or a numeric value are left out.
pub fn assemble_series(offering: &str, property: &str, observations: &[Observation]) -> ObservationSeries {
    let unit = observations
        .iter()
        .find(|obs| obs.has_result)
        .and_then(|obs| obs.uom.clone())
        .unwrap_or_default();

    let points: Vec<ObservationPoint> = observations
        .iter()
        .filter_map(|obs| match (obs.result_time, obs.value) {
            (Some(time), Some(value)) => Some(ObservationPoint { time, value }),
            _ => None,
        })
        .collect();

    let dropped = observations.len() - points.len();
    if dropped > 0 {
        debug!(dropped, "skipped observations without result time or value");
    }

    ObservationSeries {
        offering: offering.to_string(),
        property: property.to_string(),
        unit,
        points,
        response: ResponseBody::Empty,
    }
}

/// Run one query against `service` using the given metadata snapshot.
pub async fn build_and_execute(
    service: &dyn ObservationService,
    offerings: &[Offering],
    query: &ObservationQuery,
) -> Result<ObservationSeries, SosError> {
    let (request, property) = build_request(offerings, query)?;

    let body = service.get_observation(&request).await?;
    let observations = parse_observations(&body)?;
    let mut series = assemble_series(&request.offering, &property, &observations);
    series.response = ResponseBody::from_text(&body);

    info!(
        offering = %series.offering,
        property = %series.property,
        points = series.len(),
        "observation query finished"
    );
    Ok(series)
}

/// Window proposed for a freshly selected offering: the last two days of its
/// declared phenomenon time, never starting before its begin position.
pub fn default_time_window(offering: &Offering, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = offering.end_position.unwrap_or(now);
    let mut start = end - TimeDelta::days(DEFAULT_WINDOW_DAYS);

    if let Some(begin) = offering.begin_position.filter(|begin| start < *begin && *begin <= end) {
        start = begin;
    }

    (start, end)
}

pub fn is_long_window(start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    end - start > TimeDelta::days(LONG_WINDOW_DAYS)
}
