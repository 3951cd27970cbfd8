//! Station identity.
//!
//! SOS 2.0 has no notion of a station: servers publish offerings, each with
//! an observed area. Offerings whose observed area reprojects to the very
//! same WGS84 box are treated as one station, and stations are numbered in
//! the order their box is first seen.

use serde::Serialize;
use tracing::debug;

use crate::{
    crs::{CrsCode, ReprojectionError},
    model::{BoundingBox, Envelope, Offering, StationKey},
};

/// Compute the station key of an offering.
///
/// The declared corners are reprojected to WGS84. When that is impossible
/// (no `srsName`, unknown CRS, coordinates outside the projection) the
/// corners are taken as latitude-first WGS84 as written.
pub fn resolve_station_key(offering: &Offering) -> StationKey {
    let envelope = offering.observed_area.as_ref()?;

    match reproject(envelope) {
        Ok(bbox) => Some(bbox),
        Err(err) => {
            debug!(offering = %offering.id, error = %err, "reprojection failed, using declared corners");
            Some(declared_box(envelope))
        }
    }
}

fn reproject(envelope: &Envelope) -> Result<BoundingBox, ReprojectionError> {
    let srs = envelope
        .srs_name
        .as_deref()
        .ok_or(ReprojectionError::Missing)?;
    let crs = CrsCode::parse(srs)?;

    let (west, south) = crs.corner_to_wgs84(envelope.lower_corner)?;
    let (east, north) = crs.corner_to_wgs84(envelope.upper_corner)?;

    Ok(BoundingBox { south, west, north, east })
}

fn declared_box(envelope: &Envelope) -> BoundingBox {
    BoundingBox {
        south: envelope.lower_corner[0],
        west: envelope.lower_corner[1],
        north: envelope.upper_corner[0],
        east: envelope.upper_corner[1],
    }
}

/// Distinct station keys in first-seen order. Position in the returned list
/// is the station index.
pub fn group_into_stations(offerings: &[Offering]) -> Vec<StationKey> {
    let mut stations: Vec<StationKey> = Vec::new();

    for key in offerings.iter().map(resolve_station_key) {
        if !stations.contains(&key) {
            stations.push(key);
        }
    }

    stations
}

/// Offerings belonging to `station`, in their original order.
pub fn offerings_for_station<'a>(offerings: &'a [Offering], station: &StationKey) -> Vec<&'a Offering> {
    offerings
        .iter()
        .filter(|off| resolve_station_key(off) == *station)
        .collect()
}

/// Display view of one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub index: usize,
    pub key: StationKey,
    pub offering_ids: Vec<String>,
}

impl Station {
    /// `(lon, lat)` marker for the station, if it has a location at all.
    pub fn location(&self) -> Option<(f64, f64)> {
        self.key.map(|bbox| bbox.location())
    }
}

pub fn describe_stations(offerings: &[Offering]) -> Vec<Station> {
    group_into_stations(offerings)
        .into_iter()
        .enumerate()
        .map(|(index, key)| Station {
            index,
            key,
            offering_ids: offerings_for_station(offerings, &key)
                .into_iter()
                .map(|off| off.id.clone())
                .collect(),
        })
        .collect()
}
