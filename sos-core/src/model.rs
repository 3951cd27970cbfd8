use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ResponseBody;

/// WGS84 extent of an offering, in degrees.
///
/// Equality is exact float equality; it is what decides whether two offerings
/// belong to the same station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self { south, west, north, east }
    }

    /// Point used to place a station on a map: minimum longitude, minimum latitude.
    ///
    /// Most servers declare a degenerate box for fixed sensors, so both corners coincide.
    pub fn location(&self) -> (f64, f64) {
        (self.west.min(self.east), self.south.min(self.north))
    }

    pub fn is_point(&self) -> bool {
        self.south == self.north && self.west == self.east
    }
}

/// Station identity: the reprojected box, or `None` for offerings without one.
pub type StationKey = Option<BoundingBox>;

/// Observed area exactly as declared in the capabilities document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Corner coordinates in the CRS's own axis order.
    pub lower_corner: [f64; 2],
    pub upper_corner: [f64; 2],
    pub srs_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Offering {
    pub id: String,
    pub name: Option<String>,
    pub procedure: Option<String>,
    pub observed_properties: Vec<String>,
    pub observed_area: Option<Envelope>,
    pub begin_position: Option<DateTime<Utc>>,
    pub end_position: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceIdentification {
    pub title: String,
    pub abstract_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceContact {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postcode: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceProvider {
    pub name: String,
    pub url: String,
    pub contact: ServiceContact,
}

/// Decoded GetCapabilities document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub identification: ServiceIdentification,
    pub provider: ServiceProvider,
    pub offerings: Vec<Offering>,
}

/// Positional selection along the station → offering → property cascade.
///
/// Indices only mean something relative to the metadata snapshot they were
/// taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationQuery {
    pub station_index: usize,
    pub offering_index: usize,
    pub property_index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timeout: Option<Duration>,
}

/// One decoded `om:OM_Observation`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observation {
    pub result_time: Option<DateTime<Utc>>,
    pub has_result: bool,
    pub uom: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// Flat time series returned for one query, in response order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    pub offering: String,
    pub property: String,
    /// Empty when the server did not state one.
    pub unit: String,
    pub points: Vec<ObservationPoint>,
    /// Raw GetObservation body the series was decoded from, kept so an empty
    /// result can still be inspected.
    #[serde(skip)]
    pub response: ResponseBody,
}

impl ObservationSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn dates(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.time).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Column / axis label, e.g. `temperature(degC)`.
    pub fn column_label(&self) -> String {
        format!("{}({})", self.property, self.unit)
    }
}
