//! Core library for the `sos` CLI.
//!
//! This crate defines:
//! - Decoding of SOS 2.0 capabilities and observation responses
//! - Station identity: grouping offerings by their reprojected observed area
//! - The station → offering → property cascade and the single GetObservation query
//! - A session object holding the metadata snapshot selections are made against
//! - Configuration of saved servers, and CSV export
//!
//! It is used by `sos-cli`, but can also be reused by other binaries or services.

pub mod capabilities;
pub mod config;
pub mod crs;
pub mod error;
pub mod export;
pub mod model;
pub mod observation;
pub mod query;
pub mod service;
pub mod session;
pub mod station;

mod xml;

#[cfg(test)]
mod fixtures;

pub use config::{Config, ResolvedServer, ServerConfig};
pub use error::{IndexKind, ResponseBody, SosError};
pub use model::{
    BoundingBox, Capabilities, ObservationPoint, ObservationQuery, ObservationSeries, Offering,
    StationKey,
};
pub use service::{HttpSosClient, ObservationService, service_from_url};
pub use session::{Session, Snapshot, SpatialMode};
pub use station::Station;
