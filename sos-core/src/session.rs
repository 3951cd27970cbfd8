//! Per-server session: the service handle, the metadata snapshot the user is
//! selecting from, and the result of the last query.

use tracing::info;

use crate::{
    capabilities::parse_capabilities,
    error::{IndexKind, SosError},
    model::{Capabilities, ObservationQuery, ObservationSeries, Offering, StationKey},
    query::build_and_execute,
    service::ObservationService,
    station::{Station, describe_stations, group_into_stations, offerings_for_station},
};

/// How stations can be presented for the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialMode {
    /// The server declared no offerings at all.
    NoOfferings,
    /// No offering has an observed area; everything sits in one unlocated station.
    Unlocated,
    Located,
}

/// Metadata as loaded by one `reload`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: u64,
    capabilities: Capabilities,
    stations: Vec<StationKey>,
}

impl Snapshot {
    fn new(generation: u64, capabilities: Capabilities) -> Self {
        let stations = group_into_stations(&capabilities.offerings);
        Self { generation, capabilities, stations }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn offerings(&self) -> &[Offering] {
        &self.capabilities.offerings
    }

    pub fn stations(&self) -> &[StationKey] {
        &self.stations
    }

    pub fn describe_stations(&self) -> Vec<Station> {
        describe_stations(self.offerings())
    }
}

#[derive(Debug)]
pub struct Session {
    service: Box<dyn ObservationService>,
    snapshot: Option<Snapshot>,
    generation: u64,
    last_series: Option<ObservationSeries>,
}

impl Session {
    pub fn new(service: Box<dyn ObservationService>) -> Self {
        Self { service, snapshot: None, generation: 0, last_series: None }
    }

    /// Fetch capabilities again and replace the snapshot.
    ///
    /// On failure the previous snapshot is kept untouched.
    pub async fn reload(&mut self) -> Result<&Snapshot, SosError> {
        let body = self.service.get_capabilities().await?;
        let capabilities = parse_capabilities(&body)?;

        self.generation += 1;
        let snapshot = Snapshot::new(self.generation, capabilities);
        info!(
            generation = snapshot.generation,
            offerings = snapshot.offerings().len(),
            stations = snapshot.stations.len(),
            "service metadata loaded"
        );

        self.last_series = None;
        Ok(&*self.snapshot.insert(snapshot))
    }

    pub fn snapshot(&self) -> Result<&Snapshot, SosError> {
        self.snapshot.as_ref().ok_or(SosError::NoMetadata)
    }

    pub fn spatial_mode(&self) -> Result<SpatialMode, SosError> {
        let snapshot = self.snapshot()?;
        Ok(if snapshot.offerings().is_empty() {
            SpatialMode::NoOfferings
        } else if snapshot.stations.iter().all(Option::is_none) {
            SpatialMode::Unlocated
        } else {
            SpatialMode::Located
        })
    }

    pub fn station(&self, index: usize) -> Result<StationKey, SosError> {
        let stations = &self.snapshot()?.stations;
        stations.get(index).copied().ok_or(SosError::Index {
            kind: IndexKind::Station,
            index,
            len: stations.len(),
        })
    }

    /// Offerings of the station at `station`, in capabilities order.
    pub fn offerings(&self, station: usize) -> Result<Vec<&Offering>, SosError> {
        let key = self.station(station)?;
        Ok(offerings_for_station(self.snapshot()?.offerings(), &key))
    }

    pub fn offering(&self, station: usize, offering: usize) -> Result<&Offering, SosError> {
        let offerings = self.offerings(station)?;
        let len = offerings.len();
        offerings
            .into_iter()
            .nth(offering)
            .ok_or(SosError::Index { kind: IndexKind::Offering, index: offering, len })
    }

    pub fn properties(&self, station: usize, offering: usize) -> Result<&[String], SosError> {
        Ok(&self.offering(station, offering)?.observed_properties)
    }

    /// Run `query`, which must have been built against snapshot `generation`.
    pub async fn execute(
        &mut self,
        generation: u64,
        query: &ObservationQuery,
    ) -> Result<ObservationSeries, SosError> {
        let snapshot = self.snapshot.as_ref().ok_or(SosError::NoMetadata)?;
        if generation != snapshot.generation {
            return Err(SosError::StaleSnapshot { query: generation, current: snapshot.generation });
        }

        let series = build_and_execute(self.service.as_ref(), snapshot.offerings(), query).await?;
        self.last_series = Some(series.clone());
        Ok(series)
    }

    pub fn last_series(&self) -> Option<&ObservationSeries> {
        self.last_series.as_ref()
    }
}
