//! Coordinate reference systems an SOS server may declare for an offering's
//! observed area, and their inverse projection to WGS84.
//!
//! Only a handful of CRSs show up in practice on SOS 2.0 servers, so the
//! projection math is implemented directly rather than through a GIS
//! library:
//! - geographic CRSs on WGS84-compatible datums are passed through,
//! - Web Mercator uses the spherical inverse,
//! - UTM uses the ellipsoidal transverse Mercator inverse (Snyder, 1987).

use std::{f64::consts::PI, fmt};

use thiserror::Error;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReprojectionError {
    #[error("no CRS declared")]
    Missing,

    #[error("unrecognised CRS identifier: {0}")]
    Malformed(String),

    #[error("unsupported CRS: {0}")]
    Unsupported(String),

    #[error("coordinates ({x}, {y}) cannot be projected from {crs}")]
    OutOfDomain { crs: CrsCode, x: f64, y: f64 },
}

/// Axis order of the coordinates as written in the capabilities document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// Latitude (northing) first.
    LatLon,
    /// Longitude (easting) first.
    XY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsCode {
    /// EPSG:4326, latitude first.
    Epsg4326,
    /// OGC CRS84, longitude first.
    Crs84,
    /// ETRS89 geographic.
    Epsg4258,
    /// NAD83 geographic.
    Epsg4269,
    /// Web Mercator and its legacy aliases.
    WebMercator,
    /// UTM zone on WGS84 (326zz / 327zz) or ETRS89 (258zz, northern only).
    Utm { zone: u8, north: bool },
}

impl CrsCode {
    /// Parse the `srsName` forms servers actually emit:
    /// `EPSG:4326`, `urn:ogc:def:crs:EPSG::4326`, `urn:ogc:def:crs:EPSG:6.6:4326`,
    /// `http://www.opengis.net/def/crs/EPSG/0/4326`, plus the CRS84 variants.
    pub fn parse(s: &str) -> Result<Self, ReprojectionError> {
        let trimmed = s.trim();
        let upper = trimmed.to_uppercase();

        if upper == "CRS:84"
            || upper.ends_with(":CRS84")
            || upper.ends_with("/OGC/1.3/CRS84")
            || upper.ends_with("/OGC/0/CRS84")
        {
            return Ok(CrsCode::Crs84);
        }

        let code = if let Some(rest) = upper.strip_prefix("EPSG:") {
            rest
        } else if let Some(rest) = upper.strip_prefix("URN:OGC:DEF:CRS:EPSG:") {
            // Optional version segment: "::4326" or ":6.6:4326".
            rest.rsplit(':').next().unwrap_or(rest)
        } else if upper.starts_with("HTTP://") || upper.starts_with("HTTPS://") {
            match upper.split_once("/DEF/CRS/EPSG/") {
                Some((_, rest)) => rest.rsplit('/').next().unwrap_or(rest),
                None => return Err(ReprojectionError::Malformed(trimmed.to_string())),
            }
        } else {
            return Err(ReprojectionError::Malformed(trimmed.to_string()));
        };

        let code: u32 = code
            .trim()
            .parse()
            .map_err(|_| ReprojectionError::Malformed(trimmed.to_string()))?;

        Self::from_epsg(code).ok_or_else(|| ReprojectionError::Unsupported(trimmed.to_string()))
    }

    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 => Some(CrsCode::Epsg4326),
            4258 => Some(CrsCode::Epsg4258),
            4269 => Some(CrsCode::Epsg4269),
            3857 | 900913 | 3785 | 102100 => Some(CrsCode::WebMercator),
            32601..=32660 => Some(CrsCode::Utm { zone: (code - 32600) as u8, north: true }),
            32701..=32760 => Some(CrsCode::Utm { zone: (code - 32700) as u8, north: false }),
            25801..=25860 => Some(CrsCode::Utm { zone: (code - 25800) as u8, north: true }),
            _ => None,
        }
    }

    pub fn axis_order(&self) -> AxisOrder {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4258 | CrsCode::Epsg4269 => AxisOrder::LatLon,
            _ => AxisOrder::XY,
        }
    }

    /// Project a point given as (easting, northing) / (lon, lat) to WGS84,
    /// returning `(lon, lat)` in degrees.
    pub fn to_wgs84(&self, x: f64, y: f64) -> Result<(f64, f64), ReprojectionError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ReprojectionError::OutOfDomain { crs: *self, x, y });
        }

        let (lon, lat) = match *self {
            CrsCode::Epsg4326 | CrsCode::Crs84 | CrsCode::Epsg4258 | CrsCode::Epsg4269 => (x, y),
            CrsCode::WebMercator => web_mercator_inverse(x, y),
            CrsCode::Utm { zone, north } => utm_inverse(x, y, zone, north),
        };

        if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 {
            return Err(ReprojectionError::OutOfDomain { crs: *self, x, y });
        }

        Ok((lon, lat))
    }

    /// Project a corner written in this CRS's native axis order.
    pub fn corner_to_wgs84(&self, corner: [f64; 2]) -> Result<(f64, f64), ReprojectionError> {
        match self.axis_order() {
            AxisOrder::LatLon => self.to_wgs84(corner[1], corner[0]),
            AxisOrder::XY => self.to_wgs84(corner[0], corner[1]),
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsCode::Epsg4326 => f.write_str("EPSG:4326"),
            CrsCode::Crs84 => f.write_str("CRS:84"),
            CrsCode::Epsg4258 => f.write_str("EPSG:4258"),
            CrsCode::Epsg4269 => f.write_str("EPSG:4269"),
            CrsCode::WebMercator => f.write_str("EPSG:3857"),
            CrsCode::Utm { zone, north: true } => write!(f, "EPSG:326{zone:02}"),
            CrsCode::Utm { zone, north: false } => write!(f, "EPSG:327{zone:02}"),
        }
    }
}

fn web_mercator_inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WGS84_A).to_degrees();
    let lat = (2.0 * (y / WGS84_A).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

fn utm_inverse(easting: f64, northing: f64, zone: u8, north: bool) -> (f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let ep2 = e2 / (1.0 - e2);

    let x = easting - UTM_FALSE_EASTING;
    let y = if north { northing } else { northing - UTM_FALSE_NORTHING_SOUTH };
    let lon0 = (f64::from(zone) * 6.0 - 183.0).to_radians();

    let m = y / UTM_K0;
    let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));

    let sqrt_1_e2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);

    // Footpoint latitude.
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let n1 = WGS84_A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let t1 = tan_phi1 * tan_phi1;
    let c1 = ep2 * cos_phi1 * cos_phi1;
    let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * UTM_K0);

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);

    let lon = lon0
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                * d.powi(5)
                / 120.0)
            / cos_phi1;

    (lon.to_degrees(), lat.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!((actual - expected).abs() < tol, "expected {expected}, got {actual}");
    }

    #[test]
    fn parses_common_srs_name_forms() {
        assert_eq!(CrsCode::parse("EPSG:4326").unwrap(), CrsCode::Epsg4326);
        assert_eq!(CrsCode::parse("epsg:3857").unwrap(), CrsCode::WebMercator);
        assert_eq!(CrsCode::parse("urn:ogc:def:crs:EPSG::4326").unwrap(), CrsCode::Epsg4326);
        assert_eq!(CrsCode::parse("urn:ogc:def:crs:EPSG:6.6:4258").unwrap(), CrsCode::Epsg4258);
        assert_eq!(
            CrsCode::parse("http://www.opengis.net/def/crs/EPSG/0/4326").unwrap(),
            CrsCode::Epsg4326
        );
        assert_eq!(
            CrsCode::parse("http://www.opengis.net/def/crs/EPSG/0/32631").unwrap(),
            CrsCode::Utm { zone: 31, north: true }
        );
        assert_eq!(CrsCode::parse("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(), CrsCode::Crs84);
        assert_eq!(CrsCode::parse("CRS:84").unwrap(), CrsCode::Crs84);
    }

    #[test]
    fn rejects_unknown_and_garbage() {
        assert!(matches!(
            CrsCode::parse("EPSG:99999"),
            Err(ReprojectionError::Unsupported(_))
        ));
        assert!(matches!(CrsCode::parse("not a crs"), Err(ReprojectionError::Malformed(_))));
        assert!(matches!(CrsCode::parse("EPSG:abc"), Err(ReprojectionError::Malformed(_))));
        assert!(matches!(
            CrsCode::parse("http://example.com/crs/4326"),
            Err(ReprojectionError::Malformed(_))
        ));
    }

    #[test]
    fn geographic_codes_are_identity() {
        let (lon, lat) = CrsCode::Epsg4326.to_wgs84(2.35, 48.85).unwrap();
        assert_eq!((lon, lat), (2.35, 48.85));

        // EPSG:4326 corners are written latitude first.
        let (lon, lat) = CrsCode::Epsg4326.corner_to_wgs84([48.85, 2.35]).unwrap();
        assert_eq!((lon, lat), (2.35, 48.85));

        // CRS84 corners are written longitude first.
        let (lon, lat) = CrsCode::Crs84.corner_to_wgs84([2.35, 48.85]).unwrap();
        assert_eq!((lon, lat), (2.35, 48.85));
    }

    #[test]
    fn web_mercator_inverse_matches_known_points() {
        let (lon, lat) = CrsCode::WebMercator.to_wgs84(0.0, 0.0).unwrap();
        assert_close(lon, 0.0, 1e-12);
        assert_close(lat, 0.0, 1e-12);

        // Paris, roughly.
        let (lon, lat) = CrsCode::WebMercator.to_wgs84(261_845.7, 6_250_564.3).unwrap();
        assert_close(lon, 2.3522, 1e-3);
        assert_close(lat, 48.8566, 1e-3);
    }

    #[test]
    fn utm_inverse_matches_known_points() {
        // Central meridian of zone 31 on the equator.
        let (lon, lat) = CrsCode::Utm { zone: 31, north: true }.to_wgs84(500_000.0, 0.0).unwrap();
        assert_close(lon, 3.0, 1e-9);
        assert_close(lat, 0.0, 1e-9);

        // Eiffel Tower in UTM 31N.
        let (lon, lat) =
            CrsCode::Utm { zone: 31, north: true }.to_wgs84(448_252.0, 5_411_935.0).unwrap();
        assert_close(lon, 2.2945, 1e-3);
        assert_close(lat, 48.8582, 1e-3);

        // Southern hemisphere uses the 10 000 km false northing.
        let (_, lat) =
            CrsCode::Utm { zone: 56, north: false }.to_wgs84(334_369.0, 6_250_948.0).unwrap();
        assert_close(lat, -33.8688, 1e-2);
    }

    #[test]
    fn non_finite_input_is_out_of_domain() {
        let err = CrsCode::WebMercator.to_wgs84(f64::NAN, 0.0).unwrap_err();
        assert!(matches!(err, ReprojectionError::OutOfDomain { .. }));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for code in [
            CrsCode::Epsg4326,
            CrsCode::Epsg4258,
            CrsCode::WebMercator,
            CrsCode::Utm { zone: 5, north: true },
            CrsCode::Utm { zone: 56, north: false },
        ] {
            assert_eq!(CrsCode::parse(&code.to_string()).unwrap(), code);
        }
    }
}
