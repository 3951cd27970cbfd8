//! GetObservation response decoding.
//!
//! Only `OM_Measurement`-style results are understood: a single numeric
//! value with a `uom` attribute. Anything else decodes as an observation
//! without a usable value.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::{
    error::SosError,
    model::Observation,
    xml::{attribute, exception_report, parent, parse_time, path_contains, start_name},
};

/// Decode every `om:OM_Observation` of a GetObservation response, in document order.
pub fn parse_observations(xml: &str) -> Result<Vec<Observation>, SosError> {
    if let Some(report) = exception_report(xml) {
        return Err(SosError::query(format!("server returned an exception: {report}"), xml));
    }

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut decoder = ObservationDecoder::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = start_name(&e);
                decoder.open(&path, &name, &e);
                path.push(name);
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                let name = start_name(&e);
                decoder.open(&path, &name, &e);
                path.push(name);
                decoder.close(&path, "");
                path.pop();
            }
            Ok(Event::Text(t)) => {
                let unescaped = t
                    .unescape()
                    .map_err(|err| SosError::query(format!("invalid text content: {err}"), xml))?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(&c)),
            Ok(Event::End(_)) => {
                decoder.close(&path, text.trim());
                path.pop();
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(SosError::query(
                    format!("malformed XML at byte {}: {err}", reader.buffer_position()),
                    xml,
                ));
            }
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(SosError::query(format!("document ends inside <{open}>"), xml));
    }

    match decoder.root.as_deref() {
        Some("GetObservationResponse") => {}
        Some(other) => {
            return Err(SosError::query(
                format!("expected a GetObservationResponse, got <{other}>"),
                xml,
            ));
        }
        None => return Err(SosError::query("document has no root element", xml)),
    }

    Ok(decoder.finish())
}

#[derive(Default)]
struct ObservationDecoder {
    root: Option<String>,
    observations: Vec<(Observation, Option<String>)>,
    current: Option<Observation>,
    result_time_ref: Option<String>,
    instant_id: Option<String>,
    /// Every `gml:TimeInstant` with an id, for resolving `xlink:href` references.
    instants: HashMap<String, DateTime<Utc>>,
}

impl ObservationDecoder {
    fn open(&mut self, path: &[String], name: &str, e: &BytesStart) {
        if self.root.is_none() {
            self.root = Some(name.to_string());
        }

        match name {
            "OM_Observation" => {
                self.current = Some(Observation::default());
                self.result_time_ref = None;
            }
            "TimeInstant" => self.instant_id = attribute(e, "id"),
            "resultTime" if self.current.is_some() => {
                self.result_time_ref = attribute(e, "href")
                    .and_then(|href| href.strip_prefix('#').map(str::to_string));
            }
            "result" if path.last().map(String::as_str) == Some("OM_Observation") => {
                if let Some(obs) = self.current.as_mut() {
                    obs.has_result = true;
                    obs.uom = attribute(e, "uom").filter(|u| !u.is_empty());
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, path: &[String], text: &str) {
        match path.last().map(String::as_str) {
            Some("timePosition") => {
                let time = parse_time(text);
                if let (Some(id), Some(time)) = (self.instant_id.as_ref(), time) {
                    self.instants.insert(id.clone(), time);
                }
                if path_contains(path, "resultTime") {
                    if let Some(obs) = self.current.as_mut() {
                        obs.result_time = time;
                    }
                }
            }
            Some("TimeInstant") => self.instant_id = None,
            Some("result") if parent(path) == Some("OM_Observation") => {
                if let Some(obs) = self.current.as_mut() {
                    obs.value = text.parse::<f64>().ok();
                }
            }
            Some("OM_Observation") => {
                if let Some(obs) = self.current.take() {
                    self.observations.push((obs, self.result_time_ref.take()));
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Vec<Observation> {
        let instants = self.instants;
        let observations: Vec<Observation> = self
            .observations
            .into_iter()
            .map(|(mut obs, reference)| {
                if obs.result_time.is_none() {
                    obs.result_time = reference.and_then(|id| instants.get(&id).copied());
                }
                obs
            })
            .collect();

        debug!(count = observations.len(), "decoded observations");
        observations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ResponseBody, fixtures};
    use chrono::TimeZone;

    #[test]
    fn decodes_measurements_in_order() {
        let obs = parse_observations(fixtures::observations_with_gap_xml()).unwrap();
        assert_eq!(obs.len(), 3);

        assert_eq!(obs[0].result_time, Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()));
        assert!(obs[0].has_result);
        assert_eq!(obs[0].uom.as_deref(), Some("degC"));
        assert_eq!(obs[0].value, Some(14.2));

        assert_eq!(obs[1].result_time, None);
        assert_eq!(obs[1].value, Some(14.6));
    }

    #[test]
    fn resolves_result_time_references() {
        let obs = parse_observations(fixtures::observations_with_gap_xml()).unwrap();
        // The third observation points its result time at its phenomenon time.
        assert_eq!(obs[2].result_time, Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
        assert_eq!(obs[2].value, Some(15.1));
    }

    #[test]
    fn missing_unit_and_non_numeric_value() {
        let obs = parse_observations(fixtures::observations_mixed_xml()).unwrap();
        assert_eq!(obs.len(), 2);

        assert!(obs[0].has_result);
        assert_eq!(obs[0].uom, None);
        assert_eq!(obs[0].value, Some(3.5));
        assert_eq!(obs[0].result_time, Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()));

        assert_eq!(obs[1].uom.as_deref(), Some("m"));
        assert_eq!(obs[1].value, None);
    }

    #[test]
    fn empty_response_has_no_observations() {
        let obs = parse_observations(fixtures::empty_observations_xml()).unwrap();
        assert!(obs.is_empty());
    }

    #[test]
    fn exception_report_carries_body() {
        let err = parse_observations(fixtures::exception_report_xml()).unwrap_err();
        match err {
            SosError::Query { message, body } => {
                assert!(message.contains("observedProperty"));
                assert!(matches!(body, ResponseBody::Raw(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_and_empty_bodies_fail() {
        let err = parse_observations("<html><body>Bad gateway</body></html>").unwrap_err();
        assert!(err.to_string().contains("<html>"));

        let err = parse_observations("").unwrap_err();
        assert_eq!(err.response_body(), Some(&ResponseBody::Empty));

        let err = parse_observations("<sos:GetObservationResponse>").unwrap_err();
        assert!(matches!(err, SosError::Query { .. }));
    }
}
