//! GetCapabilities decoding.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};

use crate::{
    error::SosError,
    model::{Capabilities, Envelope, Offering},
    xml::{
        attribute, exception_report, parent, parse_corner, parse_time, path_contains,
        path_ends_with, start_name,
    },
};

/// Decode an SOS 2.0 capabilities document.
pub fn parse_capabilities(xml: &str) -> Result<Capabilities, SosError> {
    if let Some(report) = exception_report(xml) {
        return Err(SosError::capabilities(format!("server returned an exception: {report}"), xml));
    }

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut builder = CapabilitiesBuilder::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = start_name(&e);
                builder.open(&path, &name, &e);
                path.push(name);
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                let name = start_name(&e);
                builder.open(&path, &name, &e);
                path.push(name);
                builder.close(&path, "");
                path.pop();
            }
            Ok(Event::Text(t)) => {
                let unescaped = t.unescape().map_err(|err| {
                    SosError::capabilities(format!("invalid text content: {err}"), xml)
                })?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(&c)),
            Ok(Event::End(_)) => {
                builder.close(&path, text.trim());
                path.pop();
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(SosError::capabilities(
                    format!("malformed XML at byte {}: {err}", reader.buffer_position()),
                    xml,
                ));
            }
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(SosError::capabilities(format!("document ends inside <{open}>"), xml));
    }

    match builder.root.as_deref() {
        Some("Capabilities") => {}
        Some(other) => {
            return Err(SosError::capabilities(
                format!("expected a Capabilities document, got <{other}>"),
                xml,
            ));
        }
        None => return Err(SosError::capabilities("document has no root element", xml)),
    }

    debug!(offerings = builder.caps.offerings.len(), "decoded capabilities");
    Ok(builder.caps)
}

#[derive(Default)]
struct CapabilitiesBuilder {
    root: Option<String>,
    caps: Capabilities,
    offering: Option<Offering>,
    srs_name: Option<String>,
    lower_corner: Option<[f64; 2]>,
    upper_corner: Option<[f64; 2]>,
}

impl CapabilitiesBuilder {
    fn open(&mut self, path: &[String], name: &str, e: &BytesStart) {
        if self.root.is_none() {
            self.root = Some(name.to_string());
        }

        match name {
            "ObservationOffering" => {
                self.offering = Some(Offering::default());
                self.srs_name = None;
                self.lower_corner = None;
                self.upper_corner = None;
            }
            "Envelope" if self.offering.is_some() && path_contains(path, "observedArea") => {
                self.srs_name = attribute(e, "srsName");
            }
            "ProviderSite" if path_contains(path, "ServiceProvider") => {
                if let Some(href) = attribute(e, "href") {
                    self.caps.provider.url = href;
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, path: &[String], text: &str) {
        if let Some(offering) = self.offering.as_mut() {
            let in_offering = parent(path) == Some("ObservationOffering");

            match path.last().map(String::as_str) {
                Some("identifier") if in_offering => offering.id = text.to_string(),
                Some("name") if in_offering => offering.name = non_empty(text),
                Some("procedure") if in_offering => {
                    if offering.procedure.is_none() {
                        offering.procedure = non_empty(text);
                    }
                }
                Some("observableProperty") if in_offering && !text.is_empty() => {
                    offering.observed_properties.push(text.to_string());
                }
                Some("lowerCorner") if path_contains(path, "observedArea") => {
                    self.lower_corner = parse_corner(text);
                }
                Some("upperCorner") if path_contains(path, "observedArea") => {
                    self.upper_corner = parse_corner(text);
                }
                Some("beginPosition") if path_contains(path, "phenomenonTime") => {
                    offering.begin_position = parse_time(text);
                }
                Some("endPosition") if path_contains(path, "phenomenonTime") => {
                    offering.end_position = parse_time(text);
                }
                Some("ObservationOffering") => self.finish_offering(),
                _ => {}
            }
            return;
        }

        let caps = &mut self.caps;
        if path_ends_with(path, &["ServiceIdentification", "Title"]) {
            caps.identification.title = text.to_string();
        } else if path_ends_with(path, &["ServiceIdentification", "Abstract"]) {
            caps.identification.abstract_text = text.to_string();
        } else if path_contains(path, "ServiceProvider") {
            let contact = &mut caps.provider.contact;
            if path_ends_with(path, &["ServiceProvider", "ProviderName"]) {
                caps.provider.name = text.to_string();
            } else if path_ends_with(path, &["Phone", "Voice"]) {
                set_once(&mut contact.phone, text);
            } else if path_ends_with(path, &["Address", "DeliveryPoint"]) {
                set_once(&mut contact.address, text);
            } else if path_ends_with(path, &["Address", "City"]) {
                contact.city = text.to_string();
            } else if path_ends_with(path, &["Address", "AdministrativeArea"]) {
                contact.region = text.to_string();
            } else if path_ends_with(path, &["Address", "PostalCode"]) {
                contact.postcode = text.to_string();
            } else if path_ends_with(path, &["Address", "Country"]) {
                contact.country = text.to_string();
            } else if path_ends_with(path, &["Address", "ElectronicMailAddress"]) {
                set_once(&mut contact.email, text);
            }
        }
    }

    fn finish_offering(&mut self) {
        let Some(mut offering) = self.offering.take() else {
            return;
        };

        offering.observed_area = match (self.lower_corner.take(), self.upper_corner.take()) {
            (Some(lower_corner), Some(upper_corner)) => Some(Envelope {
                lower_corner,
                upper_corner,
                srs_name: self.srs_name.take(),
            }),
            (None, None) => None,
            _ => {
                warn!(offering = %offering.id, "observed area has only one usable corner, ignoring it");
                None
            }
        };

        if offering.id.is_empty() {
            warn!("skipping offering without identifier");
            return;
        }

        self.caps.offerings.push(offering);
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn set_once(field: &mut String, text: &str) {
    if field.is_empty() {
        *field = text.to_string();
    }
}
