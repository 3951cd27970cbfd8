//! Small helpers shared by the capabilities and observation decoders.
//!
//! Servers disagree on namespace prefixes (`gml:`, `gml32:`, default
//! namespaces...), so everything here matches on local names only.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesEnd, BytesStart, Event};

pub(crate) fn start_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

pub(crate) fn end_name(e: &BytesEnd) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Value of the attribute with the given local name (`xlink:href` → `href`).
pub(crate) fn attribute(e: &BytesStart, local: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// True when `path` ends with the given element names.
pub(crate) fn path_ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..].iter().zip(suffix).all(|(a, b)| a == b)
}

pub(crate) fn path_contains(path: &[String], name: &str) -> bool {
    path.iter().any(|p| p == name)
}

/// Parent of the element currently being closed (last entry is the element itself).
pub(crate) fn parent(path: &[String]) -> Option<&str> {
    path.len().checked_sub(2).map(|i| path[i].as_str())
}

/// Parse the time stamps seen in SOS responses. Values without an offset are taken as UTC.
pub(crate) fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Some(ndt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Parse a `gml:lowerCorner` / `gml:upperCorner` pair of coordinates.
pub(crate) fn parse_corner(s: &str) -> Option<[f64; 2]> {
    let mut parts = s.split_whitespace().map(str::parse::<f64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(a)), Some(Ok(b)), None) => Some([a, b]),
        _ => None,
    }
}

/// If the document is an OWS `ExceptionReport`, return a readable summary of it.
pub(crate) fn exception_report(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut is_report = false;
    let mut in_text = false;
    let mut codes: Vec<String> = Vec::new();
    let mut texts: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = start_name(&e);
                if !is_report {
                    if name != "ExceptionReport" {
                        return None;
                    }
                    is_report = true;
                } else if name == "Exception" {
                    if let Some(code) = attribute(&e, "exceptionCode") {
                        codes.push(code);
                    }
                } else if name == "ExceptionText" {
                    in_text = true;
                }
            }
            Ok(Event::Empty(e)) => {
                let name = start_name(&e);
                if !is_report {
                    return (name == "ExceptionReport").then(|| "ExceptionReport".to_string());
                }
                if name == "Exception" {
                    if let Some(code) = attribute(&e, "exceptionCode") {
                        codes.push(code);
                    }
                }
            }
            Ok(Event::Text(t)) if in_text => {
                if let Ok(text) = t.unescape() {
                    texts.push(text.trim().to_string());
                }
            }
            Ok(Event::End(e)) if end_name(&e) == "ExceptionText" => in_text = false,
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    if !is_report {
        return None;
    }

    let mut summary = codes.join(", ");
    if !texts.is_empty() {
        if !summary.is_empty() {
            summary.push_str(": ");
        }
        summary.push_str(&texts.join("; "));
    }
    if summary.is_empty() {
        summary.push_str("ExceptionReport");
    }
    Some(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_time_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_time("2024-05-01T12:00:00Z"), Some(expected));
        assert_eq!(parse_time("2024-05-01T14:00:00.000+02:00"), Some(expected));
        assert_eq!(parse_time("2024-05-01T12:00:00"), Some(expected));
        assert_eq!(parse_time(" 2024-05-01T12:00 "), Some(expected));
        assert_eq!(
            parse_time("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_time("yesterday"), None);
    }

    #[test]
    fn parses_corners() {
        assert_eq!(parse_corner("43.5 5.25"), Some([43.5, 5.25]));
        assert_eq!(parse_corner("  1e2\n-3 "), Some([100.0, -3.0]));
        assert_eq!(parse_corner("1 2 3"), None);
        assert_eq!(parse_corner("1"), None);
        assert_eq!(parse_corner("a b"), None);
    }

    #[test]
    fn path_helpers() {
        let path: Vec<String> = ["Capabilities", "ServiceIdentification", "Title"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(path_ends_with(&path, &["ServiceIdentification", "Title"]));
        assert!(!path_ends_with(&path, &["ServiceProvider", "Title"]));
        assert!(path_contains(&path, "Capabilities"));
        assert_eq!(parent(&path), Some("ServiceIdentification"));
        assert_eq!(parent(&path[..1]), None);
    }

    #[test]
    fn summarises_exception_reports() {
        let xml = r#"<?xml version="1.0"?>
            <ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1" version="2.0.0">
              <ows:Exception exceptionCode="InvalidParameterValue" locator="offering">
                <ows:ExceptionText>The value 'foo' of the parameter 'offering' is invalid</ows:ExceptionText>
              </ows:Exception>
            </ows:ExceptionReport>"#;
        assert_eq!(
            exception_report(xml).as_deref(),
            Some("InvalidParameterValue: The value 'foo' of the parameter 'offering' is invalid")
        );
        assert_eq!(exception_report("<sos:Capabilities/>"), None);
        assert_eq!(exception_report("not xml at all"), None);
    }
}
