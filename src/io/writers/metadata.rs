use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::info;

use crate::error::{Error, Result};
use crate::io::directory::AttributeDirectory;
use crate::io::header::{AttributeValue, Header};

/// `tEXt` keyword holding the capture header.
pub const HEADER_KEYWORD: &str = "polar_header";

/// `tEXt` keyword holding the header as JSON `{ NAME: { value, description } }`, as read by
/// image inspectors of WAMOS captures.
pub const JSON_KEYWORD: &str = "json_data";

/// Serialize the header as `NAME=value` lines in header order.
pub fn header_to_text(header: &Header) -> String {
    header
        .iter()
        .map(|a| format!("{}={}", a.name, a.raw))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rebuild a header from `NAME=value` lines; descriptions come from `directory`.
pub fn header_from_text(text: &str, directory: &AttributeDirectory) -> Result<Header> {
    let mut pairs = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once('=').ok_or_else(|| {
            Error::Encoding(format!(
                "embedded header line {} has no '=': {:?}",
                lineno + 1,
                line
            ))
        })?;
        pairs.push((name, value));
    }
    Ok(Header::from_pairs(pairs, directory))
}

/// Text chunks written alongside the image: header as text and JSON, software and
/// creation time.
pub fn png_text_entries(header: &Header) -> Result<Vec<(&'static str, String)>> {
    Ok(vec![
        (HEADER_KEYWORD, header_to_text(header)),
        (
            JSON_KEYWORD,
            serde_json::to_string_pretty(&header_to_json(header))?,
        ),
        (
            "Software",
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        ),
        ("Creation Time", chrono::Utc::now().to_rfc3339()),
    ])
}

fn json_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Integer(i) => json!(i),
        AttributeValue::Float(f) => json!(f),
        AttributeValue::Text(s) => json!(s),
    }
}

/// Header as a JSON object `{ NAME: { value, description } }`, keys in header order.
pub fn header_to_json(header: &Header) -> Value {
    let mut object = Map::new();
    for attribute in header.iter() {
        object.insert(
            attribute.name.clone(),
            json!({
                "value": json_value(&attribute.value),
                "description": attribute.description,
            }),
        );
    }
    Value::Object(object)
}

/// Rebuild a header from a `json_data` object. Entries may be `{ value, description }`
/// objects or bare values; descriptions come from `directory`.
pub fn header_from_json(text: &str, directory: &AttributeDirectory) -> Result<Header> {
    let parsed: Value = serde_json::from_str(text)?;
    let object = parsed
        .as_object()
        .ok_or_else(|| Error::Encoding(format!("{} is not a JSON object", JSON_KEYWORD)))?;
    let pairs: Vec<(&str, String)> = object
        .iter()
        .map(|(name, entry)| {
            let raw = match entry.get("value").unwrap_or(entry) {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.as_str(), raw)
        })
        .collect();
    Ok(Header::from_pairs(pairs, directory))
}

/// Write a JSON sidecar next to `output_path` and return its path.
pub fn create_metadata_sidecar(output_path: &Path, header: &Header) -> Result<PathBuf> {
    let sidecar_path = output_path.with_extension("json");
    let json_string = serde_json::to_string_pretty(&header_to_json(header))?;
    std::fs::write(&sidecar_path, json_string)?;
    info!("Created metadata sidecar: {:?}", sidecar_path);
    Ok(sidecar_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header::from_pairs(
            [
                ("NRAYS", "8"),
                ("OWNER", "Hydro Lab"),
                ("LAT", "54.1"),
                ("EXPR", "a=b"),
            ],
            AttributeDirectory::builtin(),
        )
    }

    #[test]
    fn text_round_trip_preserves_order_and_values() {
        let header = sample_header();
        let text = header_to_text(&header);
        assert_eq!(text, "NRAYS=8\nOWNER=Hydro Lab\nLAT=54.1\nEXPR=a=b");
        let back = header_from_text(&text, AttributeDirectory::builtin()).unwrap();
        assert_eq!(back, header);
    }

    #[test]
    fn text_without_separator_is_rejected() {
        assert!(header_from_text("NRAYS=8\nbroken", AttributeDirectory::builtin()).is_err());
    }

    #[test]
    fn json_keeps_types_and_order() {
        let value = header_to_json(&sample_header());
        let object = value.as_object().unwrap();
        assert_eq!(object["NRAYS"]["value"], json!(8));
        assert_eq!(object["LAT"]["value"], json!(54.1));
        assert_eq!(object["OWNER"]["description"], json!("Owner of the radar installation"));
        assert_eq!(object["EXPR"]["description"], json!(""));
    }

    #[test]
    fn text_entries_carry_header_as_text_and_json() {
        let entries = png_text_entries(&sample_header()).unwrap();
        let keywords: Vec<_> = entries.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keywords,
            [HEADER_KEYWORD, JSON_KEYWORD, "Software", "Creation Time"]
        );
        let json: Value = serde_json::from_str(&entries[1].1).unwrap();
        assert_eq!(json, header_to_json(&sample_header()));
    }

    #[test]
    fn json_header_accepts_value_objects_and_bare_values() {
        let header = header_from_json(
            r#"{
                "NRAYS": { "value": 8, "description": "N/A" },
                "OWNER": { "value": "Hydro Lab", "description": "Owner" },
                "LAT": 54.1,
                "TOWER": "FINO"
            }"#,
            AttributeDirectory::builtin(),
        )
        .unwrap();
        let names: Vec<_> = header.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["NRAYS", "OWNER", "LAT", "TOWER"]);
        assert_eq!(header.value("NRAYS"), Some(&AttributeValue::Integer(8)));
        assert_eq!(header.get("OWNER").unwrap().raw, "Hydro Lab");
        assert_eq!(header.number("LAT"), Some(54.1));
        assert_eq!(header.describe("OWNER"), Some("Owner of the radar installation"));

        assert!(header_from_json("[1, 2]", AttributeDirectory::builtin()).is_err());
    }

    #[test]
    fn sidecar_is_written_next_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_metadata_sidecar(&dir.path().join("scan.png"), &sample_header()).unwrap();
        assert_eq!(path, dir.path().join("scan.json"));
        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed["OWNER"]["value"], json!("Hydro Lab"));
    }
}
