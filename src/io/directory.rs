//! Attribute directory: the read-only table of header attribute descriptions.
//!
//! The built-in table covers the WAMOS II header vocabulary and is initialised once
//! per process. A replacement table can be loaded from JSON for other capture
//! variants; both are immutable after construction.
use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Display grouping of header attributes.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeCategory {
    General,
    Location,
    Technical,
    Environmental,
    Layout,
    #[default]
    Additional,
}

impl AttributeCategory {
    pub const ALL: [AttributeCategory; 6] = [
        AttributeCategory::General,
        AttributeCategory::Location,
        AttributeCategory::Technical,
        AttributeCategory::Environmental,
        AttributeCategory::Layout,
        AttributeCategory::Additional,
    ];
}

impl std::fmt::Display for AttributeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttributeCategory::General => "General",
            AttributeCategory::Location => "Location",
            AttributeCategory::Technical => "Technical",
            AttributeCategory::Environmental => "Environmental",
            AttributeCategory::Layout => "Layout",
            AttributeCategory::Additional => "Additional",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeInfo {
    pub description: String,
    #[serde(default)]
    pub category: AttributeCategory,
}

/// JSON entries may be a bare description or a full `AttributeInfo`.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonEntry {
    Description(String),
    Info(AttributeInfo),
}

const BUILTIN: &[(&str, AttributeCategory, &str)] = &[
    ("OWNER", AttributeCategory::General, "Owner of the radar installation"),
    ("VINFO", AttributeCategory::General, "Version information of the acquisition software"),
    ("VERSN", AttributeCategory::General, "File format version"),
    ("TOWER", AttributeCategory::General, "Name of the radar station or platform"),
    ("IDENT", AttributeCategory::General, "Station identifier"),
    ("USER", AttributeCategory::General, "Operator or user name"),
    ("DATE", AttributeCategory::General, "Acquisition date"),
    ("TIME", AttributeCategory::General, "Acquisition time"),
    ("ZONE", AttributeCategory::General, "Time zone of date and time"),
    ("LAT", AttributeCategory::Location, "Latitude of the antenna position"),
    ("LONG", AttributeCategory::Location, "Longitude of the antenna position"),
    ("TMINT", AttributeCategory::Technical, "Time interval between image acquisitions"),
    ("NMEAN", AttributeCategory::Technical, "Number of images averaged"),
    ("ANALM", AttributeCategory::Technical, "Analysis mode"),
    ("AMINT", AttributeCategory::Technical, "Analysis interval"),
    ("NIPOL", AttributeCategory::Technical, "Number of images per polar sequence"),
    ("NUMRE", AttributeCategory::Technical, "Number of repetitions"),
    ("RPT", AttributeCategory::Technical, "Antenna repetition time"),
    ("SDRNG", AttributeCategory::Technical, "Sampling delay range in metres"),
    ("SFREQ", AttributeCategory::Technical, "Sampling frequency in MHz"),
    ("FIFO", AttributeCategory::Technical, "Number of range samples per ray"),
    ("BO2RA", AttributeCategory::Technical, "Bow to radar angle"),
    ("HDGDL", AttributeCategory::Technical, "Heading delay"),
    ("GYROC", AttributeCategory::Technical, "Gyro compass correction"),
    ("GYROV", AttributeCategory::Technical, "Gyro compass value"),
    ("VGAIN", AttributeCategory::Technical, "Video gain"),
    ("CMPOFF", AttributeCategory::Technical, "Compass offset"),
    ("WDEPF", AttributeCategory::Environmental, "Water depth flag"),
    ("P_DEP", AttributeCategory::Environmental, "Water depth"),
    ("PDEPV", AttributeCategory::Environmental, "Water depth validity"),
    ("SHIPR", AttributeCategory::Environmental, "Ship heading"),
    ("SHIRV", AttributeCategory::Environmental, "Ship heading validity"),
    ("SHIPS", AttributeCategory::Environmental, "Ship speed"),
    ("SHISV", AttributeCategory::Environmental, "Ship speed validity"),
    ("SPTWL", AttributeCategory::Environmental, "Sea water level"),
    ("SPWLV", AttributeCategory::Environmental, "Sea water level validity"),
    ("SPTWT", AttributeCategory::Environmental, "Sea water temperature"),
    ("SPWTV", AttributeCategory::Environmental, "Sea water temperature validity"),
    ("WINDS", AttributeCategory::Environmental, "Wind speed"),
    ("WINSV", AttributeCategory::Environmental, "Wind speed validity"),
    ("WINDR", AttributeCategory::Environmental, "Wind direction"),
    ("WINRV", AttributeCategory::Environmental, "Wind direction validity"),
    ("WINDT", AttributeCategory::Environmental, "Wind sensor type"),
    ("WINDH", AttributeCategory::Environmental, "Wind sensor height"),
    ("WATSP", AttributeCategory::Environmental, "Water current speed"),
    ("WATSV", AttributeCategory::Environmental, "Water current speed validity"),
    ("NRAYS", AttributeCategory::Layout, "Number of rays (azimuth samples) per image"),
    ("BYTEO", AttributeCategory::Layout, "Byte order of 16-bit samples"),
    ("RGRES", AttributeCategory::Layout, "Range resolution in metres per range sample"),
    ("DABIT", AttributeCategory::Additional, "Number of bits per sample"),
    ("F0001", AttributeCategory::Additional, "Reserved field"),
    ("RPM", AttributeCategory::Additional, "Antenna rotations per minute"),
    ("EOH", AttributeCategory::Additional, "End of header character position"),
];

static BUILTIN_DIRECTORY: Lazy<AttributeDirectory> = Lazy::new(|| {
    let entries = BUILTIN
        .iter()
        .map(|&(name, category, description)| {
            (
                name.to_string(),
                AttributeInfo {
                    description: description.to_string(),
                    category,
                },
            )
        })
        .collect();
    AttributeDirectory { entries }
});

/// Canonical attribute key: trimmed, ASCII letters upper-cased.
///
/// Other Latin-1 characters are kept as they are so keys stay encodable in `tEXt`.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeDirectory {
    entries: HashMap<String, AttributeInfo>,
}

impl AttributeDirectory {
    /// The built-in WAMOS II table.
    pub fn builtin() -> &'static AttributeDirectory {
        &BUILTIN_DIRECTORY
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: HashMap<String, JsonEntry> = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .map(|(name, entry)| {
                let info = match entry {
                    JsonEntry::Description(description) => AttributeInfo {
                        description,
                        category: AttributeCategory::Additional,
                    },
                    JsonEntry::Info(info) => info,
                };
                (canonical_name(&name), info)
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let directory = Self::from_json_str(&text)?;
        info!("Loaded {} attribute descriptions from {:?}", directory.len(), path);
        Ok(directory)
    }

    pub fn lookup(&self, name: &str) -> Option<&AttributeInfo> {
        self.entries.get(&canonical_name(name))
    }

    /// Description text, empty when the attribute is unknown.
    pub fn describe(&self, name: &str) -> &str {
        self.lookup(name).map(|i| i.description.as_str()).unwrap_or("")
    }

    pub fn category(&self, name: &str) -> AttributeCategory {
        self.lookup(name).map(|i| i.category).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
