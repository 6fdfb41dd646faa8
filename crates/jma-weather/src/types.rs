use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Area definition document (`area.json`).
///
/// `centers` and `offices` are JSON objects; their key order is the display
/// order, so they are read into ordered `(code, entry)` lists.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaDocument {
    #[serde(deserialize_with = "ordered_entries")]
    pub centers: Vec<(String, CenterEntry)>,
    #[serde(deserialize_with = "ordered_entries")]
    pub offices: Vec<(String, OfficeEntry)>,
}

/// A regional center in the area document
#[derive(Debug, Clone, Deserialize)]
pub struct CenterEntry {
    pub name: String,
    #[serde(rename = "enName", default)]
    pub en_name: Option<String>,
}

/// A forecast office in the area document
#[derive(Debug, Clone, Deserialize)]
pub struct OfficeEntry {
    pub name: String,
    #[serde(rename = "enName", default)]
    pub en_name: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

/// One edition of a per-office forecast document.
/// The document itself is a JSON array of editions, most current first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEdition {
    pub publishing_office: String,
    #[serde(default)]
    pub report_datetime: Option<String>,
    #[serde(default)]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub time_defines: Vec<String>,
    #[serde(default)]
    pub areas: Vec<SeriesArea>,
}

/// Per-area values of a time series, index-aligned with its `time_defines`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesArea {
    #[serde(default)]
    pub weathers: Vec<String>,
    #[serde(default)]
    pub temps_min: Vec<String>,
    #[serde(default)]
    pub temps_max: Vec<String>,
}

/// A forecast-issuing office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Office {
    pub code: String,
    pub name: String,
}

/// A top-level grouping of offices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub offices: Vec<Office>,
}

/// Regions keyed by code, in area document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionIndex {
    regions: Vec<Region>,
}

impl RegionIndex {
    pub(crate) fn from_regions(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, code: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.code == code)
    }

    pub(crate) fn get_mut(&mut self, code: &str) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.code == code)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Total number of offices across all regions
    pub fn office_count(&self) -> usize {
        self.regions.iter().map(|r| r.offices.len()).sum()
    }

    /// First office of the first region that has any
    pub fn first_office(&self) -> Option<&Office> {
        self.regions.iter().find_map(|r| r.offices.first())
    }

    /// Locate an office and the region it belongs to
    pub fn find_office(&self, code: &str) -> Option<(&Region, &Office)> {
        self.regions.iter().find_map(|region| {
            region
                .offices
                .iter()
                .find(|o| o.code == code)
                .map(|office| (region, office))
        })
    }
}

/// One displayed forecast line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Calendar date as `MM/DD`
    pub date: String,
    pub weather: String,
    /// Minimum temperature, or `"-"` when not published
    pub min_temp: String,
    /// Maximum temperature, or `"-"` when not published
    pub max_temp: String,
}

/// Rendered forecast for one office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub office_code: String,
    pub publishing_office: String,
    pub rows: Vec<ForecastRow>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unexpected document structure: {0}")]
    Document(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl WeatherError {
    /// True when the server answered 404, e.g. for an unknown office code
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Deserialize a JSON object into a list of entries, keeping key order.
fn ordered_entries<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct EntriesVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of code to entry")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((code, entry)) = map.next_entry::<String, T>()? {
                entries.push((code, entry));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}
