//! Explicit application state for the forecast display.
//!
//! Selections and fetch results go through [`AppState`]; the terminal views
//! only read it. Every selection bumps a generation so results of older
//! selections can be recognised and dropped.

use std::collections::BTreeSet;

use jma_weather::{Forecast, ForecastRow, Office, RegionIndex};

/// Outcome of applying a fetch result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Rows and title replaced
    Updated,
    /// Result belongs to an older selection and was discarded
    Stale,
    /// Fetch failed; the display stays cleared
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    index: RegionIndex,
    selected: Option<String>,
    title: String,
    rows: Vec<ForecastRow>,
    expanded: BTreeSet<String>,
    generation: u64,
    loading: bool,
}

impl AppState {
    pub fn new(index: RegionIndex) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Publishing office label of the displayed forecast
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_expanded(&self, region_code: &str) -> bool {
        self.expanded.contains(region_code)
    }

    /// Office shown at launch: first office of the first non-empty region
    pub fn startup_office(&self) -> Option<&Office> {
        self.index.first_office()
    }

    /// Record a new selection and clear the display.
    ///
    /// The code is not checked against the index. Returns the generation the
    /// matching fetch result must carry to be applied.
    pub fn select_office(&mut self, office_code: &str) -> u64 {
        if self.index.find_office(office_code).is_none() {
            tracing::debug!(office = office_code, "Selected office is not in the index");
        }

        self.generation += 1;
        self.selected = Some(office_code.to_string());
        self.rows.clear();
        self.title.clear();
        self.loading = true;
        self.generation
    }

    /// Apply a fetch result for the selection identified by `generation`.
    pub fn apply<E: std::fmt::Display>(
        &mut self,
        generation: u64,
        result: Result<Forecast, E>,
    ) -> Applied {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Discarding stale forecast result"
            );
            return Applied::Stale;
        }

        self.loading = false;
        match result {
            Ok(forecast) => {
                self.title = forecast.publishing_office;
                self.rows = forecast.rows;
                Applied::Updated
            }
            Err(e) => {
                tracing::error!(
                    office = ?self.selected,
                    "Failed to load forecast: {}",
                    e
                );
                Applied::Failed
            }
        }
    }

    /// Expand or collapse a region in the navigation.
    /// Returns false when the code is not a known region.
    pub fn toggle_region(&mut self, region_code: &str) -> bool {
        if self.index.get(region_code).is_none() {
            return false;
        }
        if !self.expanded.remove(region_code) {
            self.expanded.insert(region_code.to_string());
        }
        true
    }
}
