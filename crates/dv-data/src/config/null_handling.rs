//! Missing-value markers in event feeds
//!
//! Catalog exports leave a reading out in several ways. A cell matching one
//! of the markers counts as absent, so validation fails on the field it sits in.

use serde::{Deserialize, Serialize};

/// Cell texts read as a missing value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullConfig {
    pub markers: Vec<String>,

    /// Compare markers ignoring ASCII case
    pub ignore_case: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            markers: ["", "-", "?", "N/A", "null", "None", "NaN"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            ignore_case: true,
        }
    }
}

impl NullConfig {
    /// Extra marker on top of the current set
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into().trim().to_string();
        if !self.markers.contains(&marker) {
            self.markers.push(marker);
        }
        self
    }

    /// Surrounding whitespace never matters
    pub fn is_null(&self, cell: &str) -> bool {
        let cell = cell.trim();
        self.markers.iter().any(|marker| {
            if self.ignore_case {
                cell.eq_ignore_ascii_case(marker)
            } else {
                cell == marker
            }
        })
    }
}
