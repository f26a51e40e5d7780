//! Policy knobs for cross-filtering, layout and scale domains

use serde::{Deserialize, Serialize};

use crate::field::Channel;

/// How the map applies the field brushes of the histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MapFilterMode {
    /// Points outside any field brush are removed from the scene
    #[default]
    Filter,
    /// Points outside any field brush stay on the map but are drawn grey
    Dim,
}

/// Whether an aggregated view is filtered by the map's geo-brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeoBrushMode {
    Filter,
    Ignore,
}

/// Per-view cross-filter policy.
///
/// The map always dims by its own geo-brush; what it does with the field
/// brushes, and which aggregated views honour the geo-brush, is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrossFilterPolicy {
    pub map: MapFilterMode,
    pub histogram_geo_brush: GeoBrushMode,
    pub heatmap_geo_brush: GeoBrushMode,
}

impl Default for CrossFilterPolicy {
    fn default() -> Self {
        Self {
            map: MapFilterMode::Filter,
            histogram_geo_brush: GeoBrushMode::Ignore,
            heatmap_geo_brush: GeoBrushMode::Filter,
        }
    }
}

/// Where scale domains come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainPolicy {
    /// Domains are pinned by `fixedDomains`; unpinned fields are recomputed
    Fixed,
    /// Domains are scanned from the dataset on every composition
    #[default]
    Recomputed,
}

/// Placement of the histogram stack relative to the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistogramPlacement {
    #[default]
    Below,
    Beside,
}

/// Channels whose scales and legends are resolved independently per view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolvePolicy {
    pub independent: Vec<Channel>,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self {
            independent: vec![Channel::Color],
        }
    }
}

/// Layout options for the composite document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub histograms: HistogramPlacement,

    /// Share of the total width given to the map
    pub map_width_fraction: f64,

    /// Share of the total height given to the map
    pub map_height_fraction: f64,

    pub resolve: ResolvePolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            histograms: HistogramPlacement::Below,
            map_width_fraction: 0.6,
            map_height_fraction: 0.8,
            resolve: ResolvePolicy::default(),
        }
    }
}
