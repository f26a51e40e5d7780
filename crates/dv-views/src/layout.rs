//! Composite layout
//!
//! Places the built views into nested concatenations and carries the
//! document-level settings: scale resolution, background and the inline
//! datasets.

use std::collections::BTreeMap;

use dv_core::{Channel, Configuration, HistogramPlacement, LayoutConfig, ResolvePolicy, ViewRole};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::plots::{Frame, View};
use crate::spec::ViewNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    Independent,
}

/// `resolve` block of the document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolveDef {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub scale: BTreeMap<Channel, ResolveMode>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub legend: BTreeMap<Channel, ResolveMode>,
}

impl ResolveDef {
    /// Scale and legend resolved independently for every listed channel
    pub fn from_policy(policy: &ResolvePolicy) -> Self {
        let independent: BTreeMap<_, _> = policy
            .independent
            .iter()
            .map(|channel| (*channel, ResolveMode::Independent))
            .collect();
        Self {
            scale: independent.clone(),
            legend: independent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scale.is_empty() && self.legend.is_empty()
    }
}

/// Pixel frames for every view role
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPlan {
    pub map: Frame,
    pub histogram: Frame,
    pub heatmap: Frame,
}

impl LayoutPlan {
    /// Split the overall size between the map, `histograms` filter views and
    /// the heatmap.
    pub fn new(config: &Configuration, histograms: usize) -> Self {
        let layout = &config.layout;
        let (width, height) = (config.width, config.height);
        let map_width = width * layout.map_width_fraction;
        let rows = histograms.max(1) as f64;

        match layout.histograms {
            HistogramPlacement::Below => {
                let map_height = height * layout.map_height_fraction;
                Self {
                    map: Frame::new(map_width, map_height),
                    histogram: Frame::new(width, (height - map_height) / rows),
                    heatmap: Frame::new(width - map_width, map_height),
                }
            }
            HistogramPlacement::Beside => {
                let rest = width - map_width;
                let column = if histograms == 0 { rest } else { rest / 2.0 };
                Self {
                    map: Frame::new(map_width, height),
                    histogram: Frame::new(column, height / rows),
                    heatmap: Frame::new(column, height),
                }
            }
        }
    }
}

/// The full composite: layout tree plus the views it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeSpec {
    /// Views in build order: map, histograms, heatmap
    pub views: Vec<View>,
    pub root: ViewNode,
    pub resolve: ResolveDef,
    pub background: Option<String>,
    pub datasets: IndexMap<String, Vec<Value>>,
}

impl CompositeSpec {
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Attach rows under `name` for views reading `{"name": name}`
    pub fn with_dataset(mut self, name: impl Into<String>, rows: Vec<Value>) -> Self {
        self.datasets.insert(name.into(), rows);
        self
    }

    pub fn view(&self, role: &ViewRole) -> Option<&View> {
        self.views.iter().find(|view| &view.role == role)
    }

    pub fn map(&self) -> Option<&View> {
        self.view(&ViewRole::Map)
    }

    pub fn heatmap(&self) -> Option<&View> {
        self.view(&ViewRole::Heatmap)
    }

    pub fn histograms(&self) -> impl Iterator<Item = &View> {
        self.views
            .iter()
            .filter(|view| matches!(view.role, ViewRole::Histogram(_)))
    }
}

/// Arrange `views` by role.
///
/// Below: map and heatmap side by side with the histograms stacked under
/// them. Beside: map, a column of histograms, then the heatmap.
pub fn compose(views: Vec<View>, layout: &LayoutConfig) -> CompositeSpec {
    let mut map = None;
    let mut heatmap = None;
    let mut histograms = Vec::new();
    for view in &views {
        match view.role {
            ViewRole::Map => map = Some(view.node.clone()),
            ViewRole::Heatmap => heatmap = Some(view.node.clone()),
            ViewRole::Histogram(_) => histograms.push(view.node.clone()),
        }
    }

    let root = match layout.histograms {
        HistogramPlacement::Below => {
            let top: Vec<ViewNode> = map.into_iter().chain(heatmap).collect();
            let mut rows = Vec::with_capacity(histograms.len() + 1);
            if !top.is_empty() {
                rows.push(ViewNode::hconcat(top));
            }
            rows.extend(histograms);
            ViewNode::vconcat(rows)
        }
        HistogramPlacement::Beside => {
            let mut columns: Vec<ViewNode> = map.into_iter().collect();
            if !histograms.is_empty() {
                columns.push(ViewNode::vconcat(histograms));
            }
            columns.extend(heatmap);
            ViewNode::hconcat(columns)
        }
    };

    tracing::debug!("Composed {} views ({:?})", views.len(), layout.histograms);

    CompositeSpec {
        views,
        root,
        resolve: ResolveDef::from_policy(&layout.resolve),
        background: None,
        datasets: IndexMap::new(),
    }
}
