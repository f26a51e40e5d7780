//! Composition engine
//!
//! One call turns a validated dataset and a configuration into a complete
//! composite. The call is atomic: configuration checks, selection
//! registration and every encoding resolution happen before the first view
//! is built, so a failure leaves nothing half-made.

use dv_core::{Configuration, Result, SelectionId, SelectionRegistry};
use dv_data::{Dataset, DomainCache};
use indexmap::IndexMap;

use crate::encoding::EncodingResolver;
use crate::layout::{compose, CompositeSpec, LayoutPlan};
use crate::plots::{
    HeatmapConfig, HeatmapEncodings, HeatmapView, HistogramConfig, HistogramView, MapConfig,
    MapEncodings, MapView,
};
use crate::spec::EVENTS_DATASET;

/// Result of one composition call
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub spec: CompositeSpec,
    /// Selection name to id, for hosts observing brush changes
    pub selections: IndexMap<String, SelectionId>,
}

/// Builds composites, optionally sharing a domain cache across calls
#[derive(Clone, Default)]
pub struct CompositionEngine {
    cache: Option<DomainCache>,
}

impl CompositionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: DomainCache) -> Self {
        Self { cache: Some(cache) }
    }

    pub fn compose(&self, dataset: &Dataset, config: &Configuration) -> Result<Composition> {
        config.validate(dataset)?;

        let mut registry = SelectionRegistry::new();
        registry.register(&config.filter_fields)?;
        registry.register_geo_brush()?;

        let mut resolver = EncodingResolver::new(dataset, config);
        if let Some(cache) = &self.cache {
            resolver = resolver.with_cache(cache);
        }

        let map_encodings = MapEncodings::resolve(&resolver)?;
        let histogram_encodings = config
            .filter_fields
            .iter()
            .map(|field| HistogramView::resolve(&resolver, field))
            .collect::<Result<Vec<_>>>()?;
        let heatmap_encodings = HeatmapEncodings::resolve(&resolver)?;

        let plan = LayoutPlan::new(config, histogram_encodings.len());
        let policy = &config.cross_filter;
        let histogram_config = HistogramConfig::from_configuration(config, plan.histogram);

        let mut views = Vec::with_capacity(histogram_encodings.len() + 2);
        views.push(MapView::build(
            &map_encodings,
            &registry,
            policy,
            &MapConfig::from_configuration(config, plan.map),
        ));
        views.extend(
            histogram_encodings
                .iter()
                .map(|(x, color)| HistogramView::build(x, color, &registry, policy, &histogram_config)),
        );
        views.push(HeatmapView::build(
            &heatmap_encodings,
            &registry,
            policy,
            &HeatmapConfig { frame: plan.heatmap },
        ));

        let spec = compose(views, &config.layout)
            .with_background(config.background.as_str())
            .with_dataset(EVENTS_DATASET, dataset.records());

        tracing::info!(
            "Composed {} views over {} rows with {} selections",
            spec.views.len(),
            dataset.len(),
            registry.len()
        );

        Ok(Composition {
            spec,
            selections: registry.ids(),
        })
    }
}
