//! Aggregated heatmap view

use dv_core::{
    build_filters, Channel, CrossFilterPolicy, Result, SelectionRegistry, ViewRole,
};

use super::{filter_transforms, Frame, View};
use crate::encoding::{AggregateChannel, EncodingChannel, EncodingResolver};
use crate::spec::{ColorDef, DataSource, Encoding, MarkDef, MarkKind, UnitSpec, ViewNode};

/// Configuration for the heatmap view
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapConfig {
    pub frame: Frame,
}

/// Binned axes plus the aggregate cell color
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapEncodings {
    pub x: EncodingChannel,
    pub y: EncodingChannel,
    pub color: AggregateChannel,
}

impl HeatmapEncodings {
    pub fn resolve(resolver: &EncodingResolver<'_>) -> Result<Self> {
        let config = resolver.config();
        Ok(Self {
            x: resolver.resolve_channel(&config.heatmap_x, Channel::X)?,
            y: resolver.resolve_channel(&config.heatmap_y, Channel::Y)?,
            color: resolver.resolve_aggregate(&config.heatmap_aggregate)?,
        })
    }
}

pub struct HeatmapView;

impl HeatmapView {
    /// The heatmap declares no selection, so nothing it shows is ever grey
    pub fn build(
        encodings: &HeatmapEncodings,
        registry: &SelectionRegistry,
        policy: &CrossFilterPolicy,
        config: &HeatmapConfig,
    ) -> View {
        let role = ViewRole::Heatmap;
        let filter = build_filters(registry, &role, policy);

        let unit = UnitSpec {
            name: Some("heatmap".to_string()),
            data: Some(DataSource::events()),
            encoding: Some(Encoding {
                x: Some(encodings.x.to_field_def()),
                y: Some(encodings.y.to_field_def()),
                color: Some(ColorDef::Field(encodings.color.to_field_def())),
                ..Encoding::default()
            }),
            transform: filter_transforms(&filter),
            width: Some(config.frame.width),
            height: Some(config.frame.height),
            ..UnitSpec::new(MarkDef::new(MarkKind::Rect))
        };

        tracing::debug!(
            "Built heatmap {} x {}, filtered by {:?}",
            encodings.x.field,
            encodings.y.field,
            filter.referenced_selections()
        );

        View {
            role,
            filter,
            highlight: None,
            params: Vec::new(),
            node: ViewNode::Unit(unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::events;
    use dv_core::{Configuration, GeoBrushMode, Predicate};
    use serde_json::json;

    fn build(config: &Configuration, filter_fields: &[&str]) -> View {
        let dataset = events(&[5.0, 6.2]);
        let fields: Vec<String> = filter_fields.iter().map(|f| f.to_string()).collect();
        let mut registry = SelectionRegistry::new();
        registry.register(&fields).unwrap();
        registry.register_geo_brush().unwrap();

        let resolver = EncodingResolver::new(&dataset, config);
        let encodings = HeatmapEncodings::resolve(&resolver).unwrap();
        let heatmap_config = HeatmapConfig {
            frame: Frame::new(480.0, 640.0),
        };
        HeatmapView::build(&encodings, &registry, &config.cross_filter, &heatmap_config)
    }

    #[test]
    fn test_filtered_by_every_selection() {
        let config = Configuration::default();
        let view = build(&config, &["mag"]);

        assert!(view.params.is_empty());
        assert_eq!(view.highlight, None);
        assert_eq!(view.filter, Predicate::all(["mag_brush", "brush"]));
    }

    #[test]
    fn test_geo_brush_can_be_ignored() {
        let mut config = Configuration::default();
        config.cross_filter.heatmap_geo_brush = GeoBrushMode::Ignore;
        let view = build(&config, &["mag"]);
        assert_eq!(view.filter, Predicate::all(["mag_brush"]));
    }

    #[test]
    fn test_time_by_depth_encoding() {
        let config = Configuration::default();
        let value = serde_json::to_value(&build(&config, &["mag"]).node).unwrap();

        assert_eq!(value["mark"], json!({"type": "rect"}));
        assert_eq!(
            value["encoding"]["x"],
            json!({"field": "time", "type": "temporal", "timeUnit": "year"})
        );
        assert_eq!(value["encoding"]["y"]["scale"], json!({"reverse": true}));
        assert_eq!(value["encoding"]["y"]["bin"], json!({"maxbins": 30}));
        assert_eq!(value["encoding"]["color"]["aggregate"], json!("max"));
        assert_eq!(
            value["transform"],
            json!([{"filter": {"and": [{"param": "mag_brush"}, {"param": "brush"}]}}])
        );
    }
}
