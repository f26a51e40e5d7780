//! Histogram filter views
//!
//! One binned bar chart per filterable field. Each owns the interval brush
//! for its field and colors bars inside the brush by the histogram color
//! field.

use dv_core::{
    build_filters, build_highlight, Channel, Configuration, CrossFilterPolicy, Result,
    SelectionRegistry, ViewRole,
};

use super::{filter_transforms, highlighted_color, param_def, Frame, View};
use crate::encoding::{EncodingChannel, EncodingResolver};
use crate::spec::{
    AxisDef, DataSource, Encoding, FieldDef, MarkDef, MarkKind, ScaleDef, ScaleType, UnitSpec,
    ViewNode,
};

/// Tick values on the log count axis
const LOG_TICKS: [f64; 3] = [10.0, 100.0, 1000.0];

/// Configuration for histogram views
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramConfig {
    /// Draw counts on a log scale
    pub log_count: bool,

    /// Bar color outside the brush
    pub unselected_color: String,

    pub frame: Frame,
}

impl HistogramConfig {
    pub fn from_configuration(config: &Configuration, frame: Frame) -> Self {
        Self {
            log_count: config.histogram_log_count,
            unselected_color: config.unselected_color.clone(),
            frame,
        }
    }
}

pub struct HistogramView;

impl HistogramView {
    /// Resolve `(x, color)` for the histogram over `field`
    pub fn resolve(
        resolver: &EncodingResolver<'_>,
        field: &str,
    ) -> Result<(EncodingChannel, EncodingChannel)> {
        let color_field = &resolver.config().histogram_color_field;
        Ok((
            resolver.resolve_channel(field, Channel::X)?,
            resolver.resolve_channel(color_field, Channel::Color)?,
        ))
    }

    pub fn build(
        x: &EncodingChannel,
        color: &EncodingChannel,
        registry: &SelectionRegistry,
        policy: &CrossFilterPolicy,
        config: &HistogramConfig,
    ) -> View {
        let role = ViewRole::Histogram(x.field.clone());
        let filter = build_filters(registry, &role, policy);
        let highlight = build_highlight(registry, &role, policy);
        let params: Vec<_> = registry.owned_by(&role).map(param_def).collect();

        let mut count = FieldDef::count().titled(x.field.as_str());
        if config.log_count {
            count.scale = Some(ScaleDef {
                kind: Some(ScaleType::Log),
                ..ScaleDef::default()
            });
            count.axis = Some(AxisDef {
                values: LOG_TICKS.to_vec(),
            });
        }

        let unit = UnitSpec {
            name: Some(format!("hist_{}", x.field)),
            data: Some(DataSource::events()),
            encoding: Some(Encoding {
                x: Some(x.to_field_def()),
                y: Some(count),
                color: Some(highlighted_color(
                    color.to_field_def(),
                    highlight.as_ref(),
                    &config.unselected_color,
                )),
                order: Some(FieldDef::new(&x.field, x.semantic).ascending()),
                ..Encoding::default()
            }),
            params: params.clone(),
            transform: filter_transforms(&filter),
            width: Some(config.frame.width),
            height: Some(config.frame.height),
            ..UnitSpec::new(MarkDef::new(MarkKind::Bar))
        };

        tracing::debug!(
            "Built histogram for '{}', filtered by {:?}",
            x.field,
            filter.referenced_selections()
        );

        View {
            role,
            filter,
            highlight,
            params: params.into_iter().map(|p| p.name).collect(),
            node: ViewNode::Unit(unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::events;
    use dv_core::{GeoBrushMode, Predicate};
    use serde_json::json;

    fn build_for(field: &str, filter_fields: &[&str], policy: &CrossFilterPolicy) -> View {
        let dataset = events(&[5.0, 5.8, 6.9]);
        let config = Configuration::default();
        let fields: Vec<String> = filter_fields.iter().map(|f| f.to_string()).collect();
        let mut registry = SelectionRegistry::new();
        registry.register(&fields).unwrap();
        registry.register_geo_brush().unwrap();

        let resolver = EncodingResolver::new(&dataset, &config);
        let (x, color) = HistogramView::resolve(&resolver, field).unwrap();
        let hist_config = HistogramConfig::from_configuration(&config, Frame::new(1200.0, 160.0));
        HistogramView::build(&x, &color, &registry, policy, &hist_config)
    }

    #[test]
    fn test_owns_its_brush_and_never_filters_itself() {
        let view = build_for("mag", &["time", "mag", "sig"], &CrossFilterPolicy::default());

        assert_eq!(view.params, vec!["mag_brush".to_string()]);
        assert!(!view.is_filtered_by("mag_brush"));
        assert_eq!(view.filter, Predicate::all(["time_brush", "sig_brush"]));
        assert_eq!(view.highlight, Some(Predicate::all(["mag_brush"])));
    }

    #[test]
    fn test_geo_brush_routing() {
        let ignore = build_for("mag", &["mag"], &CrossFilterPolicy::default());
        assert!(ignore.filter.is_always());

        let policy = CrossFilterPolicy {
            histogram_geo_brush: GeoBrushMode::Filter,
            ..CrossFilterPolicy::default()
        };
        let filtered = build_for("mag", &["mag"], &policy);
        assert_eq!(filtered.filter, Predicate::all(["brush"]));
    }

    #[test]
    fn test_histogram_encoding() {
        let view = build_for("mag", &["mag"], &CrossFilterPolicy::default());
        let value = serde_json::to_value(&view.node).unwrap();

        assert_eq!(value["name"], json!("hist_mag"));
        assert_eq!(value["mark"], json!({"type": "bar"}));
        assert_eq!(value["width"], json!(1200.0));
        assert_eq!(
            value["encoding"]["x"],
            json!({"field": "mag", "type": "quantitative", "bin": {"maxbins": 30}})
        );
        assert_eq!(
            value["encoding"]["y"],
            json!({
                "type": "quantitative",
                "aggregate": "count",
                "scale": {"type": "log"},
                "axis": {"values": [10.0, 100.0, 1000.0]},
                "title": "mag"
            })
        );
        assert_eq!(value["encoding"]["color"]["condition"]["param"], json!("mag_brush"));
        assert_eq!(
            value["params"],
            json!([{"name": "mag_brush", "select": {"type": "interval", "encodings": ["x"]}}])
        );
        assert!(value.get("transform").is_none());
    }

    #[test]
    fn test_temporal_histogram_uses_time_unit() {
        let view = build_for("time", &["time"], &CrossFilterPolicy::default());
        let value = serde_json::to_value(&view.node).unwrap();
        assert_eq!(
            value["encoding"]["x"],
            json!({"field": "time", "type": "temporal", "timeUnit": "year"})
        );
    }
}
