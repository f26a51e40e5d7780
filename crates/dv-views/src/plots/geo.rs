//! Geographic map view
//!
//! Country outlines and a graticule under the event points, all sharing one
//! projection. The points layer owns the geo-brush.

use dv_core::{
    build_filters, build_highlight, Channel, Configuration, CrossFilterPolicy, Result,
    SelectionRegistry, ViewRole,
};

use super::{filter_transforms, highlighted_color, param_def, Frame, View};
use crate::encoding::{EncodingChannel, EncodingResolver};
use crate::spec::{
    DataSource, Encoding, FieldDef, LayerSpec, MarkDef, MarkKind, ProjectionDef, UnitSpec,
    ViewNode,
};

pub const LONGITUDE_FIELD: &str = "lon";
pub const LATITUDE_FIELD: &str = "lat";

/// Field drawing order; later events paint over earlier ones
const ORDER_FIELD: &str = "time";

const TOOLTIPS: &[(&str, &str)] = &[
    ("place", "Location"),
    ("mag", "Magnitude"),
    ("depth", "Depth (km)"),
    ("time", "Time"),
];

/// Configuration for the map view
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub projection: ProjectionDef,

    /// Land fill
    pub fill: String,

    /// Country borders and graticule
    pub stroke: String,

    /// Color of points outside the brush
    pub unselected_color: String,

    pub frame: Frame,
}

impl MapConfig {
    /// Projection centered in `frame`, rotated by `(phi, theta)`
    pub fn from_configuration(config: &Configuration, frame: Frame) -> Self {
        let (phi, theta) = config.rotate;
        Self {
            projection: ProjectionDef {
                kind: config.projection,
                rotate: [phi, theta, 0.0],
                scale: config.scale,
                translate: [frame.width / 2.0, frame.height / 2.0],
            },
            fill: config.map_fill.clone(),
            stroke: config.map_stroke.clone(),
            unselected_color: config.unselected_color.clone(),
            frame,
        }
    }
}

/// Channels of the points layer
#[derive(Debug, Clone, PartialEq)]
pub struct MapEncodings {
    pub longitude: EncodingChannel,
    pub latitude: EncodingChannel,
    pub size: EncodingChannel,
    pub opacity: EncodingChannel,
    pub color: EncodingChannel,
    pub order: Option<FieldDef>,
    pub tooltip: Vec<FieldDef>,
}

impl MapEncodings {
    pub fn resolve(resolver: &EncodingResolver<'_>) -> Result<Self> {
        let config = resolver.config();
        let dataset = resolver.dataset();

        let tooltip = TOOLTIPS
            .iter()
            .filter_map(|(field, title)| {
                dataset
                    .field(field)
                    .map(|spec| FieldDef::new(*field, spec.semantic_type()).titled(*title))
            })
            .collect();

        Ok(Self {
            longitude: resolver.resolve_channel(LONGITUDE_FIELD, Channel::Longitude)?,
            latitude: resolver.resolve_channel(LATITUDE_FIELD, Channel::Latitude)?,
            size: resolver.resolve_channel(&config.size_field, Channel::Size)?,
            opacity: resolver.resolve_channel(&config.opacity_field, Channel::Opacity)?,
            color: resolver.resolve_channel(&config.color_field, Channel::Color)?,
            order: dataset
                .field(ORDER_FIELD)
                .map(|spec| FieldDef::new(ORDER_FIELD, spec.semantic_type()).ascending()),
            tooltip,
        })
    }
}

pub struct MapView;

impl MapView {
    pub fn build(
        encodings: &MapEncodings,
        registry: &SelectionRegistry,
        policy: &CrossFilterPolicy,
        config: &MapConfig,
    ) -> View {
        let role = ViewRole::Map;
        let filter = build_filters(registry, &role, policy);
        let highlight = build_highlight(registry, &role, policy);
        let params: Vec<_> = registry.owned_by(&role).map(param_def).collect();

        let countries = UnitSpec {
            data: Some(DataSource::countries()),
            ..UnitSpec::new(MarkDef {
                fill: Some(config.fill.clone()),
                stroke: Some(config.stroke.clone()),
                ..MarkDef::new(MarkKind::Geoshape)
            })
        };

        let graticule = UnitSpec {
            data: Some(DataSource::Graticule { graticule: true }),
            ..UnitSpec::new(MarkDef {
                stroke: Some(config.stroke.clone()),
                filled: Some(false),
                ..MarkDef::new(MarkKind::Geoshape)
            })
        };

        let points = UnitSpec {
            name: Some("points".to_string()),
            data: Some(DataSource::events()),
            encoding: Some(Encoding {
                longitude: Some(encodings.longitude.to_field_def()),
                latitude: Some(encodings.latitude.to_field_def()),
                size: Some(encodings.size.to_field_def()),
                opacity: Some(encodings.opacity.to_field_def()),
                color: Some(highlighted_color(
                    encodings.color.to_field_def(),
                    highlight.as_ref(),
                    &config.unselected_color,
                )),
                order: encodings.order.clone(),
                tooltip: encodings.tooltip.clone(),
                ..Encoding::default()
            }),
            params: params.clone(),
            transform: filter_transforms(&filter),
            ..UnitSpec::new(MarkDef::new(MarkKind::Circle))
        };

        let node = ViewNode::Layer(LayerSpec {
            name: Some("map".to_string()),
            layer: vec![
                ViewNode::Unit(countries),
                ViewNode::Unit(graticule),
                ViewNode::Unit(points),
            ],
            projection: Some(config.projection.clone()),
            width: Some(config.frame.width),
            height: Some(config.frame.height),
        });

        tracing::debug!(
            "Built map view with {} params, filtered by {:?}",
            params.len(),
            filter.referenced_selections()
        );

        View {
            role,
            filter,
            highlight,
            params: params.into_iter().map(|p| p.name).collect(),
            node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::events;
    use dv_core::{MapFilterMode, Predicate, Projection, GEO_BRUSH_NAME};
    use serde_json::json;

    fn registry(fields: &[&str]) -> SelectionRegistry {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        let mut registry = SelectionRegistry::new();
        registry.register(&fields).unwrap();
        registry.register_geo_brush().unwrap();
        registry
    }

    fn build(config: &Configuration, registry: &SelectionRegistry) -> View {
        let dataset = events(&[5.0, 6.9]);
        let resolver = EncodingResolver::new(&dataset, config);
        let encodings = MapEncodings::resolve(&resolver).unwrap();
        let map_config = MapConfig::from_configuration(config, Frame::new(720.0, 640.0));
        MapView::build(&encodings, registry, &config.cross_filter, &map_config)
    }

    #[test]
    fn test_projection_centered_in_frame() {
        let mut config = Configuration::default();
        config.projection = Projection::Mercator;
        config.rotate = (30.0, -10.0);

        let map = MapConfig::from_configuration(&config, Frame::new(720.0, 640.0));
        assert_eq!(
            serde_json::to_value(&map.projection).unwrap(),
            json!({"type": "mercator", "rotate": [30.0, -10.0, 0.0], "scale": 100.0, "translate": [360.0, 320.0]})
        );
    }

    #[test]
    fn test_map_owns_geo_brush_and_is_filtered_by_field_brushes() {
        let config = Configuration::default();
        let view = build(&config, &registry(&["mag", "sig"]));

        assert_eq!(view.params, vec![GEO_BRUSH_NAME.to_string()]);
        assert!(!view.is_filtered_by(GEO_BRUSH_NAME));
        assert_eq!(view.filter, Predicate::all(["mag_brush", "sig_brush"]));
        assert_eq!(view.highlight, Some(Predicate::all([GEO_BRUSH_NAME])));

        let units = view.node.units();
        assert_eq!(units.len(), 3);
        let points = units[2];
        assert_eq!(points.params[0].name, GEO_BRUSH_NAME);
        assert_eq!(points.transform.len(), 1);

        let tooltip = &points.encoding.as_ref().unwrap().tooltip;
        let titles: Vec<_> = tooltip.iter().filter_map(|t| t.title.as_deref()).collect();
        assert_eq!(titles, vec!["Location", "Magnitude", "Depth (km)", "Time"]);
    }

    #[test]
    fn test_dim_mode_moves_field_brushes_into_highlight() {
        let mut config = Configuration::default();
        config.cross_filter.map = MapFilterMode::Dim;
        let view = build(&config, &registry(&["mag"]));

        assert!(view.filter.is_always());
        assert!(view.node.units()[2].transform.is_empty());
        assert_eq!(
            view.highlight,
            Some(Predicate::all([GEO_BRUSH_NAME, "mag_brush"]))
        );
    }

    #[test]
    fn test_points_encoding_serializes() {
        let config = Configuration::default();
        let view = build(&config, &registry(&[]));
        let points = serde_json::to_value(view.node.units()[2]).unwrap();

        assert_eq!(points["data"], json!({"name": "events"}));
        assert_eq!(points["mark"], json!({"type": "circle"}));
        assert_eq!(
            points["encoding"]["size"]["scale"],
            json!({"domain": [5.0, 6.9], "range": [10.0, 200.0]})
        );
        assert_eq!(points["encoding"]["color"]["condition"]["param"], json!("brush"));
        assert_eq!(points["encoding"]["color"]["value"], json!("lightgrey"));
        assert_eq!(
            points["encoding"]["order"],
            json!({"field": "time", "type": "temporal", "sort": "ascending"})
        );
        assert!(points.get("transform").is_none());
    }
}
