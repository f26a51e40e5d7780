//! View builders
//!
//! Each builder takes resolved encodings and the selection registry and
//! returns an immutable [`View`]. Builders never fail; everything that can go
//! wrong is caught while resolving encodings.

pub mod geo;
pub mod heatmap;
pub mod histogram;

pub use geo::{MapConfig, MapEncodings, MapView};
pub use heatmap::{HeatmapConfig, HeatmapEncodings, HeatmapView};
pub use histogram::{HistogramConfig, HistogramView};

use dv_core::{Channel, Predicate, Selection, SelectionKind, ViewRole};

use crate::spec::{
    ColorDef, ConditionalDef, FieldDef, ParamDef, SelectDef, SelectType, Transform, ViewNode,
};

/// Pixel size allotted to a view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A built view plus the wiring facts the layout and tests inspect
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub role: ViewRole,
    /// Inbound cross-filter
    pub filter: Predicate,
    /// Active versus grey coloring
    pub highlight: Option<Predicate>,
    /// Selections this view declares
    pub params: Vec<String>,
    pub node: ViewNode,
}

impl View {
    pub fn declares(&self, selection: &str) -> bool {
        self.params.iter().any(|name| name == selection)
    }

    pub fn is_filtered_by(&self, selection: &str) -> bool {
        self.filter.references(selection)
    }
}

/// Interval parameter declaration for a registered selection
pub(crate) fn param_def(selection: &Selection) -> ParamDef {
    let (encodings, fields) = match &selection.kind {
        SelectionKind::Interval { .. } => (Some(vec![Channel::X]), None),
        SelectionKind::GeoBrush {
            longitude,
            latitude,
        } => (None, Some(vec![longitude.clone(), latitude.clone()])),
    };
    ParamDef {
        name: selection.name.clone(),
        select: SelectDef {
            kind: SelectType::Interval,
            encodings,
            fields,
        },
    }
}

/// `filter` transform for a predicate; nothing when it always holds
pub(crate) fn filter_transforms(filter: &Predicate) -> Vec<Transform> {
    if filter.is_always() {
        Vec::new()
    } else {
        vec![Transform::Filter {
            filter: filter.clone(),
        }]
    }
}

/// Field color under the highlight, flat `unselected` color outside it
pub(crate) fn highlighted_color(
    field: FieldDef,
    highlight: Option<&Predicate>,
    unselected: &str,
) -> ColorDef {
    match highlight {
        Some(predicate) => {
            ColorDef::Conditional(ConditionalDef::new(predicate.clone(), field, unselected))
        }
        None => ColorDef::Field(field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dv_core::{SelectionRegistry, SemanticType};
    use serde_json::json;

    #[test]
    fn test_always_emits_no_transform() {
        assert!(filter_transforms(&Predicate::Always).is_empty());
        assert_eq!(filter_transforms(&Predicate::all(["mag_brush"])).len(), 1);
    }

    #[test]
    fn test_param_declarations() {
        let mut registry = SelectionRegistry::new();
        registry.register(&["mag".to_string()]).unwrap();
        registry.register_geo_brush().unwrap();

        let params: Vec<_> = registry.iter().map(param_def).collect();
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!([
                {"name": "mag_brush", "select": {"type": "interval", "encodings": ["x"]}},
                {"name": "brush", "select": {"type": "interval", "fields": ["lon", "lat"]}}
            ])
        );
    }

    #[test]
    fn test_plain_color_without_highlight() {
        let field = FieldDef::new("sig", SemanticType::Quantitative);
        assert_eq!(
            highlighted_color(field.clone(), None, "lightgrey"),
            ColorDef::Field(field)
        );
    }
}
