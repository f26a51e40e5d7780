//! Typed model of the emitted Vega-Lite document
//!
//! Views are plain immutable values; two builds from the same inputs compare
//! equal structurally and serialize to the same bytes.

use dv_core::{AggregateOp, Channel, Predicate, Projection, SemanticType};
use serde::Serialize;

/// Vega-Lite schema the document targets
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Name of the inline event dataset shared by all data views
pub const EVENTS_DATASET: &str = "events";

/// Country outlines used for the base map
pub const WORLD_TOPOLOGY_URL: &str =
    "https://cdn.jsdelivr.net/npm/vega-datasets@v2/data/world-110m.json";

/// Where a unit view reads its rows from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataSource {
    Named { name: String },
    Url { url: String, format: DataFormat },
    Graticule { graticule: bool },
}

impl DataSource {
    pub fn events() -> Self {
        DataSource::Named {
            name: EVENTS_DATASET.to_string(),
        }
    }

    pub fn countries() -> Self {
        DataSource::Url {
            url: WORLD_TOPOLOGY_URL.to_string(),
            format: DataFormat {
                kind: "topojson".to_string(),
                feature: "countries".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataFormat {
    #[serde(rename = "type")]
    pub kind: String,
    pub feature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
    Geoshape,
    Circle,
    Bar,
    Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkDef {
    #[serde(rename = "type")]
    pub kind: MarkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled: Option<bool>,
}

impl MarkDef {
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            fill: None,
            stroke: None,
            filled: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinParams {
    pub maxbins: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScaleDomain {
    Continuous([f64; 2]),
    Categorical(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScaleDef {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ScaleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<ScaleDomain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisDef {
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendDef {
    pub title: String,
}

/// Field-bound channel definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(rename = "type")]
    pub semantic: SemanticType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<AggregateOp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<BinParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<TimeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<AxisDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

impl FieldDef {
    pub fn new(field: impl Into<String>, semantic: SemanticType) -> Self {
        Self {
            field: Some(field.into()),
            semantic,
            aggregate: None,
            bin: None,
            time_unit: None,
            scale: None,
            axis: None,
            legend: None,
            title: None,
            sort: None,
        }
    }

    /// `count()` over the rows behind a mark
    pub fn count() -> Self {
        Self {
            field: None,
            aggregate: Some(AggregateOp::Count),
            ..Self::new("", SemanticType::Quantitative)
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn ascending(mut self) -> Self {
        self.sort = Some(SortOrder::Ascending);
        self
    }
}

/// Which selection state a condition tests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionBranch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<Predicate>,
    #[serde(flatten)]
    pub field: FieldDef,
}

/// Field encoding when the predicate holds, flat value otherwise
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalDef {
    pub condition: ConditionBranch,
    pub value: String,
}

impl ConditionalDef {
    /// A single selection becomes a `param` test, anything else a `test`
    pub fn new(predicate: Predicate, field: FieldDef, otherwise: impl Into<String>) -> Self {
        let (param, test) = match predicate {
            Predicate::Selection(name) => (Some(name), None),
            other => (None, Some(other)),
        };
        Self {
            condition: ConditionBranch { param, test, field },
            value: otherwise.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorDef {
    Field(FieldDef),
    Conditional(ConditionalDef),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<FieldDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltip: Vec<FieldDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectType {
    Interval,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectDef {
    #[serde(rename = "type")]
    pub kind: SelectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encodings: Option<Vec<Channel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// Selection parameter declared by the view that owns it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDef {
    pub name: String,
    pub select: SelectDef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Transform {
    Filter { filter: Predicate },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionDef {
    #[serde(rename = "type")]
    pub kind: Projection,
    pub rotate: [f64; 3],
    pub scale: f64,
    pub translate: [f64; 2],
}

/// Single-mark view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DataSource>,
    pub mark: MarkDef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<Transform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl UnitSpec {
    pub fn new(mark: MarkDef) -> Self {
        Self {
            name: None,
            data: None,
            mark,
            encoding: None,
            params: Vec::new(),
            transform: Vec::new(),
            width: None,
            height: None,
        }
    }
}

/// Views drawn on top of each other sharing a projection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub layer: Vec<ViewNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HConcatSpec {
    pub hconcat: Vec<ViewNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VConcatSpec {
    pub vconcat: Vec<ViewNode>,
}

/// Node of the layout tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewNode {
    Unit(UnitSpec),
    Layer(LayerSpec),
    HConcat(HConcatSpec),
    VConcat(VConcatSpec),
}

impl ViewNode {
    pub fn hconcat(children: Vec<ViewNode>) -> Self {
        ViewNode::HConcat(HConcatSpec { hconcat: children })
    }

    pub fn vconcat(children: Vec<ViewNode>) -> Self {
        ViewNode::VConcat(VConcatSpec { vconcat: children })
    }

    /// Name given to this node, if it is a named unit or layer
    pub fn name(&self) -> Option<&str> {
        match self {
            ViewNode::Unit(unit) => unit.name.as_deref(),
            ViewNode::Layer(layer) => layer.name.as_deref(),
            ViewNode::HConcat(_) | ViewNode::VConcat(_) => None,
        }
    }

    /// Depth-first visit of every unit view in the tree
    pub fn units(&self) -> Vec<&UnitSpec> {
        let mut out = Vec::new();
        self.collect_units(&mut out);
        out
    }

    fn collect_units<'a>(&'a self, out: &mut Vec<&'a UnitSpec>) {
        match self {
            ViewNode::Unit(unit) => out.push(unit),
            ViewNode::Layer(LayerSpec { layer: children, .. })
            | ViewNode::HConcat(HConcatSpec { hconcat: children })
            | ViewNode::VConcat(VConcatSpec { vconcat: children }) => {
                children.iter().for_each(|child| child.collect_units(out))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conditional_color_with_single_param() {
        let color = ColorDef::Conditional(ConditionalDef::new(
            Predicate::Selection("brush".to_string()),
            FieldDef::new("sig", SemanticType::Quantitative),
            "lightgrey",
        ));
        assert_eq!(
            serde_json::to_value(&color).unwrap(),
            json!({
                "condition": {"param": "brush", "field": "sig", "type": "quantitative"},
                "value": "lightgrey"
            })
        );
    }

    #[test]
    fn test_conditional_color_with_conjunction() {
        let color = ConditionalDef::new(
            Predicate::all(["brush", "mag_brush"]),
            FieldDef::new("sig", SemanticType::Quantitative),
            "lightgrey",
        );
        let value = serde_json::to_value(&color).unwrap();
        assert_eq!(
            value["condition"]["test"],
            json!({"and": [{"param": "brush"}, {"param": "mag_brush"}]})
        );
        assert!(value["condition"].get("param").is_none());
    }

    #[test]
    fn test_count_field_def() {
        assert_eq!(
            serde_json::to_value(FieldDef::count()).unwrap(),
            json!({"type": "quantitative", "aggregate": "count"})
        );
    }

    #[test]
    fn test_units_visits_nested_layout() {
        let unit = |name: &str| {
            ViewNode::Unit(UnitSpec {
                name: Some(name.to_string()),
                ..UnitSpec::new(MarkDef::new(MarkKind::Bar))
            })
        };
        let tree = ViewNode::vconcat(vec![
            ViewNode::hconcat(vec![unit("a"), unit("b")]),
            unit("c"),
        ]);
        let names: Vec<_> = tree.units().iter().filter_map(|u| u.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
