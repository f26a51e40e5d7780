//! Vega-Lite document export
//!
//! Object keys come out sorted, so the same composite always serializes to
//! the same bytes.

use std::io::Write;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::layout::{CompositeSpec, ResolveDef};
use crate::spec::{ViewNode, VEGA_LITE_SCHEMA};

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "$schema")]
    schema: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<&'a str>,
    #[serde(flatten)]
    root: &'a ViewNode,
    #[serde(skip_serializing_if = "unresolved")]
    resolve: &'a ResolveDef,
    #[serde(skip_serializing_if = "no_datasets")]
    datasets: &'a IndexMap<String, Vec<Value>>,
}

fn unresolved(resolve: &&ResolveDef) -> bool {
    resolve.is_empty()
}

fn no_datasets(datasets: &&IndexMap<String, Vec<Value>>) -> bool {
    datasets.is_empty()
}

impl<'a> From<&'a CompositeSpec> for Document<'a> {
    fn from(spec: &'a CompositeSpec) -> Self {
        Self {
            schema: VEGA_LITE_SCHEMA,
            background: spec.background.as_deref(),
            root: &spec.root,
            resolve: &spec.resolve,
            datasets: &spec.datasets,
        }
    }
}

/// The composite as a JSON tree
pub fn serialize(spec: &CompositeSpec) -> serde_json::Result<Value> {
    serde_json::to_value(Document::from(spec))
}

pub fn to_json_string(spec: &CompositeSpec, pretty: bool) -> serde_json::Result<String> {
    let value = serialize(spec)?;
    if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
}

/// Write the document to `writer`, newline-terminated
pub fn write_json<W: Write>(spec: &CompositeSpec, mut writer: W, pretty: bool) -> std::io::Result<()> {
    let text = to_json_string(spec, pretty)?;
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compose;
    use crate::plots::View;
    use crate::spec::{MarkDef, MarkKind, UnitSpec};
    use dv_core::{LayoutConfig, Predicate, ViewRole};
    use serde_json::json;

    fn spec() -> CompositeSpec {
        let heatmap = View {
            role: ViewRole::Heatmap,
            filter: Predicate::Always,
            highlight: None,
            params: Vec::new(),
            node: ViewNode::Unit(UnitSpec::new(MarkDef::new(MarkKind::Rect))),
        };
        compose(vec![heatmap], &LayoutConfig::default())
    }

    #[test]
    fn test_document_envelope() {
        let spec = spec()
            .with_background("white")
            .with_dataset("events", vec![json!({"mag": 5.0})]);
        let value = serialize(&spec).unwrap();

        assert_eq!(value["$schema"], json!(VEGA_LITE_SCHEMA));
        assert_eq!(value["background"], json!("white"));
        assert_eq!(value["vconcat"][0]["hconcat"][0]["mark"], json!({"type": "rect"}));
        assert_eq!(value["resolve"]["scale"]["color"], json!("independent"));
        assert_eq!(value["datasets"]["events"], json!([{"mag": 5.0}]));
    }

    #[test]
    fn test_empty_sections_omitted() {
        let value = serialize(&spec()).unwrap();
        assert!(value.get("background").is_none());
        assert!(value.get("datasets").is_none());
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&spec(), &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(text.trim_end(), to_json_string(&spec(), false).unwrap());
    }
}
