//! Cross-filter graph
//!
//! Each view is filtered by every selection except the ones it declares
//! itself.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::config::{CrossFilterPolicy, GeoBrushMode, MapFilterMode};
use crate::selection::{Selection, SelectionRegistry};

/// Role a view plays in the composite, which decides what it owns
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewRole {
    Map,
    Histogram(String),
    Heatmap,
}

/// Conjunctive predicate over selection names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every row; emits no filter
    Always,
    Selection(String),
    And(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction of the named selections, collapsed to its simplest form
    pub fn all<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<Predicate> = names
            .into_iter()
            .map(|name| Predicate::Selection(name.into()))
            .collect();
        match terms.len() {
            0 => Predicate::Always,
            1 => terms.remove(0),
            _ => Predicate::And(terms),
        }
    }

    /// Selection names referenced anywhere in the predicate, in order
    pub fn referenced_selections(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Always => {}
            Predicate::Selection(name) => out.push(name.as_str()),
            Predicate::And(terms) => terms.iter().for_each(|term| term.collect_names(out)),
        }
    }

    pub fn references(&self, name: &str) -> bool {
        self.referenced_selections().contains(&name)
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Predicate::Always)
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Predicate::Always => serializer.serialize_str("true"),
            Predicate::Selection(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("param", name)?;
                map.end()
            }
            Predicate::And(terms) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("and", &Terms(terms))?;
                map.end()
            }
        }
    }
}

struct Terms<'a>(&'a [Predicate]);

impl Serialize for Terms<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for term in self.0 {
            seq.serialize_element(term)?;
        }
        seq.end()
    }
}

/// Whether `selection` hard-filters a view playing `role`
fn filters(role: &ViewRole, selection: &Selection, policy: &CrossFilterPolicy) -> bool {
    if selection.is_owned_by(role) {
        return false;
    }
    match (role, selection.is_geo_brush()) {
        (ViewRole::Map, _) => policy.map == MapFilterMode::Filter,
        (ViewRole::Histogram(_), true) => policy.histogram_geo_brush == GeoBrushMode::Filter,
        (ViewRole::Heatmap, true) => policy.heatmap_geo_brush == GeoBrushMode::Filter,
        (_, false) => true,
    }
}

/// Inbound filter predicate for a view: the AND of every selection it does
/// not own and that the policy routes to it as a transform.
pub fn build_filters(
    registry: &SelectionRegistry,
    role: &ViewRole,
    policy: &CrossFilterPolicy,
) -> Predicate {
    let predicate = Predicate::all(
        registry
            .iter()
            .filter(|selection| filters(role, selection, policy))
            .map(|selection| selection.name.clone()),
    );
    tracing::debug!(
        "Filter for {:?} references {:?}",
        role,
        predicate.referenced_selections()
    );
    predicate
}

/// Predicate deciding active versus grey coloring for a view.
///
/// The map highlights by its geo-brush, plus the field brushes when those are
/// set to dim instead of filter. A histogram highlights by its own brush. The
/// heatmap has no highlight.
pub fn build_highlight(
    registry: &SelectionRegistry,
    role: &ViewRole,
    policy: &CrossFilterPolicy,
) -> Option<Predicate> {
    let names: Vec<String> = match role {
        ViewRole::Map => {
            let mut names: Vec<String> = registry
                .geo_brush()
                .map(|brush| vec![brush.name.clone()])
                .unwrap_or_default();
            if policy.map == MapFilterMode::Dim {
                names.extend(
                    registry
                        .iter()
                        .filter(|selection| !selection.is_geo_brush())
                        .map(|selection| selection.name.clone()),
                );
            }
            names
        }
        ViewRole::Histogram(_) => registry
            .owned_by(role)
            .map(|selection| selection.name.clone())
            .collect(),
        ViewRole::Heatmap => Vec::new(),
    };

    match Predicate::all(names) {
        Predicate::Always => None,
        predicate => Some(predicate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(fields: &[&str]) -> SelectionRegistry {
        let mut registry = SelectionRegistry::new();
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        registry.register(&fields).unwrap();
        registry.register_geo_brush().unwrap();
        registry
    }

    fn roles(fields: &[&str]) -> Vec<ViewRole> {
        let mut roles = vec![ViewRole::Map, ViewRole::Heatmap];
        roles.extend(fields.iter().map(|f| ViewRole::Histogram(f.to_string())));
        roles
    }

    #[test]
    fn test_no_view_filters_by_its_own_selection() {
        let fields = ["time", "mag", "sig", "depth"];
        let registry = registry(&fields);
        let policies = [
            CrossFilterPolicy::default(),
            CrossFilterPolicy {
                map: MapFilterMode::Dim,
                histogram_geo_brush: GeoBrushMode::Filter,
                heatmap_geo_brush: GeoBrushMode::Ignore,
            },
        ];

        for policy in &policies {
            for role in roles(&fields) {
                let predicate = build_filters(&registry, &role, policy);
                for owned in registry.owned_by(&role) {
                    assert!(
                        !predicate.references(&owned.name),
                        "{role:?} filtered by its own {}",
                        owned.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_default_policy_wiring() {
        let registry = registry(&["time", "mag", "sig"]);
        let policy = CrossFilterPolicy::default();

        let map = build_filters(&registry, &ViewRole::Map, &policy);
        assert_eq!(
            map.referenced_selections(),
            vec!["time_brush", "mag_brush", "sig_brush"]
        );

        let mag = build_filters(&registry, &ViewRole::Histogram("mag".to_string()), &policy);
        assert_eq!(mag.referenced_selections(), vec!["time_brush", "sig_brush"]);

        let heatmap = build_filters(&registry, &ViewRole::Heatmap, &policy);
        assert_eq!(
            heatmap.referenced_selections(),
            vec!["time_brush", "mag_brush", "sig_brush", "brush"]
        );
    }

    #[test]
    fn test_single_histogram_is_unfiltered() {
        let registry = registry(&["mag"]);
        let predicate = build_filters(
            &registry,
            &ViewRole::Histogram("mag".to_string()),
            &CrossFilterPolicy::default(),
        );
        assert!(predicate.is_always());
    }

    #[test]
    fn test_highlights() {
        let registry = registry(&["mag", "sig"]);
        let policy = CrossFilterPolicy::default();

        assert_eq!(
            build_highlight(&registry, &ViewRole::Map, &policy),
            Some(Predicate::Selection("brush".to_string()))
        );
        assert_eq!(
            build_highlight(&registry, &ViewRole::Histogram("sig".to_string()), &policy),
            Some(Predicate::Selection("sig_brush".to_string()))
        );
        assert_eq!(build_highlight(&registry, &ViewRole::Heatmap, &policy), None);

        let dim = CrossFilterPolicy {
            map: MapFilterMode::Dim,
            ..CrossFilterPolicy::default()
        };
        let highlight = build_highlight(&registry, &ViewRole::Map, &dim).unwrap();
        assert_eq!(
            highlight.referenced_selections(),
            vec!["brush", "mag_brush", "sig_brush"]
        );
        assert!(build_filters(&registry, &ViewRole::Map, &dim).is_always());
    }

    #[test]
    fn test_predicate_serialization() {
        let single = Predicate::all(["mag_brush"]);
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            serde_json::json!({"param": "mag_brush"})
        );

        let both = Predicate::all(["mag_brush", "brush"]);
        assert_eq!(
            serde_json::to_value(&both).unwrap(),
            serde_json::json!({"and": [{"param": "mag_brush"}, {"param": "brush"}]})
        );
    }
}
