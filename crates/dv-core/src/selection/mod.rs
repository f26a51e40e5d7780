//! Selection registry for coordinating brushes across views
//!
//! Selections are declared here and evaluated only by the rendering runtime.
//! The registry hands out names and ids; the live brush extents never pass
//! through this crate.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ComposeError, Result};
use crate::filter::ViewRole;

/// Name of the free-form map brush
pub const GEO_BRUSH_NAME: &str = "brush";

const BRUSH_SUFFIX: &str = "_brush";

/// Namespace for deterministic selection ids
const SELECTION_NAMESPACE: Uuid = Uuid::from_u128(0x6b3e_90d2_4c1f_4f6a_9a0e_51c2_d7e4_a3b8);

/// Identifier handed to the host so it can observe a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionId(Uuid);

impl SelectionId {
    fn derive(fingerprint: &str, name: &str) -> Self {
        let key = format!("{fingerprint}\u{1e}{name}");
        Self(Uuid::new_v5(&SELECTION_NAMESPACE, key.as_bytes()))
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a selection brushes over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionKind {
    /// One-dimensional brush over a single field
    Interval { field: String },

    /// Rectangle over longitude and latitude jointly
    GeoBrush { longitude: String, latitude: String },
}

/// A declared, named selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: SelectionId,
    pub name: String,
    pub kind: SelectionKind,
}

impl Selection {
    /// Fields the brush predicate ranges over
    pub fn fields(&self) -> Vec<&str> {
        match &self.kind {
            SelectionKind::Interval { field } => vec![field.as_str()],
            SelectionKind::GeoBrush {
                longitude,
                latitude,
            } => vec![longitude.as_str(), latitude.as_str()],
        }
    }

    pub fn is_owned_by(&self, role: &ViewRole) -> bool {
        match (&self.kind, role) {
            (SelectionKind::Interval { field }, ViewRole::Histogram(owner)) => field == owner,
            (SelectionKind::GeoBrush { .. }, ViewRole::Map) => true,
            _ => false,
        }
    }

    pub fn is_geo_brush(&self) -> bool {
        matches!(self.kind, SelectionKind::GeoBrush { .. })
    }
}

/// Brush name for a filterable field
pub fn brush_name(field: &str) -> String {
    format!("{field}{BRUSH_SUFFIX}")
}

/// Registry of every selection declared during one composition call
#[derive(Debug, Clone, Default)]
pub struct SelectionRegistry {
    /// Fingerprint of the registered field list, seeds the ids
    fingerprint: String,

    selections: IndexMap<String, Selection>,
}

impl SelectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one interval selection per field.
    ///
    /// Either every field is registered or none is. Ids are derived from the
    /// field list, so rebuilding with the same list yields the same ids.
    pub fn register(&mut self, fields: &[String]) -> Result<IndexMap<String, SelectionId>> {
        let names: Vec<String> = fields.iter().map(|f| brush_name(f)).collect();
        for (idx, name) in names.iter().enumerate() {
            if self.selections.contains_key(name) || names[..idx].contains(name) {
                return Err(ComposeError::DuplicateSelectionName { name: name.clone() });
            }
        }

        self.fingerprint = fields.join("\u{1f}");

        let mut registered = IndexMap::with_capacity(fields.len());
        for (field, name) in fields.iter().zip(names) {
            let id = SelectionId::derive(&self.fingerprint, &name);
            self.selections.insert(
                name.clone(),
                Selection {
                    id,
                    name,
                    kind: SelectionKind::Interval {
                        field: field.clone(),
                    },
                },
            );
            registered.insert(field.clone(), id);
        }

        tracing::debug!("Registered {} field selections", registered.len());
        Ok(registered)
    }

    /// Register the map's geo-brush over `lon`/`lat`
    pub fn register_geo_brush(&mut self) -> Result<SelectionId> {
        self.register_geo_brush_over("lon", "lat")
    }

    /// Register the map's geo-brush over explicit coordinate fields
    pub fn register_geo_brush_over(&mut self, longitude: &str, latitude: &str) -> Result<SelectionId> {
        if self.selections.contains_key(GEO_BRUSH_NAME) {
            return Err(ComposeError::DuplicateSelectionName {
                name: GEO_BRUSH_NAME.to_string(),
            });
        }

        let id = SelectionId::derive(&self.fingerprint, GEO_BRUSH_NAME);
        self.selections.insert(
            GEO_BRUSH_NAME.to_string(),
            Selection {
                id,
                name: GEO_BRUSH_NAME.to_string(),
                kind: SelectionKind::GeoBrush {
                    longitude: longitude.to_string(),
                    latitude: latitude.to_string(),
                },
            },
        );
        Ok(id)
    }

    /// Interval selection declared for `field`
    pub fn field_selection(&self, field: &str) -> Option<&Selection> {
        self.selections.get(&brush_name(field))
    }

    pub fn geo_brush(&self) -> Option<&Selection> {
        self.selections.get(GEO_BRUSH_NAME)
    }

    /// Selections in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        self.selections.values()
    }

    /// Selections owned by `role`
    pub fn owned_by<'a>(&'a self, role: &'a ViewRole) -> impl Iterator<Item = &'a Selection> + 'a {
        self.iter().filter(move |selection| selection.is_owned_by(role))
    }

    /// Side map from selection name to id, for host observers
    pub fn ids(&self) -> IndexMap<String, SelectionId> {
        self.selections
            .iter()
            .map(|(name, selection)| (name.clone(), selection.id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}
