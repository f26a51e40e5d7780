//! Core abstractions for the cross-filter composition engine
//!
//! This crate owns the pieces every other crate agrees on: the field type
//! contract, the error taxonomy, the configuration record, the selection
//! registry and the filter graph wiring selections to views.

pub mod config;
pub mod error;
pub mod field;
pub mod filter;
pub mod selection;

// Re-export commonly used types
pub use config::{
    AggregateOp, AggregateSpec, Configuration, CrossFilterPolicy, DomainPolicy, GeoBrushMode,
    HistogramPlacement, LayoutConfig, MapFilterMode, Projection, ResolvePolicy,
};
pub use error::{ComposeError, Result};
pub use field::{Channel, FieldCatalog, SemanticType, ValueType};
pub use filter::{build_filters, build_highlight, Predicate, ViewRole};
pub use selection::{Selection, SelectionId, SelectionKind, SelectionRegistry, GEO_BRUSH_NAME};
