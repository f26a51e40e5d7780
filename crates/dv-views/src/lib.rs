//! View composition for seismic event exploration
//!
//! Resolves encodings against a dataset, builds the map, histogram and
//! heatmap views, wires their cross-filters and lays them out as a single
//! Vega-Lite document.

pub mod encoding;
pub mod engine;
pub mod export;
pub mod layout;
pub mod plots;
pub mod spec;

pub use encoding::{
    resolve_aggregate, resolve_channel, AggregateChannel, Binning, EncodingChannel,
    EncodingResolver, LinearScale, ScaleOutput,
};
pub use engine::{Composition, CompositionEngine};
pub use export::{serialize, to_json_string, write_json};
pub use layout::{compose, CompositeSpec, LayoutPlan, ResolveDef, ResolveMode};
pub use plots::{Frame, View};
pub use spec::{ViewNode, EVENTS_DATASET, VEGA_LITE_SCHEMA};
