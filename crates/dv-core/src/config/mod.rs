//! Composition configuration
//!
//! The configuration is the whole surface the host UI can change: projection
//! parameters, which fields drive which channels, the filterable fields and
//! the heatmap axes. It deserializes from the camelCase JSON the host emits.

pub mod policy;

pub use policy::*;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ComposeError, Result};
use crate::field::{Channel, FieldCatalog, SemanticType};

/// Map projection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Projection {
    #[default]
    EqualEarth,
    Mercator,
    AzimuthalEqualArea,
    NaturalEarth1,
}

/// Aggregation applied to heatmap cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    Max,
    Mean,
    Count,
}

/// Declarative aggregation instruction for the heatmap color channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSpec {
    #[serde(rename = "fn")]
    pub op: AggregateOp,

    /// Aggregated field; ignored by `count`
    #[serde(default)]
    pub field: Option<String>,
}

impl Default for AggregateSpec {
    fn default() -> Self {
        Self {
            op: AggregateOp::Max,
            field: Some("mag".to_string()),
        }
    }
}

/// Everything the engine needs besides the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    pub projection: Projection,

    /// Projection rotation `(phi, theta)` in degrees
    pub rotate: (f64, f64),

    /// Projection scale factor
    pub scale: f64,

    pub map_fill: String,
    pub map_stroke: String,
    pub background: String,

    pub size_field: String,
    pub color_field: String,
    pub opacity_field: String,

    pub size_range: [f64; 2],
    pub opacity_range: [f64; 2],
    pub color_scheme: String,

    /// Color used for marks outside the active brush
    pub unselected_color: String,

    /// Fields that get a histogram and a brush, in display order
    pub filter_fields: Vec<String>,

    /// Field coloring the selected histogram bars
    pub histogram_color_field: String,

    /// Draw histogram counts on a log scale
    pub histogram_log_count: bool,

    pub heatmap_x: String,
    pub heatmap_y: String,
    pub heatmap_aggregate: AggregateSpec,

    /// Upper bound on equal-width bins per binned axis
    pub max_bins: usize,

    pub width: f64,
    pub height: f64,

    pub domain_policy: DomainPolicy,

    /// Pinned `[min, max]` domains used when `domain_policy` is `fixed`
    pub fixed_domains: IndexMap<String, [f64; 2]>,

    pub cross_filter: CrossFilterPolicy,
    pub layout: LayoutConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            projection: Projection::EqualEarth,
            rotate: (0.0, 0.0),
            scale: 100.0,
            map_fill: "darkgrey".to_string(),
            map_stroke: "lightgrey".to_string(),
            background: "white".to_string(),
            size_field: "mag".to_string(),
            color_field: "sig".to_string(),
            opacity_field: "mag".to_string(),
            size_range: [10.0, 200.0],
            opacity_range: [0.1, 1.0],
            color_scheme: "magma".to_string(),
            unselected_color: "lightgrey".to_string(),
            filter_fields: vec!["time".to_string(), "mag".to_string(), "sig".to_string()],
            histogram_color_field: "mag".to_string(),
            histogram_log_count: true,
            heatmap_x: "time".to_string(),
            heatmap_y: "depth".to_string(),
            heatmap_aggregate: AggregateSpec::default(),
            max_bins: 30,
            width: 1200.0,
            height: 800.0,
            domain_policy: DomainPolicy::Recomputed,
            fixed_domains: IndexMap::new(),
            cross_filter: CrossFilterPolicy::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Configuration {
    /// Pinned domain for `field`, honoured only under the fixed policy
    pub fn pinned_domain(&self, field: &str) -> Option<(f64, f64)> {
        match self.domain_policy {
            DomainPolicy::Fixed => self.fixed_domains.get(field).map(|[min, max]| (*min, *max)),
            DomainPolicy::Recomputed => None,
        }
    }

    /// Check every option against the dataset's fields.
    ///
    /// Runs before any view is built; the first violation is returned.
    pub fn validate(&self, catalog: &dyn FieldCatalog) -> Result<()> {
        self.validate_numbers()?;

        if self.heatmap_aggregate.op != AggregateOp::Count && self.heatmap_aggregate.field.is_none() {
            return Err(ComposeError::invalid_range("heatmapAggregate.field"));
        }

        for field in self.referenced_fields() {
            if catalog.value_type(field).is_none() {
                return Err(ComposeError::unknown_field(field));
            }
        }

        for (field, channel) in [
            (&self.size_field, Channel::Size),
            (&self.opacity_field, Channel::Opacity),
        ] {
            require_continuous(catalog, field, channel)?;
        }
        for field in &self.filter_fields {
            require_continuous(catalog, field, Channel::X)?;
        }
        if self.heatmap_aggregate.op != AggregateOp::Count {
            if let Some(field) = &self.heatmap_aggregate.field {
                require_continuous(catalog, field, Channel::Color)?;
            }
        }

        for (field, [min, max]) in &self.fixed_domains {
            let continuous = match catalog.semantic_type(field) {
                Some(semantic) => semantic.is_continuous(),
                None => return Err(ComposeError::unknown_field(field.as_str())),
            };
            if !continuous || !(min.is_finite() && max.is_finite()) || min > max {
                return Err(ComposeError::invalid_range(format!("fixedDomains.{field}")));
            }
        }

        Ok(())
    }

    /// Every field name the configuration points at, in a stable order
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.size_field.as_str(),
            self.color_field.as_str(),
            self.opacity_field.as_str(),
        ];
        fields.extend(self.filter_fields.iter().map(String::as_str));
        fields.push(self.histogram_color_field.as_str());
        fields.push(self.heatmap_x.as_str());
        fields.push(self.heatmap_y.as_str());
        if self.heatmap_aggregate.op != AggregateOp::Count {
            if let Some(field) = &self.heatmap_aggregate.field {
                fields.push(field.as_str());
            }
        }
        fields
    }

    fn validate_numbers(&self) -> Result<()> {
        for (parameter, value) in [
            ("width", self.width),
            ("height", self.height),
            ("scale", self.scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ComposeError::invalid_range(parameter));
            }
        }

        let [lo, hi] = self.size_range;
        if !(lo.is_finite() && hi.is_finite()) || lo < 0.0 || lo > hi {
            return Err(ComposeError::invalid_range("sizeRange"));
        }

        let [lo, hi] = self.opacity_range;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(ComposeError::invalid_range("opacityRange"));
        }

        if self.max_bins == 0 {
            return Err(ComposeError::invalid_range("maxBins"));
        }

        for (parameter, fraction) in [
            ("layout.mapWidthFraction", self.layout.map_width_fraction),
            ("layout.mapHeightFraction", self.layout.map_height_fraction),
        ] {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(ComposeError::invalid_range(parameter));
            }
        }

        let (phi, theta) = self.rotate;
        if !(phi.is_finite() && theta.is_finite()) {
            return Err(ComposeError::invalid_range("rotate"));
        }

        Ok(())
    }
}

fn require_continuous(catalog: &dyn FieldCatalog, field: &str, channel: Channel) -> Result<()> {
    match catalog.semantic_type(field) {
        Some(SemanticType::Nominal) => Err(ComposeError::IncompatibleField {
            field: field.to_string(),
            channel,
        }),
        Some(_) => Ok(()),
        None => Err(ComposeError::unknown_field(field)),
    }
}
