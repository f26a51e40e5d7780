//! Encoding resolution
//!
//! Binds a field to a visual channel. The semantic type comes from the
//! schema, the domain from the current rows (or a pinned configuration
//! value), and the output range or scheme from the channel.

mod scale;

pub use scale::LinearScale;

use dv_core::{
    AggregateOp, AggregateSpec, Channel, ComposeError, Configuration, Result, SemanticType,
};
use dv_data::{Dataset, Domain, DomainCache};

use crate::spec::{BinParams, FieldDef, LegendDef, ScaleDef, ScaleDomain, TimeUnit};

/// How values are grouped before they reach a positional channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binning {
    None,
    MaxBins(usize),
    TimeUnit(TimeUnit),
}

/// What a channel's scale maps onto
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleOutput {
    /// Screen axis of a chart
    Position,
    /// Handed to the map projection as-is
    Projected,
    /// Interpolated numeric range
    Range(f64, f64),
    /// Named color scheme
    Scheme(String),
}

/// Resolved binding of one field to one channel
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingChannel {
    pub field: String,
    pub channel: Channel,
    pub semantic: SemanticType,
    pub domain: Domain,
    pub output: ScaleOutput,
    pub binning: Binning,
    /// Larger values drawn lower on screen
    pub reverse: bool,
}

impl EncodingChannel {
    /// Linear scale for range-valued channels with a continuous domain
    pub fn linear_scale(&self) -> Option<LinearScale> {
        match (&self.output, self.domain.bounds()) {
            (ScaleOutput::Range(lo, hi), Some(domain)) => {
                Some(LinearScale::new(domain, (*lo, *hi)))
            }
            _ => None,
        }
    }

    pub fn to_field_def(&self) -> FieldDef {
        let mut def = FieldDef::new(&self.field, self.semantic);

        match self.binning {
            Binning::MaxBins(maxbins) => def.bin = Some(BinParams { maxbins }),
            Binning::TimeUnit(unit) => def.time_unit = Some(unit),
            Binning::None => {}
        }

        def.scale = match &self.output {
            ScaleOutput::Range(lo, hi) => Some(ScaleDef {
                domain: Some(self.scale_domain()),
                range: Some([*lo, *hi]),
                ..ScaleDef::default()
            }),
            ScaleOutput::Scheme(scheme) => Some(ScaleDef {
                domain: Some(self.scale_domain()),
                scheme: Some(scheme.clone()),
                ..ScaleDef::default()
            }),
            ScaleOutput::Position if self.reverse => Some(ScaleDef {
                reverse: Some(true),
                ..ScaleDef::default()
            }),
            ScaleOutput::Position | ScaleOutput::Projected => None,
        };

        if matches!(
            self.channel,
            Channel::Size | Channel::Color | Channel::Opacity
        ) {
            def.legend = Some(LegendDef {
                title: self.field.clone(),
            });
        }

        def
    }

    fn scale_domain(&self) -> ScaleDomain {
        match &self.domain {
            Domain::Continuous { min, max } => ScaleDomain::Continuous([*min, *max]),
            Domain::Categorical(values) => ScaleDomain::Categorical(values.clone()),
        }
    }
}

/// Resolved aggregate color channel of the heatmap
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateChannel {
    pub op: AggregateOp,
    /// `None` for `count`
    pub field: Option<String>,
    pub scheme: String,
}

impl AggregateChannel {
    pub fn to_field_def(&self) -> FieldDef {
        let mut def = match &self.field {
            Some(field) if self.op != AggregateOp::Count => {
                let mut def = FieldDef::new(field, SemanticType::Quantitative);
                def.aggregate = Some(self.op);
                def
            }
            _ => FieldDef::count(),
        };
        def.scale = Some(ScaleDef {
            scheme: Some(self.scheme.clone()),
            ..ScaleDef::default()
        });
        def.legend = Some(LegendDef {
            title: self.title(),
        });
        def
    }

    /// `max(mag)`, `mean(depth)`, `count`
    pub fn title(&self) -> String {
        match (&self.field, self.op) {
            (Some(field), AggregateOp::Max) => format!("max({field})"),
            (Some(field), AggregateOp::Mean) => format!("mean({field})"),
            _ => "count".to_string(),
        }
    }
}

/// Resolver over one dataset and configuration
pub struct EncodingResolver<'a> {
    dataset: &'a Dataset,
    config: &'a Configuration,
    cache: Option<&'a DomainCache>,
}

impl<'a> EncodingResolver<'a> {
    pub fn new(dataset: &'a Dataset, config: &'a Configuration) -> Self {
        Self {
            dataset,
            config,
            cache: None,
        }
    }

    /// Memoize domain scans in `cache`
    pub fn with_cache(mut self, cache: &'a DomainCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn config(&self) -> &'a Configuration {
        self.config
    }

    /// Domain of `field`: pinned under the fixed policy, scanned otherwise
    pub fn domain(&self, field: &str) -> Result<Domain> {
        let spec = self
            .dataset
            .field(field)
            .ok_or_else(|| ComposeError::unknown_field(field))?;

        if spec.semantic_type().is_continuous() {
            if let Some((min, max)) = self.config.pinned_domain(field) {
                return Ok(Domain::Continuous { min, max });
            }
        }

        let scanned = match self.cache {
            Some(cache) => cache.get_or_compute(self.dataset, field),
            None => self.dataset.domain(field),
        };
        scanned.ok_or(ComposeError::EmptyDataset)
    }

    pub fn resolve_channel(&self, field: &str, channel: Channel) -> Result<EncodingChannel> {
        let spec = self
            .dataset
            .field(field)
            .ok_or_else(|| ComposeError::unknown_field(field))?;
        let semantic = spec.semantic_type();

        let incompatible = match channel {
            Channel::Size | Channel::Opacity => !semantic.is_continuous(),
            Channel::Longitude | Channel::Latitude => semantic != SemanticType::Quantitative,
            _ => false,
        };
        if incompatible {
            return Err(ComposeError::IncompatibleField {
                field: field.to_string(),
                channel,
            });
        }

        let domain = self.domain(field)?;

        let (output, binning) = match channel {
            Channel::Size => {
                let [lo, hi] = self.config.size_range;
                (ScaleOutput::Range(lo, hi), Binning::None)
            }
            Channel::Opacity => {
                let [lo, hi] = self.config.opacity_range;
                (ScaleOutput::Range(lo, hi), Binning::None)
            }
            Channel::Color => (
                ScaleOutput::Scheme(self.config.color_scheme.clone()),
                Binning::None,
            ),
            Channel::Longitude | Channel::Latitude => (ScaleOutput::Projected, Binning::None),
            Channel::X | Channel::Y => {
                let binning = match semantic {
                    SemanticType::Temporal => Binning::TimeUnit(TimeUnit::Year),
                    SemanticType::Quantitative => Binning::MaxBins(self.config.max_bins),
                    SemanticType::Nominal => Binning::None,
                };
                (ScaleOutput::Position, binning)
            }
        };

        tracing::trace!("Resolved '{}' on {} as {:?}", field, channel, semantic);

        Ok(EncodingChannel {
            field: field.to_string(),
            channel,
            semantic,
            domain,
            output,
            binning,
            reverse: channel == Channel::Y && spec.reverse_axis,
        })
    }

    pub fn resolve_aggregate(&self, spec: &AggregateSpec) -> Result<AggregateChannel> {
        let field = match (spec.op, &spec.field) {
            (AggregateOp::Count, _) => None,
            (_, None) => return Err(ComposeError::invalid_range("heatmapAggregate.field")),
            (_, Some(field)) => {
                let declared = self
                    .dataset
                    .field(field)
                    .ok_or_else(|| ComposeError::unknown_field(field.as_str()))?;
                if !declared.semantic_type().is_continuous() {
                    return Err(ComposeError::IncompatibleField {
                        field: field.clone(),
                        channel: Channel::Color,
                    });
                }
                Some(field.clone())
            }
        };

        Ok(AggregateChannel {
            op: spec.op,
            field,
            scheme: self.config.color_scheme.clone(),
        })
    }
}

/// Resolve `field` on `channel` without a domain cache
pub fn resolve_channel(
    dataset: &Dataset,
    field: &str,
    channel: Channel,
    config: &Configuration,
) -> Result<EncodingChannel> {
    EncodingResolver::new(dataset, config).resolve_channel(field, channel)
}

pub fn resolve_aggregate(
    dataset: &Dataset,
    spec: &AggregateSpec,
    config: &Configuration,
) -> Result<AggregateChannel> {
    EncodingResolver::new(dataset, config).resolve_aggregate(spec)
}
