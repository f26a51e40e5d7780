//! Scale math shared by the resolver and its consumers

use serde::Serialize;

/// Linear map from a data domain onto an output range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Interpolate `value` into the output range.
    ///
    /// A degenerate domain (every value equal) maps to the range start.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.domain.0 == self.domain.1
    }
}
