//! Package dimensions, dimensional weight and billable weight
//!
//! Dimensions are inches and weights are pounds throughout the crate.

use serde::{Deserialize, Serialize};

/// Divisor turning cubic inches into dimensional pounds
pub const DIM_DIVISOR: f64 = 222.0;

/// A parcel to be quoted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Length (in)
    pub length: f64,

    /// Width (in)
    pub width: f64,

    /// Height (in)
    pub height: f64,

    /// Actual weight (lb)
    pub weight: f64,
}

impl Package {
    pub fn new(length: f64, width: f64, height: f64, weight: f64) -> Self {
        Self {
            length,
            width,
            height,
            weight,
        }
    }

    /// Volume-derived weight: L×W×H / 222
    pub fn dim_weight(&self) -> f64 {
        self.length * self.width * self.height / DIM_DIVISOR
    }

    /// The greater of actual and dimensional weight, before any rounding
    pub fn rated_weight(&self) -> f64 {
        self.weight.max(self.dim_weight())
    }

    /// Billable weight for a channel with the given rounding step
    pub fn billable_weight(&self, precision: f64) -> f64 {
        billable_weight(self.rated_weight(), precision)
    }

    /// Dimensions sorted longest first
    pub fn sorted_dims(&self) -> [f64; 3] {
        let mut dims = [self.length, self.width, self.height];
        dims.sort_by(|a, b| b.total_cmp(a));
        dims
    }

    /// Longest side
    pub fn longest(&self) -> f64 {
        self.sorted_dims()[0]
    }

    /// Length plus girth: longest + 2 × (the other two sides)
    pub fn girth(&self) -> f64 {
        let [l, w, h] = self.sorted_dims();
        l + 2.0 * (w + h)
    }

    /// First field that is negative or not finite, if any
    pub fn invalid_field(&self) -> Option<(&'static str, f64)> {
        [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
            ("weight", self.weight),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite() || *v < 0.0)
    }
}

/// Round a raw weight up to the next multiple of `precision`.
///
/// A non-positive or non-finite precision is treated as the default step of 1.
/// The result is never below `raw`; when float division overshoots by a full
/// step (e.g. 1.1 / 0.1 = 11.000000000000002) the lower multiple is kept as
/// long as it still covers `raw`.
pub fn billable_weight(raw: f64, precision: f64) -> f64 {
    let step = if precision.is_finite() && precision > 0.0 {
        precision
    } else {
        1.0
    };

    let steps = (raw / step).ceil();
    let lower = (steps - 1.0) * step;
    if steps >= 1.0 && lower >= raw {
        lower
    } else {
        steps * step
    }
}

/// Size and weight ceilings shared by compliance families and service brackets.
///
/// A missing limit is unbounded. Values equal to a limit are within it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_girth: Option<f64>,
}

impl SizeLimits {
    /// True when the package is within every declared limit
    pub fn admits(&self, pkg: &Package) -> bool {
        self.violations(pkg).is_empty()
    }

    /// Human-readable list of exceeded limits
    pub fn violations(&self, pkg: &Package) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(max) = self.max_weight {
            if pkg.weight > max {
                out.push(format!("weight {} lb > {} lb", pkg.weight, max));
            }
        }
        if let Some(max) = self.max_length {
            let longest = pkg.longest();
            if longest > max {
                out.push(format!("length {} in > {} in", longest, max));
            }
        }
        if let Some(max) = self.max_girth {
            let girth = pkg.girth();
            if girth > max {
                out.push(format!("girth {} in > {} in", girth, max));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_multiple(value: f64, step: f64) -> bool {
        let n = (value / step).round();
        (n * step - value).abs() < 1e-9
    }

    #[test]
    fn test_dim_weight() {
        let pkg = Package::new(12.0, 10.0, 8.0, 3.0);
        assert!((pkg.dim_weight() - 4.324324).abs() < 1e-5);
    }

    #[test]
    fn test_dim_weight_dominates_and_rounds_up() {
        let pkg = Package::new(12.0, 10.0, 8.0, 3.0);
        assert_eq!(pkg.billable_weight(1.0), 5.0);
    }

    #[test]
    fn test_actual_weight_dominates() {
        let pkg = Package::new(4.0, 4.0, 4.0, 7.2);
        assert_eq!(pkg.billable_weight(1.0), 8.0);
        assert!((pkg.billable_weight(0.1) - 7.2).abs() < 1e-9);
    }

    #[test]
    fn test_precision_default_when_unset() {
        assert_eq!(billable_weight(2.3, 0.0), 3.0);
        assert_eq!(billable_weight(2.3, f64::NAN), 3.0);
    }

    #[test]
    fn test_exact_break_is_not_bumped() {
        assert_eq!(billable_weight(5.0, 1.0), 5.0);
        let b = billable_weight(1.1, 0.1);
        assert!(b >= 1.1);
        assert!((b - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weight() {
        assert_eq!(billable_weight(0.0, 1.0), 0.0);
        assert_eq!(Package::new(0.0, 0.0, 0.0, 0.0).billable_weight(0.1), 0.0);
    }

    #[test]
    fn test_billable_weight_properties_over_grid() {
        let precisions = [0.1, 0.5, 1.0, 2.0];
        for l in [1.0, 6.5, 12.0, 23.7] {
            for wt in [0.2, 1.0, 3.3, 19.9, 70.0] {
                let pkg = Package::new(l, 9.0, 7.5, wt);
                for p in precisions {
                    let b = pkg.billable_weight(p);
                    assert!(b >= pkg.weight, "billable below actual for {:?} p={}", pkg, p);
                    assert!(b >= pkg.rated_weight(), "billable below raw for {:?} p={}", pkg, p);
                    assert!(is_multiple(b, p), "{} is not a multiple of {}", b, p);
                    assert!(b - pkg.rated_weight() < p + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_girth_uses_sorted_dims() {
        let pkg = Package::new(10.0, 30.0, 20.0, 1.0);
        assert_eq!(pkg.longest(), 30.0);
        assert_eq!(pkg.girth(), 30.0 + 2.0 * (20.0 + 10.0));
    }

    #[test]
    fn test_invalid_field() {
        assert!(Package::new(1.0, 1.0, 1.0, 1.0).invalid_field().is_none());
        assert_eq!(
            Package::new(1.0, -2.0, 1.0, 1.0).invalid_field(),
            Some(("width", -2.0))
        );
        let (field, _) = Package::new(1.0, 1.0, 1.0, f64::INFINITY)
            .invalid_field()
            .unwrap();
        assert_eq!(field, "weight");
    }

    #[test]
    fn test_size_limits() {
        let limits = SizeLimits {
            max_weight: Some(20.0),
            max_length: Some(20.0),
            max_girth: None,
        };
        assert!(limits.admits(&Package::new(20.0, 5.0, 5.0, 20.0)));

        let over = Package::new(21.0, 5.0, 5.0, 25.0);
        let v = limits.violations(&over);
        assert_eq!(v.len(), 2);
        assert!(v[0].starts_with("weight"));
        assert!(v[1].starts_with("length"));
        assert!(SizeLimits::default().admits(&over));
    }
}
