//! Service classification for size-tiered channels
//!
//! Large-parcel carriers price by sub-service (e.g. AH / OS / OM) chosen from
//! the package's size and actual weight. Brackets are tried in declaration
//! order and the first one that admits the package wins; a package that fits
//! none gets no service code and the channel is not priced.

use serde::{Deserialize, Serialize};

use crate::rates::package::{Package, SizeLimits};

/// One size/weight bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBracket {
    /// Service code matched against rate rows
    pub code: String,

    /// Display label
    pub label: String,

    #[serde(flatten)]
    pub limits: SizeLimits,
}

/// Ordered bracket list for a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTiers {
    pub brackets: Vec<ServiceBracket>,

    /// Label shown when no bracket matches
    #[serde(default = "default_unmatched_label")]
    pub unmatched_label: String,
}

fn default_unmatched_label() -> String {
    "exceeds service brackets".to_string()
}

/// Result of classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceClass {
    pub code: Option<String>,
    pub label: String,
}

impl ServiceTiers {
    pub fn new(brackets: Vec<ServiceBracket>) -> Self {
        Self {
            brackets,
            unmatched_label: default_unmatched_label(),
        }
    }

    /// Pick the first bracket admitting the package
    pub fn classify(&self, pkg: &Package) -> ServiceClass {
        match self.brackets.iter().find(|b| b.limits.admits(pkg)) {
            Some(bracket) => ServiceClass {
                code: Some(bracket.code.clone()),
                label: bracket.label.clone(),
            },
            None => ServiceClass {
                code: None,
                label: self.unmatched_label.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket(code: &str, len: f64, girth: f64, wt: f64) -> ServiceBracket {
        ServiceBracket {
            code: code.to_string(),
            label: format!("{} service", code),
            limits: SizeLimits {
                max_weight: Some(wt),
                max_length: Some(len),
                max_girth: Some(girth),
            },
        }
    }

    fn xl_tiers() -> ServiceTiers {
        ServiceTiers::new(vec![
            bracket("AH", 96.0, 130.0, 150.0),
            bracket("OS", 108.0, 165.0, 150.0),
            bracket("OM", 144.0, 225.0, 200.0),
        ])
    }

    #[test]
    fn test_smallest_bracket_first() {
        let class = xl_tiers().classify(&Package::new(48.0, 20.0, 10.0, 60.0));
        assert_eq!(class.code.as_deref(), Some("AH"));
        assert_eq!(class.label, "AH service");
    }

    #[test]
    fn test_girth_pushes_to_next_bracket() {
        // girth = 100 + 2*(20+20) = 180 -> only OM
        let class = xl_tiers().classify(&Package::new(100.0, 20.0, 20.0, 100.0));
        assert_eq!(class.code.as_deref(), Some("OM"));
    }

    #[test]
    fn test_weight_pushes_to_om() {
        let class = xl_tiers().classify(&Package::new(40.0, 20.0, 10.0, 180.0));
        assert_eq!(class.code.as_deref(), Some("OM"));
    }

    #[test]
    fn test_no_bracket() {
        let class = xl_tiers().classify(&Package::new(150.0, 10.0, 10.0, 50.0));
        assert!(class.code.is_none());
        assert_eq!(class.label, "exceeds service brackets");
    }

    #[test]
    fn test_overlapping_brackets_use_declaration_order() {
        let tiers = ServiceTiers::new(vec![
            bracket("WIDE", 200.0, 400.0, 500.0),
            bracket("AH", 96.0, 130.0, 150.0),
        ]);
        let class = tiers.classify(&Package::new(10.0, 10.0, 10.0, 5.0));
        assert_eq!(class.code.as_deref(), Some("WIDE"));
    }

    #[test]
    fn test_bracket_yaml_is_flat() {
        let yaml = "code: AH\nlabel: AH large\nmax_length: 96\nmax_girth: 130\nmax_weight: 150\n";
        let b: ServiceBracket = serde_yml::from_str(yaml).unwrap();
        assert_eq!(b.limits.max_girth, Some(130.0));
    }
}
