//! Surcharges layered on a resolved base price
//!
//! Order matters: residential and signature fees come first, fuel last,
//! because fuel is charged on base + the fees before it.

use serde::{Deserialize, Serialize};

use crate::rates::channel::{FeeSchedule, FuelMode};
use crate::rates::table::AddressClass;

/// Multiplier applied to the fuel rate for `discount_85` channels
pub const FUEL_DISCOUNT: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeKind {
    Residential,
    Signature,
    Fuel,
    /// Fuel is built into the base price; zero amount
    FuelIncluded,
}

/// One labelled surcharge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeLine {
    pub kind: SurchargeKind,
    pub amount: f64,

    /// Effective fuel rate as a fraction (fuel lines only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,

    /// Whether the 85% fuel discount applied
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub discounted: bool,
}

impl std::fmt::Display for SurchargeLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SurchargeKind::Residential => write!(f, "Residential ${:.2}", self.amount),
            SurchargeKind::Signature => write!(f, "Signature ${:.2}", self.amount),
            SurchargeKind::FuelIncluded => write!(f, "Fuel: included"),
            SurchargeKind::Fuel => {
                let tag = if self.discounted { " (85%)" } else { "" };
                write!(
                    f,
                    "Fuel{} {:.2}%: ${:.2}",
                    tag,
                    self.rate.unwrap_or(0.0) * 100.0,
                    self.amount
                )
            }
        }
    }
}

/// Ordered surcharge breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Surcharges {
    pub lines: Vec<SurchargeLine>,
    pub total: f64,
}

impl Surcharges {
    fn push(&mut self, line: SurchargeLine) {
        self.total += line.amount;
        self.lines.push(line);
    }
}

/// Compute surcharges for a base price.
///
/// `fuel_rate_pct` is a percentage (16.0 means 16%).
pub fn calculate(
    base_price: f64,
    address: AddressClass,
    signature: bool,
    fees: &FeeSchedule,
    fuel_mode: FuelMode,
    fuel_rate_pct: f64,
) -> Surcharges {
    let mut out = Surcharges::default();

    if address == AddressClass::Residential && fees.res > 0.0 {
        out.push(SurchargeLine {
            kind: SurchargeKind::Residential,
            amount: fees.res,
            rate: None,
            discounted: false,
        });
    }

    if signature && fees.sig > 0.0 {
        out.push(SurchargeLine {
            kind: SurchargeKind::Signature,
            amount: fees.sig,
            rate: None,
            discounted: false,
        });
    }

    match fuel_mode {
        FuelMode::None => {}
        FuelMode::Included => out.lines.push(SurchargeLine {
            kind: SurchargeKind::FuelIncluded,
            amount: 0.0,
            rate: None,
            discounted: false,
        }),
        FuelMode::Standard | FuelMode::Discount85 => {
            let discounted = fuel_mode == FuelMode::Discount85;
            let mut rate = fuel_rate_pct / 100.0;
            if discounted {
                rate *= FUEL_DISCOUNT;
            }
            let amount = rate * (base_price + out.total);
            out.push(SurchargeLine {
                kind: SurchargeKind::Fuel,
                amount,
                rate: Some(rate),
                discounted,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEES: FeeSchedule = FeeSchedule { res: 2.61, sig: 4.37 };

    #[test]
    fn test_residential_fee_only_for_residential() {
        let s = calculate(10.0, AddressClass::Commercial, false, &FEES, FuelMode::None, 16.0);
        assert!(s.lines.is_empty());
        assert_eq!(s.total, 0.0);

        let s = calculate(10.0, AddressClass::Residential, false, &FEES, FuelMode::None, 16.0);
        assert_eq!(s.lines.len(), 1);
        assert_eq!(s.total, 2.61);
    }

    #[test]
    fn test_zero_fees_are_skipped() {
        let fees = FeeSchedule::default();
        let s = calculate(10.0, AddressClass::Residential, true, &fees, FuelMode::None, 0.0);
        assert!(s.lines.is_empty());
    }

    #[test]
    fn test_discounted_fuel_compounds_on_fees() {
        let base = 20.0;
        let s = calculate(base, AddressClass::Residential, true, &FEES, FuelMode::Discount85, 16.0);
        let expected_fuel = 0.85 * 0.16 * (base + 2.61 + 4.37);

        let kinds: Vec<_> = s.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![SurchargeKind::Residential, SurchargeKind::Signature, SurchargeKind::Fuel]
        );
        let fuel = s.lines.last().unwrap();
        assert!((fuel.amount - expected_fuel).abs() < 1e-9);
        assert!(fuel.discounted);
        assert!((s.total - (2.61 + 4.37 + expected_fuel)).abs() < 1e-9);
    }

    #[test]
    fn test_standard_fuel_example() {
        let fees = FeeSchedule { res: 4.0, sig: 0.0 };
        let s = calculate(12.40, AddressClass::Residential, false, &fees, FuelMode::Standard, 12.0);
        let fuel = &s.lines[1];
        assert!((fuel.amount - 1.968).abs() < 1e-9);
        assert!((12.40 + s.total - 18.368).abs() < 1e-9);
        assert_eq!(fuel.to_string(), "Fuel 12.00%: $1.97");
    }

    #[test]
    fn test_included_fuel_has_no_charge() {
        let s = calculate(10.0, AddressClass::Commercial, false, &FEES, FuelMode::Included, 16.0);
        assert_eq!(s.lines.len(), 1);
        assert_eq!(s.lines[0].kind, SurchargeKind::FuelIncluded);
        assert_eq!(s.total, 0.0);
        assert_eq!(s.lines[0].to_string(), "Fuel: included");
    }

    #[test]
    fn test_labels() {
        let s = calculate(10.0, AddressClass::Residential, true, &FEES, FuelMode::Discount85, 16.0);
        assert_eq!(s.lines[0].to_string(), "Residential $2.61");
        assert_eq!(s.lines[1].to_string(), "Signature $4.37");
        assert!(s.lines[2].to_string().starts_with("Fuel (85%) 13.60%: $"));
    }
}
