//! Quote engine - prices one package across every configured channel
//!
//! Each channel runs through a fixed sequence of gates: warehouse, compliance,
//! billable weight, zone, service bracket, rate lookup, surcharges. A gate that
//! rejects the channel records an [`Exclusion`]; business exclusions are never
//! errors. Only contract violations (bad numbers, unknown warehouse or tier)
//! fail the whole request.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::rates::book::{RateBook, Warehouse};
use crate::rates::channel::ChannelConfig;
use crate::rates::compliance::ComplianceReport;
use crate::rates::package::Package;
use crate::rates::service::ServiceClass;
use crate::rates::surcharge::{self, SurchargeLine};
use crate::rates::table::{AddressClass, LookupFailure, PriceTable};
use crate::rates::zone::Zone;

/// Request context beside the package itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteContext {
    /// Origin warehouse code
    pub warehouse: String,

    /// Destination ZIP (validated upstream)
    pub zip: String,

    /// Pricing tier
    pub tier: String,

    pub address: AddressClass,

    pub signature: bool,

    /// Fuel surcharge input in percent
    pub fuel_rate: f64,
}

/// Usage-contract violations; the request cannot be evaluated
#[derive(Debug, Error, PartialEq)]
pub enum QuoteError {
    #[error("invalid package {field}: {value} (must be finite and non-negative)")]
    InvalidPackage { field: &'static str, value: f64 },

    #[error("invalid fuel rate {0} (must be finite and non-negative)")]
    InvalidFuelRate(f64),

    #[error("unknown warehouse '{0}'")]
    UnknownWarehouse(String),

    #[error("unknown pricing tier '{0}'")]
    UnknownTier(String),
}

/// Why a channel was not priced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exclusion {
    WarehouseNotServed { warehouse: String },
    ComplianceFailed { family: String },
    NoServiceBracket { label: String },
    NoPriceList,
    NoValidPrice { weight: f64, zone: Zone },
}

impl From<LookupFailure> for Exclusion {
    fn from(f: LookupFailure) -> Self {
        match f {
            LookupFailure::NoPriceList => Exclusion::NoPriceList,
            LookupFailure::NoValidPrice { weight, zone } => Exclusion::NoValidPrice { weight, zone },
        }
    }
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exclusion::WarehouseNotServed { warehouse } => {
                write!(f, "does not ship from warehouse {}", warehouse)
            }
            Exclusion::ComplianceFailed { family } => {
                write!(f, "package exceeds {} limits", family)
            }
            Exclusion::NoServiceBracket { label } => write!(f, "no service bracket ({})", label),
            Exclusion::NoPriceList => write!(f, "no price list"),
            Exclusion::NoValidPrice { weight, zone } => {
                write!(f, "no valid price for weight={}, zone={}", weight, zone)
            }
        }
    }
}

/// A priced channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub channel: String,
    pub zone: Zone,
    pub billable_weight: f64,

    /// Decimal places for displaying the billable weight
    pub weight_decimals: usize,

    pub base_price: f64,

    /// Weight break of the row that priced this quote
    pub weight_break: f64,

    pub price_table: PriceTable,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceClass>,

    pub surcharges: Vec<SurchargeLine>,
    pub surcharge_total: f64,
    pub total: f64,
}

/// A channel that was not priced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedChannel {
    pub channel: String,
    pub reason: Exclusion,
}

/// Outcome for one channel: priced or excluded, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChannelResult {
    Priced(QuoteLineItem),
    Excluded(ExcludedChannel),
}

impl ChannelResult {
    pub fn channel(&self) -> &str {
        match self {
            ChannelResult::Priced(item) => &item.channel,
            ChannelResult::Excluded(ex) => &ex.channel,
        }
    }
}

/// Likely upstream causes when nothing could be priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoQuoteCause {
    OutOfSpecPackage,
    UnservedZip,
    MissingRateData,
    UnsupportedWarehouse,
}

impl NoQuoteCause {
    pub const ALL: [NoQuoteCause; 4] = [
        NoQuoteCause::OutOfSpecPackage,
        NoQuoteCause::UnservedZip,
        NoQuoteCause::MissingRateData,
        NoQuoteCause::UnsupportedWarehouse,
    ];

    fn of(exclusion: &Exclusion) -> &'static [NoQuoteCause] {
        match exclusion {
            Exclusion::WarehouseNotServed { .. } => &[NoQuoteCause::UnsupportedWarehouse],
            Exclusion::ComplianceFailed { .. } | Exclusion::NoServiceBracket { .. } => {
                &[NoQuoteCause::OutOfSpecPackage]
            }
            Exclusion::NoPriceList => &[NoQuoteCause::MissingRateData],
            Exclusion::NoValidPrice { .. } => {
                &[NoQuoteCause::UnservedZip, NoQuoteCause::MissingRateData]
            }
        }
    }
}

impl std::fmt::Display for NoQuoteCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoQuoteCause::OutOfSpecPackage => write!(f, "package exceeds channel size/weight limits"),
            NoQuoteCause::UnservedZip => write!(f, "destination ZIP is outside the service area"),
            NoQuoteCause::MissingRateData => write!(f, "rate data is missing for this tier"),
            NoQuoteCause::UnsupportedWarehouse => {
                write!(f, "the selected warehouse does not support these channels")
            }
        }
    }
}

/// Structured "no quotes" result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoQuotes {
    /// Deduplicated causes, in `NoQuoteCause` declaration order
    pub causes: Vec<NoQuoteCause>,
    pub exclusions: Vec<ExcludedChannel>,
}

impl NoQuotes {
    /// The empty result for a set of channel results, `None` if any was priced
    pub fn from_results(channels: &[ChannelResult]) -> Option<Self> {
        let mut exclusions = Vec::with_capacity(channels.len());
        for result in channels {
            match result {
                ChannelResult::Priced(_) => return None,
                ChannelResult::Excluded(ex) => exclusions.push(ex.clone()),
            }
        }

        let mut causes: Vec<NoQuoteCause> = exclusions
            .iter()
            .flat_map(|ex| NoQuoteCause::of(&ex.reason).iter().copied())
            .collect();
        causes.sort();
        causes.dedup();
        if causes.is_empty() {
            causes = NoQuoteCause::ALL.to_vec();
        }

        Some(NoQuotes { causes, exclusions })
    }
}

/// Full result of one quote request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteOutcome {
    pub tier: String,
    pub address: AddressClass,
    pub fuel_rate: f64,
    pub dim_weight: f64,
    pub compliance: ComplianceReport,

    /// One entry per configured channel, in declaration order
    pub channels: Vec<ChannelResult>,

    /// Present only when no channel was priced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_quotes: Option<NoQuotes>,
}

impl QuoteOutcome {
    pub fn priced(&self) -> Vec<&QuoteLineItem> {
        self.channels
            .iter()
            .filter_map(|r| match r {
                ChannelResult::Priced(item) => Some(item),
                ChannelResult::Excluded(_) => None,
            })
            .collect()
    }

    pub fn excluded(&self) -> Vec<&ExcludedChannel> {
        self.channels
            .iter()
            .filter_map(|r| match r {
                ChannelResult::Excluded(ex) => Some(ex),
                ChannelResult::Priced(_) => None,
            })
            .collect()
    }

    pub fn has_quotes(&self) -> bool {
        self.channels
            .iter()
            .any(|r| matches!(r, ChannelResult::Priced(_)))
    }
}

/// Evaluates quote requests against a borrowed rate book
#[derive(Debug, Clone, Copy)]
pub struct QuoteEngine<'a> {
    book: &'a RateBook,
}

impl<'a> QuoteEngine<'a> {
    pub fn new(book: &'a RateBook) -> Self {
        Self { book }
    }

    /// Quote a package on every channel
    pub fn quote(&self, pkg: &Package, ctx: &QuoteContext) -> Result<QuoteOutcome, QuoteError> {
        if let Some((field, value)) = pkg.invalid_field() {
            return Err(QuoteError::InvalidPackage { field, value });
        }
        if !ctx.fuel_rate.is_finite() || ctx.fuel_rate < 0.0 {
            return Err(QuoteError::InvalidFuelRate(ctx.fuel_rate));
        }
        let origin = self
            .book
            .warehouse(&ctx.warehouse)
            .ok_or_else(|| QuoteError::UnknownWarehouse(ctx.warehouse.clone()))?;
        if !self.book.rates.has_tier(&ctx.tier) {
            return Err(QuoteError::UnknownTier(ctx.tier.clone()));
        }

        let compliance = self.book.compliance.evaluate(pkg);
        let channels: Vec<ChannelResult> = self
            .book
            .channels
            .iter()
            .map(|ch| self.evaluate_channel(ch, pkg, ctx, origin, &compliance))
            .collect();
        let no_quotes = NoQuotes::from_results(&channels);

        Ok(QuoteOutcome {
            tier: ctx.tier.clone(),
            address: ctx.address,
            fuel_rate: ctx.fuel_rate,
            dim_weight: pkg.dim_weight(),
            compliance,
            channels,
            no_quotes,
        })
    }

    /// Run one channel through every gate
    pub fn evaluate_channel(
        &self,
        channel: &ChannelConfig,
        pkg: &Package,
        ctx: &QuoteContext,
        origin: &Warehouse,
        compliance: &ComplianceReport,
    ) -> ChannelResult {
        let name = channel.name.as_str();
        let exclude = |reason: Exclusion| {
            debug!(channel = name, %reason, "channel excluded");
            ChannelResult::Excluded(ExcludedChannel {
                channel: name.to_string(),
                reason,
            })
        };

        if !channel.allows(&ctx.warehouse) {
            return exclude(Exclusion::WarehouseNotServed {
                warehouse: ctx.warehouse.clone(),
            });
        }

        if let Some(family) = &channel.compliance {
            if compliance.is_failed(family) {
                return exclude(Exclusion::ComplianceFailed {
                    family: family.clone(),
                });
            }
        }

        let billable = pkg.billable_weight(channel.weight_precision);
        let zone = self.book.zones.resolve(&ctx.zip, origin, channel);

        let service = match &channel.service_tiers {
            Some(tiers) => {
                let class = tiers.classify(pkg);
                if class.code.is_none() {
                    return exclude(Exclusion::NoServiceBracket { label: class.label });
                }
                Some(class)
            }
            None => None,
        };

        if self.book.rates.sheet(&ctx.tier, name).is_none() {
            warn!(
                channel = name,
                tier = %ctx.tier,
                warehouse = %ctx.warehouse,
                "channel is allowed at this warehouse but the tier has no rate sheet for it"
            );
        }

        let matched = match self.book.rates.lookup(
            &ctx.tier,
            name,
            ctx.address,
            billable,
            zone,
            service.as_ref().and_then(|s| s.code.as_deref()),
        ) {
            Ok(m) => m,
            Err(failure) => return exclude(failure.into()),
        };

        let surcharges = surcharge::calculate(
            matched.price,
            ctx.address,
            ctx.signature,
            &channel.fees,
            channel.fuel_mode,
            ctx.fuel_rate,
        );

        debug!(
            channel = name,
            zone = %zone,
            billable,
            base = matched.price,
            surcharges = surcharges.total,
            "channel priced"
        );

        ChannelResult::Priced(QuoteLineItem {
            channel: name.to_string(),
            zone,
            billable_weight: billable,
            weight_decimals: channel.weight_decimals(),
            base_price: matched.price,
            weight_break: matched.weight_break,
            price_table: matched.table,
            service,
            total: matched.price + surcharges.total,
            surcharge_total: surcharges.total,
            surcharges: surcharges.lines,
        })
    }
}
