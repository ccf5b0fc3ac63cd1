//! Rate resolution domain: packages, channels, zones, rate tables and the
//! quote engine that ties them together

pub mod book;
pub mod channel;
pub mod compliance;
pub mod engine;
pub mod package;
pub mod service;
pub mod surcharge;
pub mod table;
pub mod zone;

pub use book::{IntegrityIssue, RateBook, Warehouse};
pub use channel::{ChannelConfig, FeeSchedule, FuelMode, ZoneSource};
pub use compliance::{ComplianceReport, ComplianceRules, ComplianceStatus};
pub use engine::{
    ChannelResult, ExcludedChannel, Exclusion, NoQuoteCause, NoQuotes, QuoteContext, QuoteEngine,
    QuoteError, QuoteLineItem, QuoteOutcome,
};
pub use package::{Package, SizeLimits};
pub use service::{ServiceBracket, ServiceClass, ServiceTiers};
pub use surcharge::{SurchargeKind, SurchargeLine};
pub use table::{AddressClass, PriceTable, RateRow, RateSheet, RateTables};
pub use zone::{Region, Zone, ZoneTables};
