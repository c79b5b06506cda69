//! # Financial KPI Core
//!
//! Computes a small set of financial indicators from a monthly time series:
//! revenue, net result, margin ratio, monthly break-even, break-even in days
//! and growth rate, with French euro formatting and month-range filtering.
//!
//! ## Core Concepts
//!
//! - **DataStore**: the monthly table and the break-even table, validated once
//!   and shared for the lifetime of the process
//! - **Metrics**: pure aggregate functions, memoized by [`MetricsEngine`]
//! - **PeriodRange**: an inclusive range of calendar months compared by
//!   ordinal, never by label
//! - **Formatting**: `2736.0` renders as `"2 736,00 €"`; non-finite input is
//!   an error, never a placeholder
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_kpi_core::*;
//!
//! let headline = headline_kpis()?.render()?;
//! assert_eq!(headline.annual_revenue, "25 466,00 €");
//!
//! let range = PeriodRange::parse("Fév:Juin")?;
//! let sidebar = period_kpis(&range)?.render()?;
//! println!("CA moyen: {}", sidebar.average_revenue);
//! ```

pub mod dataset;
pub mod engine;
pub mod error;
pub mod formatting;
pub mod metrics;
pub mod period;
pub mod report;
pub mod schema;
pub mod store;
pub mod utils;

pub use engine::{CacheStats, Metric, MetricsEngine};
pub use error::{KpiError, Result};
pub use formatting::{format_days, format_euro, format_percent, CurrencyFormatter};
pub use period::{filter, PeriodRange};
pub use report::{KpiReport, PeriodReport, RenderedKpis, RenderedPeriod};
pub use schema::*;
pub use store::{breakeven_components, monthly_records, DataStore, DetailRow};

use log::debug;

/// Whole-year indicators over the canonical dataset, through the shared
/// engine.
pub fn headline_kpis() -> Result<KpiReport> {
    let store = DataStore::global()?;
    let report = KpiReport::compute(
        MetricsEngine::global(),
        store.monthly_records(),
        store.breakeven_components(),
    )?;
    debug!(
        "Headline KPIs: revenue {}, margin {:.1}%",
        report.annual_revenue, report.margin_ratio
    );
    Ok(report)
}

/// Range-scoped indicators over the canonical dataset.
pub fn period_kpis(range: &PeriodRange) -> Result<PeriodReport> {
    let store = DataStore::global()?;
    PeriodReport::compute(MetricsEngine::global(), store.monthly_records(), range)
}
