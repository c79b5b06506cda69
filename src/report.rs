use crate::engine::MetricsEngine;
use crate::error::Result;
use crate::formatting::{format_days, format_euro, format_percent};
use crate::period::{filter, PeriodRange};
use crate::schema::{BreakevenTable, MonthlyRecord};
use serde::Serialize;

/// Whole-dataset indicators shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiReport {
    pub annual_revenue: f64,
    pub net_result: f64,
    /// Net result over revenue, in percent.
    pub margin_ratio: f64,
    pub monthly_breakeven: f64,
    pub breakeven_days: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedKpis {
    pub annual_revenue: String,
    pub net_result: String,
    pub margin_ratio: String,
    pub monthly_breakeven: String,
    pub breakeven_days: String,
}

impl KpiReport {
    pub fn compute(
        engine: &MetricsEngine,
        records: &[MonthlyRecord],
        breakeven: &BreakevenTable,
    ) -> Result<Self> {
        let monthly_breakeven = engine.monthly_breakeven(breakeven)?;

        Ok(Self {
            annual_revenue: engine.annual_revenue(records)?,
            net_result: engine.net_result(records)?,
            margin_ratio: engine.margin_ratio(records)?,
            monthly_breakeven,
            breakeven_days: engine.breakeven_in_days(monthly_breakeven, records)?,
        })
    }

    pub fn render(&self) -> Result<RenderedKpis> {
        Ok(RenderedKpis {
            annual_revenue: format_euro(self.annual_revenue)?,
            net_result: format_euro(self.net_result)?,
            margin_ratio: format_percent(self.margin_ratio, 1)?,
            monthly_breakeven: format_euro(self.monthly_breakeven)?,
            breakeven_days: format_days(self.breakeven_days)?,
        })
    }
}

/// Indicators for a user-selected range of months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub range: PeriodRange,
    pub months: usize,
    pub average_profit: f64,
    pub average_revenue: f64,
    /// First-to-last revenue change, in percent.
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPeriod {
    pub range: String,
    pub average_profit: String,
    pub average_revenue: String,
    pub growth_rate: String,
}

impl PeriodReport {
    /// Filters `records` to `range` and computes the range-scoped aggregates.
    ///
    /// A single-month range fails on the growth rate with
    /// [`crate::KpiError::InsufficientDataError`].
    pub fn compute(
        engine: &MetricsEngine,
        records: &[MonthlyRecord],
        range: &PeriodRange,
    ) -> Result<Self> {
        let selected = filter(records, range)?;

        Ok(Self {
            range: *range,
            months: selected.len(),
            average_profit: engine.average_profit(&selected)?,
            average_revenue: engine.average_revenue(&selected)?,
            growth_rate: engine.growth_rate(&selected)?,
        })
    }

    pub fn render(&self) -> Result<RenderedPeriod> {
        Ok(RenderedPeriod {
            range: self.range.to_string(),
            average_profit: format_euro(self.average_profit)?,
            average_revenue: format_euro(self.average_revenue)?,
            growth_rate: format_percent(self.growth_rate, 1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{sample_breakeven_components, sample_monthly_records};
    use crate::error::KpiError;
    use crate::schema::CalendarMonth;

    fn sample_table() -> BreakevenTable {
        BreakevenTable::try_from_components(sample_breakeven_components()).unwrap()
    }

    #[test]
    fn test_headline_kpis_for_sample_year() {
        let engine = MetricsEngine::new();
        let records = sample_monthly_records().unwrap();
        let report = KpiReport::compute(&engine, &records, &sample_table()).unwrap();

        assert_eq!(report.annual_revenue, 25466.0);
        assert!((report.net_result - 4047.09).abs() < 1e-6);
        assert_eq!(report.monthly_breakeven, 533.25);

        let rendered = report.render().unwrap();
        assert_eq!(rendered.annual_revenue, "25 466,00 €");
        assert_eq!(rendered.net_result, "4 047,09 €");
        assert_eq!(rendered.margin_ratio, "15.9%");
        assert_eq!(rendered.monthly_breakeven, "533,25 €");
        assert_eq!(rendered.breakeven_days, "7.54 jours");
    }

    #[test]
    fn test_period_report_for_second_quarter() {
        let engine = MetricsEngine::new();
        let records = sample_monthly_records().unwrap();
        let range = PeriodRange::new(CalendarMonth::Apr, CalendarMonth::Jun);
        let report = PeriodReport::compute(&engine, &records, &range).unwrap();

        assert_eq!(report.months, 3);
        assert!((report.average_revenue - (1852.0 + 1945.0 + 2042.0) / 3.0).abs() < 1e-9);
        assert!((report.growth_rate - (2042.0 / 1852.0 - 1.0) * 100.0).abs() < 1e-9);

        let rendered = report.render().unwrap();
        assert_eq!(rendered.range, "Avr:Juin");
        assert_eq!(rendered.average_revenue, "1 946,33 €");
        assert_eq!(rendered.growth_rate, "10.3%");
    }

    #[test]
    fn test_period_report_propagates_errors() {
        let engine = MetricsEngine::new();
        let records = sample_monthly_records().unwrap();

        let inverted = PeriodRange::new(CalendarMonth::Dec, CalendarMonth::Jan);
        assert!(matches!(
            PeriodReport::compute(&engine, &records, &inverted),
            Err(KpiError::InvalidRangeError { .. })
        ));

        let single = PeriodRange::single(CalendarMonth::Mar);
        assert!(matches!(
            PeriodReport::compute(&engine, &records, &single),
            Err(KpiError::InsufficientDataError { .. })
        ));
    }
}
