//! Derived KPIs over a (possibly filtered) monthly sequence.
//!
//! Every function is pure and returns a finite value or an error; none of
//! them yields `NaN` or an infinity.

use crate::error::{KpiError, Result};
use crate::schema::{
    BreakevenCategory, BreakevenTable, MonthlyRecord, DAYS_PER_MONTH, MONTHS_PER_YEAR,
};

fn ensure_non_empty(records: &[MonthlyRecord], metric: &str) -> Result<()> {
    if records.is_empty() {
        return Err(KpiError::EmptySelectionError(format!(
            "{} requires at least one record",
            metric
        )));
    }
    Ok(())
}

fn checked_ratio(numerator: f64, denominator: f64, metric: &str) -> Result<f64> {
    if !numerator.is_finite() || !denominator.is_finite() {
        return Err(KpiError::NonFiniteValue(metric.to_string()));
    }
    if denominator == 0.0 {
        return Err(KpiError::DivisionByZeroError(metric.to_string()));
    }
    let ratio = numerator / denominator;
    if !ratio.is_finite() {
        return Err(KpiError::NonFiniteValue(metric.to_string()));
    }
    Ok(ratio)
}

/// Sum of revenue. An empty sequence sums to zero.
pub fn annual_revenue(records: &[MonthlyRecord]) -> Result<f64> {
    Ok(records.iter().map(|r| r.revenue).sum())
}

/// Sum of profit. An empty sequence sums to zero.
pub fn net_result(records: &[MonthlyRecord]) -> Result<f64> {
    Ok(records.iter().map(|r| r.profit).sum())
}

/// Net result as a percentage of revenue.
pub fn margin_ratio(records: &[MonthlyRecord]) -> Result<f64> {
    let revenue = annual_revenue(records)?;
    let net = net_result(records)?;
    Ok(checked_ratio(net, revenue, "margin ratio")? * 100.0)
}

/// Fixed costs spread over one month.
pub fn monthly_breakeven(components: &BreakevenTable) -> Result<f64> {
    Ok(components.amount(BreakevenCategory::FixedCosts) / MONTHS_PER_YEAR as f64)
}

/// Days of average revenue needed to cover `monthly_breakeven`.
pub fn breakeven_in_days(monthly_breakeven: f64, records: &[MonthlyRecord]) -> Result<f64> {
    if !monthly_breakeven.is_finite() {
        return Err(KpiError::NonFiniteValue(format!(
            "break-even in days (monthly break-even is {})",
            monthly_breakeven
        )));
    }
    let daily_revenue = average_revenue(records)? / DAYS_PER_MONTH;
    checked_ratio(monthly_breakeven, daily_revenue, "break-even in days")
}

pub fn average_revenue(records: &[MonthlyRecord]) -> Result<f64> {
    ensure_non_empty(records, "average revenue")?;
    Ok(annual_revenue(records)? / records.len() as f64)
}

pub fn average_profit(records: &[MonthlyRecord]) -> Result<f64> {
    ensure_non_empty(records, "average profit")?;
    Ok(net_result(records)? / records.len() as f64)
}

/// Percentage change in revenue from the first to the last record.
pub fn growth_rate(records: &[MonthlyRecord]) -> Result<f64> {
    let (first, last) = match records {
        [] => {
            return Err(KpiError::EmptySelectionError(
                "growth rate requires at least one record".to_string(),
            ))
        }
        [_] => {
            return Err(KpiError::InsufficientDataError {
                required: 2,
                actual: 1,
            })
        }
        [first, .., last] => (first, last),
    };

    Ok((checked_ratio(last.revenue, first.revenue, "growth rate")? - 1.0) * 100.0)
}
