use crate::error::{KpiError, Result};
use crate::schema::{CalendarMonth, MonthlyRecord};
use crate::utils::{months_between, months_in_range};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive range of calendar months selected by the caller.
///
/// A range may be constructed with `start` after `end`; [`filter`] rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: CalendarMonth,
    pub end: CalendarMonth,
}

impl PeriodRange {
    pub fn new(start: CalendarMonth, end: CalendarMonth) -> Self {
        Self { start, end }
    }

    pub fn full_year() -> Self {
        Self::new(CalendarMonth::Jan, CalendarMonth::Dec)
    }

    pub fn single(month: CalendarMonth) -> Self {
        Self::new(month, month)
    }

    /// Builds a range from display labels such as `"Fév"` and `"Juin"`.
    /// A label that names no month selects nothing.
    pub fn from_labels(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }

    /// Parses `"Mois"` or `"Début:Fin"`, e.g. `"Mar"` or `"Fév:Juin"`.
    pub fn parse(period: &str) -> Result<Self> {
        if period.trim().is_empty() {
            return Err(KpiError::MalformedPeriod("empty period string".to_string()));
        }
        let parts: Vec<&str> = period.split(':').collect();

        match parts.as_slice() {
            [single] => Ok(Self::single(single.parse()?)),
            [start, end] => Self::from_labels(start, end),
            _ => Err(KpiError::MalformedPeriod(format!(
                "'{}'. Expected 'Mois' or 'Début:Fin'",
                period
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(KpiError::InvalidRangeError {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, month: CalendarMonth) -> bool {
        month >= self.start && month <= self.end
    }

    /// Number of calendar months covered, 0 for an inverted range.
    pub fn len(&self) -> usize {
        (months_between(self.start, self.end) + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn months(&self) -> Vec<CalendarMonth> {
        months_in_range(self.start, self.end)
    }
}

impl Default for PeriodRange {
    fn default() -> Self {
        Self::full_year()
    }
}

impl fmt::Display for PeriodRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// Selects the records whose month lies within `range`, keeping their order.
///
/// Never returns an empty vector: an inverted range is an
/// [`KpiError::InvalidRangeError`] and a range matching no record is an
/// [`KpiError::EmptySelectionError`].
pub fn filter(records: &[MonthlyRecord], range: &PeriodRange) -> Result<Vec<MonthlyRecord>> {
    range.validate()?;

    let selected: Vec<MonthlyRecord> = records
        .iter()
        .filter(|r| range.contains(r.month))
        .cloned()
        .collect();

    if selected.is_empty() {
        return Err(KpiError::EmptySelectionError(format!(
            "no records between {} and {}",
            range.start, range.end
        )));
    }

    trace!("Period {} selected {} records", range, selected.len());
    Ok(selected)
}
