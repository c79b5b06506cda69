use crate::error::{KpiError, Result};
use crate::schema::{BreakevenCategory, BreakevenComponent, CalendarMonth, MonthlyRecord};

/// One row of the monthly table as it is written in the source data,
/// keyed by its display label.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyRow {
    pub label: &'static str,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
}

pub const SAMPLE_MONTHLY: [MonthlyRow; 12] = [
    MonthlyRow {
        label: "Jan",
        revenue: 1600.0,
        cost: 1345.65,
        profit: 254.35,
    },
    MonthlyRow {
        label: "Fév",
        revenue: 1680.0,
        cost: 1412.93,
        profit: 267.07,
    },
    MonthlyRow {
        label: "Mar",
        revenue: 1764.0,
        cost: 1483.58,
        profit: 280.42,
    },
    MonthlyRow {
        label: "Avr",
        revenue: 1852.0,
        cost: 1557.76,
        profit: 294.24,
    },
    MonthlyRow {
        label: "Mai",
        revenue: 1945.0,
        cost: 1635.65,
        profit: 309.35,
    },
    MonthlyRow {
        label: "Juin",
        revenue: 2042.0,
        cost: 1717.43,
        profit: 324.57,
    },
    MonthlyRow {
        label: "Juil",
        revenue: 2144.0,
        cost: 1803.30,
        profit: 340.70,
    },
    MonthlyRow {
        label: "Aoû",
        revenue: 2251.0,
        cost: 1893.47,
        profit: 357.53,
    },
    MonthlyRow {
        label: "Sep",
        revenue: 2364.0,
        cost: 1988.14,
        profit: 375.86,
    },
    MonthlyRow {
        label: "Oct",
        revenue: 2482.0,
        cost: 2087.55,
        profit: 394.45,
    },
    MonthlyRow {
        label: "Nov",
        revenue: 2606.0,
        cost: 2191.93,
        profit: 414.07,
    },
    MonthlyRow {
        label: "Déc",
        revenue: 2736.0,
        cost: 2301.52,
        profit: 434.48,
    },
];

pub const SAMPLE_BREAKEVEN: [(BreakevenCategory, f64); 3] = [
    (BreakevenCategory::FixedCosts, 6399.0),
    (BreakevenCategory::VariableCosts, 9749.0),
    (BreakevenCategory::Margin, 3052.0),
];

/// Converts labelled rows into typed records. Profit is carried over as
/// written, not recomputed; the store validates it afterwards.
pub fn convert_rows(rows: &[MonthlyRow]) -> Result<Vec<MonthlyRecord>> {
    rows.iter()
        .map(|row| {
            Ok(MonthlyRecord {
                month: CalendarMonth::from_label(row.label).ok_or_else(|| {
                    KpiError::DataIntegrityError(format!("unknown month label '{}'", row.label))
                })?,
                revenue: row.revenue,
                cost: row.cost,
                profit: row.profit,
            })
        })
        .collect()
}

pub fn sample_monthly_records() -> Result<Vec<MonthlyRecord>> {
    convert_rows(&SAMPLE_MONTHLY)
}

pub fn sample_breakeven_components() -> Vec<BreakevenComponent> {
    SAMPLE_BREAKEVEN
        .iter()
        .map(|&(category, amount)| BreakevenComponent { category, amount })
        .collect()
}
