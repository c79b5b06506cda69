use crate::schema::{CalendarMonth, MonthlyRecord};

/// All months from `start` to `end` inclusive, in calendar order.
/// Returns an empty list when `start` comes after `end`.
pub fn months_in_range(start: CalendarMonth, end: CalendarMonth) -> Vec<CalendarMonth> {
    CalendarMonth::ALL
        .iter()
        .copied()
        .filter(|m| *m >= start && *m <= end)
        .collect()
}

/// Signed distance in months; negative when `end` precedes `start`.
pub fn months_between(start: CalendarMonth, end: CalendarMonth) -> i32 {
    end.ordinal() as i32 - start.ordinal() as i32
}

/// True when months strictly increase along the slice (no duplicates, no
/// reordering).
pub fn is_calendar_ordered(records: &[MonthlyRecord]) -> bool {
    records.windows(2).all(|w| w[0].month < w[1].month)
}

/// Inserts `separator` between groups of three digits, counted from the right.
pub fn group_thousands(digits: &str, separator: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(c);
    }
    grouped
}
