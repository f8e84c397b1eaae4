//! Straight-line depreciation of asset cost over its useful life.

use chrono::Datelike;

use crate::types::Date;

/// Current book value of an asset.
///
/// Value declines linearly from `cost` on the purchase date to zero after
/// `useful_life_years`. Dates before purchase yield the full cost; a zero or
/// negative lifespan yields zero once purchased.
pub fn book_value(cost: f64, useful_life_years: i32, purchase_date: Date, as_of: Date) -> f64 {
    if as_of <= purchase_date {
        return cost;
    }
    if useful_life_years <= 0 {
        return 0.0;
    }
    let end = add_years(purchase_date, useful_life_years);
    if as_of >= end {
        return 0.0;
    }
    let total_days = (end - purchase_date).num_days() as f64;
    let elapsed_days = (as_of - purchase_date).num_days() as f64;
    let remaining = cost * (1.0 - elapsed_days / total_days);
    (remaining * 100.0).round() / 100.0
}

/// Add whole years, clamping Feb 29 to Feb 28 when needed.
fn add_years(date: Date, years: i32) -> Date {
    let year = date.year() + years;
    date.with_year(year)
        .or_else(|| Date::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}
