// File: crates/evolution-core/src/time.rs
// Summary: Calendar-aware tick intervals and multi-resolution labels for the time (x) axis.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};

use crate::scale::tick_step;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;
const MONTH: f64 = 30.0 * DAY;
const YEAR: f64 = 365.0 * DAY;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

/// (unit, step, approximate duration in ms)
const INTERVALS: [(Unit, u32, f64); 17] = [
    (Unit::Second, 1, SECOND),
    (Unit::Second, 5, 5.0 * SECOND),
    (Unit::Second, 15, 15.0 * SECOND),
    (Unit::Second, 30, 30.0 * SECOND),
    (Unit::Minute, 1, MINUTE),
    (Unit::Minute, 5, 5.0 * MINUTE),
    (Unit::Minute, 15, 15.0 * MINUTE),
    (Unit::Minute, 30, 30.0 * MINUTE),
    (Unit::Hour, 1, HOUR),
    (Unit::Hour, 3, 3.0 * HOUR),
    (Unit::Hour, 6, 6.0 * HOUR),
    (Unit::Hour, 12, 12.0 * HOUR),
    (Unit::Day, 1, DAY),
    (Unit::Day, 2, 2.0 * DAY),
    (Unit::Week, 1, WEEK),
    (Unit::Month, 1, MONTH),
    (Unit::Month, 3, 3.0 * MONTH),
];

fn to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms.round() as i64)
}

fn midnight_ms(date: NaiveDate) -> Option<f64> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis() as f64)
}

/// Multiples of `size` ms inside `[lo, hi]`.
fn fixed_ticks(lo: f64, hi: f64, size: f64) -> Vec<f64> {
    let mut out = Vec::new();
    let mut t = (lo / size).ceil() * size;
    while t <= hi {
        out.push(t);
        t += size;
    }
    out
}

/// Roughly `count` tick instants (epoch ms) inside `[start, stop]`, aligned to UTC calendar units.
pub fn time_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 { return Vec::new(); }
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    let target = (hi - lo) / count as f64;
    let i = INTERVALS.partition_point(|&(_, _, d)| d <= target);

    if i == INTERVALS.len() {
        let step = tick_step(lo / YEAR, hi / YEAR, count).max(1.0).round() as i32;
        return year_ticks(lo, hi, step);
    }
    if i == 0 {
        return fixed_ticks(lo, hi, tick_step(lo, hi, count).max(1.0));
    }
    let pick = if target / INTERVALS[i - 1].2 < INTERVALS[i].2 / target { i - 1 } else { i };
    let (unit, step, _) = INTERVALS[pick];
    match unit {
        Unit::Second | Unit::Minute | Unit::Hour | Unit::Day => {
            let size = match unit {
                Unit::Second => SECOND,
                Unit::Minute => MINUTE,
                Unit::Hour => HOUR,
                _ => DAY,
            };
            fixed_ticks(lo, hi, size * step as f64)
        }
        Unit::Week => week_ticks(lo, hi),
        Unit::Month => month_ticks(lo, hi, step),
    }
}

/// Sundays at UTC midnight.
fn week_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let Some(start) = to_datetime(lo) else { return Vec::new() };
    let mut day = start.date_naive();
    let back = day.weekday().num_days_from_sunday() as i64;
    day = day - Duration::days(back);
    let mut out = Vec::new();
    while let Some(t) = midnight_ms(day) {
        if t > hi { break; }
        if t >= lo { out.push(t); }
        day = day + Duration::days(7);
    }
    out
}

fn month_ticks(lo: f64, hi: f64, step: u32) -> Vec<f64> {
    let Some(start) = to_datetime(lo) else { return Vec::new() };
    let (mut y, mut m) = (start.year(), start.month0());
    m -= m % step;
    let mut out = Vec::new();
    loop {
        let Some(t) = NaiveDate::from_ymd_opt(y, m + 1, 1).and_then(midnight_ms) else { break };
        if t > hi { break; }
        if t >= lo { out.push(t); }
        m += step;
        if m >= 12 {
            y += (m / 12) as i32;
            m %= 12;
        }
    }
    out
}

fn year_ticks(lo: f64, hi: f64, step: i32) -> Vec<f64> {
    let (Some(a), Some(b)) = (to_datetime(lo), to_datetime(hi)) else { return Vec::new() };
    let step = step.max(1);
    let mut y = a.year() - a.year().rem_euclid(step);
    let mut out = Vec::new();
    while y <= b.year() {
        if let Some(t) = NaiveDate::from_ymd_opt(y, 1, 1).and_then(midnight_ms) {
            if t >= lo && t <= hi { out.push(t); }
        }
        y += step;
    }
    out
}

/// Label showing the coarsest unit at which the instant is not aligned
/// (".123", ":05", "10:30", "03 PM", "Tue 14", "Mar 09", "March", "2024").
pub fn format_tick(ms: f64) -> String {
    let Some(t) = to_datetime(ms) else { return String::new() };
    let fmt = if t.timestamp_subsec_millis() != 0 {
        "%.3f"
    } else if t.second() != 0 {
        ":%S"
    } else if t.minute() != 0 {
        "%I:%M"
    } else if t.hour() != 0 {
        "%I %p"
    } else if t.day() != 1 {
        if t.weekday().num_days_from_sunday() != 0 { "%a %d" } else { "%b %d" }
    } else if t.month() != 1 {
        "%B"
    } else {
        "%Y"
    };
    t.format(fmt).to_string()
}

/// `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_iso(ms: f64) -> String {
    to_datetime(ms).map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()).unwrap_or_default()
}
