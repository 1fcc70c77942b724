use chrono::{DateTime, Days, Duration, Local, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone};

/// Formats accepted for day arguments.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Returns today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a `YYYY-MM-DD` day argument.
pub fn parse_day(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
}

/// Unix milliseconds of the first instant of `day` in local time.
///
/// When midnight falls in a DST gap the first valid instant after the gap is used.
pub fn local_midnight(day: NaiveDate) -> i64 {
    midnight_in(&Local, day)
}

/// Unix milliseconds of the first instant of `day` in `tz`.
pub fn midnight_in<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> i64 {
    let naive = day.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        LocalResult::None => {
            // Skip forward hour by hour until we leave the gap.
            (1..=3)
                .filter_map(|h| naive.checked_add_signed(Duration::hours(h)))
                .filter_map(|later| tz.from_local_datetime(&later).earliest())
                .map(|dt| dt.timestamp_millis())
                .next()
                .unwrap_or_else(|| naive.and_utc().timestamp_millis())
        }
    }
}

/// The local calendar date a unix-millisecond timestamp falls on.
///
/// Timestamps outside the representable range map to `NaiveDate::MIN`.
pub fn day_of(millis: i64) -> NaiveDate {
    day_in(&Local, millis)
}

/// The calendar date in `tz` a unix-millisecond timestamp falls on.
pub fn day_in<Tz: TimeZone>(tz: &Tz, millis: i64) -> NaiveDate {
    let Some(utc) = DateTime::from_timestamp_millis(millis) else {
        return NaiveDate::MIN;
    };
    let naive = utc.naive_utc();
    let offset = tz.offset_from_utc_datetime(&naive).fix();
    naive
        .checked_add_offset(offset)
        .map(|local| local.date())
        .unwrap_or(NaiveDate::MIN)
}

/// Unix milliseconds of the current instant.
pub fn now_millis() -> i64 {
    Local::now().timestamp_millis()
}

/// The seven consecutive days starting at `start`.
pub fn week_from(start: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take(7).collect()
}

/// Shifts `day` by a signed number of days, saturating at the calendar bounds.
pub fn shift(day: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        day.checked_add_days(magnitude)
    } else {
        day.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(day)
}
