//! Cycle-based reset scheduling.
//!
//! A counter's cycle is answered two different ways and the two must stay
//! separate:
//!
//! - **Forward-looking** ([`Schedule`], [`next_occurrence`]): the next
//!   calendar-aligned instant a cycle fires, in local wall-clock time. Used to
//!   tell the user *when* a configured cycle will next reset.
//! - **Elapsed-interval** ([`reset_interval`], [`is_due_since`], [`is_due`]):
//!   whether enough time has passed since the counter file was last written.
//!   This is what actually decides a reset.

use std::path::Path;

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone,
    Timelike, Utc, Weekday,
};
use tracing::debug;

use crate::error::{CounterError, Result};

/// Hour of day (local) at which weekly, monthly and annual cycles fire.
pub const ANCHOR_HOUR: u32 = 3;

/// Elapsed-interval thresholds in minutes, keyed by cycle name.
pub const NAMED_INTERVALS: &[(&str, i64)] = &[
    ("unas", 1),
    ("tres", 3),
    ("quinhora", 5),
    ("sex", 6),
    ("novem", 9),
    ("quarhora", 15),
    ("semhora", 30),
    ("trihora", 45),
    ("hourly", 60),
    ("daily", 1_440),
    ("weekly", 10_080),
    ("biweekly", 20_160),
    ("monthly", 43_200),
    ("bimonthly", 86_400),
    ("quarterly", 129_600),
    ("semiannual", 259_200),
    ("annually", 525_600),
];

/// Cycle kinds understood by [`Schedule::parse`].
pub const CALENDAR_KINDS: &[&str] = &["hourly", "daily", "weekly", "monthly", "annually"];

// ── Forward-looking schedule ────────────────────────────────────────

/// A calendar-aligned recurrence parsed from a cycle kind and its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Minutes past every hour.
    Hourly { minute: u32 },
    /// Fixed time of day.
    Daily { hour: u32, minute: u32 },
    /// Weekday at [`ANCHOR_HOUR`].
    Weekly { weekday: Weekday },
    /// Day of month at [`ANCHOR_HOUR`], clamped to the month's length.
    Monthly { day: u32 },
    /// Month and day at [`ANCHOR_HOUR`]; Feb 29 clamps to Feb 28 off leap years.
    Annually { month: u32, day: u32 },
}

impl Schedule {
    /// Parse a cycle kind and its `in` parameter.
    ///
    /// The kind is case-insensitive. Parameters are never defaulted: anything
    /// out of range or unparseable is an [`CounterError::InvalidParameter`].
    pub fn parse(cycle: &str, param: &str) -> Result<Self> {
        let raw = param;
        let param = param.trim();
        let invalid = |reason: &str| CounterError::invalid_parameter(cycle, raw, reason);

        match cycle.trim().to_ascii_lowercase().as_str() {
            "hourly" => {
                let minute = parse_bounded(param, 0, 59)
                    .ok_or_else(|| invalid("expected minutes past the hour (0-59)"))?;
                Ok(Schedule::Hourly { minute })
            }
            "daily" => match param {
                "noon" => Ok(Schedule::Daily { hour: 12, minute: 0 }),
                "midnight" => Ok(Schedule::Daily { hour: 0, minute: 0 }),
                _ => {
                    let (hour, minute) = parse_time_of_day(param)
                        .ok_or_else(|| invalid("expected noon, midnight or HH:MM"))?;
                    Ok(Schedule::Daily { hour, minute })
                }
            },
            "weekly" => {
                let weekday = parse_weekday(param).ok_or_else(|| invalid("expected a weekday name"))?;
                Ok(Schedule::Weekly { weekday })
            }
            "monthly" => {
                let day = parse_bounded(param, 1, 31)
                    .ok_or_else(|| invalid("expected a day of month (1-31)"))?;
                Ok(Schedule::Monthly { day })
            }
            "annually" => {
                let mut parts = param.split('-');
                let (month, day) = match (parts.next(), parts.next(), parts.next()) {
                    (Some(month), Some(day), None) => (month, day),
                    _ => return Err(invalid("expected MM-DD")),
                };
                let month =
                    parse_bounded(month, 1, 12).ok_or_else(|| invalid("month must be 1-12"))?;
                // 2024 is a leap year, so Feb 29 is accepted here.
                let day = parse_bounded(day, 1, days_in_month(2024, month))
                    .ok_or_else(|| invalid("day does not exist in that month"))?;
                Ok(Schedule::Annually { month, day })
            }
            _ => Err(CounterError::UnknownCycleKind(cycle.to_string())),
        }
    }

    /// Cycle kind name this schedule was parsed from.
    pub fn kind(&self) -> &'static str {
        match self {
            Schedule::Hourly { .. } => "hourly",
            Schedule::Daily { .. } => "daily",
            Schedule::Weekly { .. } => "weekly",
            Schedule::Monthly { .. } => "monthly",
            Schedule::Annually { .. } => "annually",
        }
    }

    /// The first occurrence strictly after `now`, in `now`'s timezone.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<DateTime<Tz>> {
        let tz = now.timezone();
        let local = now.naive_local();
        let today = local.date();

        let next = match *self {
            Schedule::Hourly { minute } => {
                let mut mark = today
                    .and_hms_opt(local.hour(), minute, 0)
                    .map(|naive| resolve_local(&tz, naive))
                    .ok_or_else(|| self.out_of_range())?;
                // A repeated hour resolves to its first pass, which can be
                // more than an hour behind `now`.
                while mark <= *now {
                    mark = mark + Duration::hours(1);
                }
                mark
            }
            Schedule::Daily { hour, minute } => {
                let at = |date: NaiveDate| {
                    date.and_hms_opt(hour, minute, 0)
                        .map(|naive| resolve_local(&tz, naive))
                };
                let mark = at(today).ok_or_else(|| self.out_of_range())?;
                if mark <= *now {
                    today
                        .succ_opt()
                        .and_then(at)
                        .ok_or_else(|| self.out_of_range())?
                } else {
                    mark
                }
            }
            Schedule::Weekly { weekday } => {
                let mut date = today;
                while date.weekday() != weekday {
                    date = date.succ_opt().ok_or_else(|| self.out_of_range())?;
                }
                let mark = anchor(&tz, date).ok_or_else(|| self.out_of_range())?;
                if mark <= *now {
                    date.checked_add_signed(Duration::days(7))
                        .and_then(|date| anchor(&tz, date))
                        .ok_or_else(|| self.out_of_range())?
                } else {
                    mark
                }
            }
            Schedule::Monthly { day } => {
                let (year, month) = (today.year(), today.month());
                let mark = calendar_date(year, month, day)
                    .and_then(|date| anchor(&tz, date))
                    .ok_or_else(|| self.out_of_range())?;
                if mark <= *now {
                    let (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
                    calendar_date(year, month, day)
                        .and_then(|date| anchor(&tz, date))
                        .ok_or_else(|| self.out_of_range())?
                } else {
                    mark
                }
            }
            Schedule::Annually { month, day } => {
                let year = today.year();
                let mark = calendar_date(year, month, day)
                    .and_then(|date| anchor(&tz, date))
                    .ok_or_else(|| self.out_of_range())?;
                if mark <= *now {
                    calendar_date(year + 1, month, day)
                        .and_then(|date| anchor(&tz, date))
                        .ok_or_else(|| self.out_of_range())?
                } else {
                    mark
                }
            }
        };

        Ok(next)
    }

    fn param(&self) -> String {
        match *self {
            Schedule::Hourly { minute } => minute.to_string(),
            Schedule::Daily { hour, minute } => format!("{hour:02}:{minute:02}"),
            Schedule::Weekly { weekday } => weekday.to_string(),
            Schedule::Monthly { day } => day.to_string(),
            Schedule::Annually { month, day } => format!("{month:02}-{day:02}"),
        }
    }

    fn out_of_range(&self) -> CounterError {
        CounterError::invalid_parameter(self.kind(), &self.param(), "date out of range")
    }
}

/// Next local occurrence of a calendar cycle, for display.
pub fn next_occurrence(cycle: &str, param: &str) -> Result<DateTime<Local>> {
    Schedule::parse(cycle, param)?.next_after(&Local::now())
}

/// Whether `cycle` has a calendar form understood by [`Schedule::parse`].
pub fn is_calendar_kind(cycle: &str) -> bool {
    let cycle = cycle.trim().to_ascii_lowercase();
    CALENDAR_KINDS.contains(&cycle.as_str())
}

fn parse_bounded(raw: &str, min: u32, max: u32) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (min..=max).contains(n))
}

fn parse_time_of_day(raw: &str) -> Option<(u32, u32)> {
    let (hour, minute) = raw.split_once(':')?;
    if minute.len() != 2 {
        return None;
    }
    Some((parse_bounded(hour, 0, 23)?, parse_bounded(minute, 0, 59)?))
}

fn parse_weekday(raw: &str) -> Option<Weekday> {
    match raw.to_ascii_lowercase().as_str() {
        "sunday" => Some(Weekday::Sun),
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        _ => None,
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}

fn anchor<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    date.and_hms_opt(ANCHOR_HOUR, 0, 0)
        .map(|naive| resolve_local(tz, naive))
}

/// Map a wall-clock time to an instant.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// fall into a gap (clocks going forward) are measured from the hour before
/// the gap, so 02:30 in a 02:00-03:00 gap becomes 03:30.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) => at,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive - Duration::hours(1)))
            .earliest()
            .map(|before| before + Duration::hours(1))
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

// ── Elapsed-interval reset decision ─────────────────────────────────

/// Minimum elapsed time after which a counter with this cycle is reset.
///
/// Named kinds come from [`NAMED_INTERVALS`]; `every` takes its minute count
/// from `param`, and `<N>min` kinds (e.g. `90min`) carry it in the name.
pub fn reset_interval(cycle: &str, param: &str) -> Result<Duration> {
    let kind = cycle.trim().to_ascii_lowercase();

    if let Some(&(_, minutes)) = NAMED_INTERVALS.iter().find(|(name, _)| *name == kind) {
        return Ok(Duration::minutes(minutes));
    }

    let raw = if kind == "every" {
        param
    } else if let Some(count) = kind.strip_suffix("min") {
        count
    } else {
        return Err(CounterError::UnknownCycleKind(cycle.to_string()));
    };

    let minutes: i64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
        CounterError::invalid_parameter(cycle, param, format!("minute count {raw:?}: {e}"))
    })?;
    if minutes <= 0 {
        return Err(CounterError::invalid_parameter(
            cycle,
            param,
            "interval must be a positive number of minutes",
        ));
    }
    Duration::try_minutes(minutes)
        .ok_or_else(|| CounterError::invalid_parameter(cycle, param, "interval too large"))
}

/// Whether a counter last written at `last_modified` is due for reset at `now`.
pub fn is_due_since(
    last_modified: DateTime<Utc>,
    now: DateTime<Utc>,
    cycle: &str,
    param: &str,
) -> Result<bool> {
    let interval = reset_interval(cycle, param)?;
    Ok(now.signed_duration_since(last_modified) >= interval)
}

/// Whether the counter stored at `path` is due for reset now.
///
/// A missing file is always due; resetting a counter that does not exist
/// yet changes nothing.
pub fn is_due(path: &Path, cycle: &str, param: &str) -> Result<bool> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(CounterError::read(path, e)),
    };
    let modified = metadata
        .modified()
        .map_err(|e| CounterError::read(path, e))?;

    let due = is_due_since(DateTime::<Utc>::from(modified), Utc::now(), cycle, param)?;
    debug!(path = %path.display(), cycle, param, due, "checked cycle");
    Ok(due)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
    }

    fn next(cycle: &str, param: &str, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        Schedule::parse(cycle, param).unwrap().next_after(&now).unwrap()
    }

    // -- Schedule::next_after ---------------------------------------------

    #[test]
    fn hourly_before_mark_uses_current_hour() {
        assert_eq!(next("hourly", "30", at(2024, 5, 15, 10, 15)), at(2024, 5, 15, 10, 30));
    }

    #[test]
    fn hourly_after_mark_rolls_to_next_hour() {
        assert_eq!(next("hourly", "30", at(2024, 5, 15, 10, 45)), at(2024, 5, 15, 11, 30));
    }

    #[test]
    fn hourly_exactly_on_mark_rolls_forward() {
        assert_eq!(next("hourly", "30", at(2024, 5, 15, 10, 30)), at(2024, 5, 15, 11, 30));
    }

    #[test]
    fn hourly_rolls_over_midnight() {
        assert_eq!(next("hourly", "0", at(2024, 12, 31, 23, 5)), at(2025, 1, 1, 0, 0));
    }

    #[test]
    fn daily_noon_and_midnight_tokens() {
        assert_eq!(next("daily", "noon", at(2024, 5, 15, 9, 0)), at(2024, 5, 15, 12, 0));
        assert_eq!(next("daily", "noon", at(2024, 5, 15, 13, 0)), at(2024, 5, 16, 12, 0));
        assert_eq!(next("daily", "midnight", at(2024, 5, 15, 9, 0)), at(2024, 5, 16, 0, 0));
    }

    #[test]
    fn daily_time_of_day() {
        assert_eq!(next("daily", "07:05", at(2024, 5, 15, 7, 0)), at(2024, 5, 15, 7, 5));
        assert_eq!(next("daily", "07:05", at(2024, 5, 15, 8, 0)), at(2024, 5, 16, 7, 5));
        assert_eq!(next("daily", "23:59", at(2024, 2, 28, 23, 59)), at(2024, 2, 29, 23, 59));
    }

    #[test]
    fn weekly_advances_to_weekday_at_anchor() {
        // 2024-05-15 is a Wednesday.
        assert_eq!(next("weekly", "monday", at(2024, 5, 15, 12, 0)), at(2024, 5, 20, 3, 0));
        assert_eq!(next("weekly", "Wednesday", at(2024, 5, 15, 1, 0)), at(2024, 5, 15, 3, 0));
        assert_eq!(next("weekly", "wednesday", at(2024, 5, 15, 4, 0)), at(2024, 5, 22, 3, 0));
    }

    #[test]
    fn monthly_rolls_to_next_month() {
        assert_eq!(next("monthly", "15", at(2024, 5, 10, 0, 0)), at(2024, 5, 15, 3, 0));
        assert_eq!(next("monthly", "15", at(2024, 5, 20, 0, 0)), at(2024, 6, 15, 3, 0));
        assert_eq!(next("monthly", "1", at(2024, 12, 2, 0, 0)), at(2025, 1, 1, 3, 0));
    }

    #[test]
    fn monthly_clamps_to_month_length() {
        assert_eq!(next("monthly", "31", at(2024, 4, 10, 0, 0)), at(2024, 4, 30, 3, 0));
        assert_eq!(next("monthly", "31", at(2024, 1, 31, 4, 0)), at(2024, 2, 29, 3, 0));
    }

    #[test]
    fn annually_this_year_or_next() {
        assert_eq!(next("annually", "12-25", at(2024, 6, 1, 0, 0)), at(2024, 12, 25, 3, 0));
        assert_eq!(next("annually", "12-25", at(2024, 12, 26, 0, 0)), at(2025, 12, 25, 3, 0));
    }

    #[test]
    fn annually_leap_day_clamps_off_leap_years() {
        assert_eq!(next("annually", "02-29", at(2025, 1, 10, 0, 0)), at(2025, 2, 28, 3, 0));
        assert_eq!(next("annually", "02-29", at(2024, 1, 10, 0, 0)), at(2024, 2, 29, 3, 0));
    }

    #[test]
    fn next_is_always_strictly_after_now() {
        let cases = [
            ("hourly", "0"),
            ("hourly", "59"),
            ("daily", "noon"),
            ("daily", "midnight"),
            ("daily", "03:00"),
            ("weekly", "sunday"),
            ("weekly", "friday"),
            ("monthly", "1"),
            ("monthly", "31"),
            ("annually", "01-01"),
            ("annually", "12-31"),
        ];
        let nows = [
            at(2024, 1, 1, 0, 0),
            at(2024, 2, 29, 3, 0),
            at(2024, 6, 15, 12, 0),
            at(2024, 12, 31, 23, 59),
        ];
        for (cycle, param) in cases {
            for now in nows {
                let got = next(cycle, param, now);
                assert!(got > now, "{cycle} {param} at {now}: got {got}");
            }
        }
    }

    #[test]
    fn local_next_occurrence_is_in_the_future() {
        let before = Local::now();
        let got = next_occurrence("hourly", "30").unwrap();
        assert!(got > before);
        assert!(got - before <= Duration::hours(1));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let cases = [
            ("hourly", "invalid"),
            ("hourly", "60"),
            ("hourly", "-1"),
            ("daily", "25"),
            ("daily", "25:00"),
            ("daily", "12:5"),
            ("daily", ""),
            ("weekly", "funday"),
            ("weekly", "mon"),
            ("monthly", "45"),
            ("monthly", "0"),
            ("annually", "13-32"),
            ("annually", "13-01"),
            ("annually", "02-30"),
            ("annually", "12"),
            ("annually", "12-25-01"),
            ("daily", " 25 "),
            ("monthly", "\t0\n"),
        ];
        for (cycle, param) in cases {
            match Schedule::parse(cycle, param) {
                Err(CounterError::InvalidParameter { cycle: c, param: p, .. }) => {
                    assert_eq!(c, cycle);
                    assert_eq!(p, param);
                }
                other => panic!("{cycle} {param:?}: expected InvalidParameter, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_calendar_kind() {
        assert!(matches!(
            Schedule::parse("fortnightly", "monday"),
            Err(CounterError::UnknownCycleKind(kind)) if kind == "fortnightly"
        ));
        assert!(is_calendar_kind("Daily"));
        assert!(!is_calendar_kind("every"));
    }

    /// UTC+1 until 2024-03-31 01:00 UTC, UTC+2 after; local 02:00-03:00 is skipped.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn switch() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 3, 31)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap()
        }
        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3_600).unwrap()
        }
        fn summer() -> FixedOffset {
            FixedOffset::east_opt(7_200).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let gap_start = Self::switch() + Duration::hours(1);
            let gap_end = Self::switch() + Duration::hours(2);
            if *local < gap_start {
                LocalResult::Single(Self::winter())
            } else if *local < gap_end {
                LocalResult::None
            } else {
                LocalResult::Single(Self::summer())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch() {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn wall_clock_gap_resolves_past_the_gap() {
        let now = SpringForward.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let got = Schedule::parse("daily", "02:30").unwrap().next_after(&now).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(3, 30, 0)
            .unwrap();
        assert_eq!(got.naive_local(), expected);
        assert!(got > now);
    }

    /// UTC+2 until 2024-10-27 01:00 UTC, UTC+1 after; local 02:00-03:00 happens twice.
    #[derive(Debug, Clone, Copy)]
    struct FallBack;

    impl FallBack {
        fn switch() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 10, 27)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap()
        }
        fn summer() -> FixedOffset {
            FixedOffset::east_opt(7_200).unwrap()
        }
        fn winter() -> FixedOffset {
            FixedOffset::east_opt(3_600).unwrap()
        }
        fn utc(h: u32, mi: u32) -> DateTime<FallBack> {
            let naive = NaiveDate::from_ymd_opt(2024, 10, 27)
                .unwrap()
                .and_hms_opt(h, mi, 0)
                .unwrap();
            FallBack.from_utc_datetime(&naive)
        }
    }

    impl TimeZone for FallBack {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            FallBack
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let overlap_start = Self::switch() + Duration::hours(1);
            let overlap_end = Self::switch() + Duration::hours(2);
            if *local < overlap_start {
                LocalResult::Single(Self::summer())
            } else if *local < overlap_end {
                LocalResult::Ambiguous(Self::summer(), Self::winter())
            } else {
                LocalResult::Single(Self::winter())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch() {
                Self::summer()
            } else {
                Self::winter()
            }
        }
    }

    #[test]
    fn repeated_wall_clock_takes_first_pass() {
        // 00:00 local, before the repeated hour.
        let now = FallBack::utc(22, 0) - Duration::days(1);
        let got = Schedule::parse("daily", "02:30").unwrap().next_after(&now).unwrap();
        assert_eq!(got, FallBack::utc(0, 30));
        assert_eq!(got.offset().local_minus_utc(), 7_200);
    }

    #[test]
    fn hourly_in_second_pass_of_repeated_hour_is_after_now() {
        // Second 02:45 local.
        let now = FallBack::utc(1, 45);
        assert_eq!(now.offset().local_minus_utc(), 3_600);

        let got = Schedule::parse("hourly", "30").unwrap().next_after(&now).unwrap();
        assert!(got > now, "{got} is not after {now}");
        assert_eq!(got, FallBack::utc(2, 30));
    }

    #[test]
    fn hourly_in_first_pass_of_repeated_hour() {
        // First 02:15 local.
        let now = FallBack::utc(0, 15);
        let got = Schedule::parse("hourly", "30").unwrap().next_after(&now).unwrap();
        assert_eq!(got, FallBack::utc(0, 30));
    }

    // -- reset_interval / is_due --------------------------------------------

    #[test]
    fn named_interval_table() {
        assert_eq!(reset_interval("unas", "").unwrap(), Duration::minutes(1));
        assert_eq!(reset_interval("quarhora", "").unwrap(), Duration::minutes(15));
        assert_eq!(reset_interval("hourly", "30").unwrap(), Duration::minutes(60));
        assert_eq!(reset_interval("Daily", "noon").unwrap(), Duration::minutes(1_440));
        assert_eq!(reset_interval("annually", "").unwrap(), Duration::minutes(525_600));
    }

    #[test]
    fn arbitrary_minute_intervals() {
        assert_eq!(reset_interval("every", "90").unwrap(), Duration::minutes(90));
        assert_eq!(reset_interval("45min", "").unwrap(), Duration::minutes(45));
    }

    #[test]
    fn malformed_minute_intervals() {
        for (cycle, param) in [("every", ""), ("every", "soon"), ("every", "-5"), ("every", "0"), ("xmin", "")] {
            assert!(
                matches!(reset_interval(cycle, param), Err(CounterError::InvalidParameter { .. })),
                "{cycle} {param:?}"
            );
        }
        assert!(matches!(
            reset_interval("fortnightly", ""),
            Err(CounterError::UnknownCycleKind(_))
        ));
    }

    #[test]
    fn daily_due_after_a_day() {
        let now = Utc::now();
        assert!(is_due_since(now - Duration::hours(25), now, "daily", "").unwrap());
        assert!(!is_due_since(now - Duration::hours(1), now, "daily", "").unwrap());
    }

    #[test]
    fn threshold_is_inclusive() {
        let now = Utc::now();
        assert!(is_due_since(now - Duration::minutes(90), now, "every", "90").unwrap());
        assert!(!is_due_since(now - Duration::minutes(89), now, "every", "90").unwrap());
    }

    #[test]
    fn missing_file_is_always_due() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.counter");
        assert!(is_due(&path, "daily", "").unwrap());
        assert!(is_due(&path, "annually", "").unwrap());
        assert!(is_due(&path, "every", "5").unwrap());
    }

    #[test]
    fn file_age_drives_is_due() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aged.counter");
        std::fs::write(&path, "1").unwrap();
        assert!(!is_due(&path, "daily", "").unwrap());

        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        let yesterday = std::time::SystemTime::now() - std::time::Duration::from_secs(25 * 3_600);
        file.set_modified(yesterday).unwrap();
        drop(file);

        assert!(is_due(&path, "daily", "").unwrap());
        assert!(!is_due(&path, "weekly", "").unwrap());
    }
}
