//! Absolute and relative dates, and the arithmetic between them (§3, §4.1,
//! §9 open question on ordering).

use std::fmt;

use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Timelike};

/// A calendar-component interval: the "relative date" variant of §3.
///
/// Components are kept separate rather than folded into a single duration
/// because calendar-aware addition onto an absolute instant (adding one
/// "month" must respect variable month length) needs the month/year counts
/// intact; only `microseconds..days` collapse into a fixed-length duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelativeDate {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: i32,
    pub microseconds: i32,
}

impl RelativeDate {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Canonical carry: microseconds -> seconds -> minutes -> hours -> days
    /// (§3 invariant 5). Months/years are left alone since their length is
    /// context dependent.
    pub fn normalize(mut self) -> Self {
        fn carry(value: &mut i32, into: &mut i32, base: i32) {
            *into += value.div_euclid(base);
            *value = value.rem_euclid(base);
        }
        carry(&mut self.microseconds, &mut self.seconds, 1_000_000);
        carry(&mut self.seconds, &mut self.minutes, 60);
        carry(&mut self.minutes, &mut self.hours, 60);
        carry(&mut self.hours, &mut self.days, 24);
        self
    }

    /// Best-effort projection to seconds, used when a relative date is
    /// compared against, or promoted for, purely numeric contexts.
    pub fn as_seconds_f64(&self) -> f64 {
        let days_from_months = (self.years as f64) * 365.2425 * 12.0 / 12.0
            + (self.months as f64) * 30.436_875;
        days_from_months * 86_400.0
            + (self.days as f64) * 86_400.0
            + (self.hours as f64) * 3_600.0
            + (self.minutes as f64) * 60.0
            + (self.seconds as f64)
            + (self.microseconds as f64) / 1_000_000.0
    }

    pub fn add(&self, other: &RelativeDate) -> RelativeDate {
        RelativeDate {
            years: self.years + other.years,
            months: self.months + other.months,
            days: self.days + other.days,
            hours: self.hours + other.hours,
            minutes: self.minutes + other.minutes,
            seconds: self.seconds + other.seconds,
            microseconds: self.microseconds + other.microseconds,
        }
        .normalize()
    }

    pub fn negate(&self) -> RelativeDate {
        RelativeDate {
            years: -self.years,
            months: -self.months,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
            microseconds: -self.microseconds,
        }
    }
}

/// Either an absolute instant or a calendar interval (§3).
#[derive(Debug, Clone, PartialEq)]
pub enum QDate {
    Absolute(DateTime<FixedOffset>),
    Relative(RelativeDate),
}

/// Raised when arithmetic or comparison mixes an absolute and a bare
/// relative date in a way this implementation refuses to guess at (§9 open
/// question: we forbid rather than silently promote through a zero epoch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTypeError(pub &'static str);

impl fmt::Display for DateTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DATE-TYPE-ERROR: {}", self.0)
    }
}
impl std::error::Error for DateTypeError {}

impl QDate {
    pub fn now() -> Self {
        QDate::Absolute(chrono::Local::now().with_timezone(&FixedOffset::east_opt(0).unwrap()))
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, QDate::Absolute(_))
    }

    /// absolute + relative = absolute; relative + relative = relative
    /// (§3 invariant 5).
    pub fn add(&self, other: &QDate) -> Result<QDate, DateTypeError> {
        match (self, other) {
            (QDate::Absolute(a), QDate::Relative(r)) | (QDate::Relative(r), QDate::Absolute(a)) => {
                Ok(QDate::Absolute(add_relative_to_absolute(*a, r)))
            }
            (QDate::Relative(a), QDate::Relative(b)) => Ok(QDate::Relative(a.add(b))),
            (QDate::Absolute(_), QDate::Absolute(_)) => {
                Err(DateTypeError("cannot add two absolute dates"))
            }
        }
    }

    /// absolute - absolute = relative; absolute - relative = absolute;
    /// relative - relative = relative (§3 invariant 5).
    pub fn sub(&self, other: &QDate) -> Result<QDate, DateTypeError> {
        match (self, other) {
            (QDate::Absolute(a), QDate::Absolute(b)) => {
                let delta = *a - *b;
                Ok(QDate::Relative(duration_to_relative(delta)))
            }
            (QDate::Absolute(a), QDate::Relative(r)) => {
                Ok(QDate::Absolute(add_relative_to_absolute(*a, &r.negate())))
            }
            (QDate::Relative(a), QDate::Relative(b)) => Ok(QDate::Relative(a.add(&b.negate()))),
            (QDate::Relative(_), QDate::Absolute(_)) => {
                Err(DateTypeError("cannot subtract an absolute date from a relative one"))
            }
        }
    }

    /// Ordering between two dates. Two absolutes compare as instants; two
    /// relatives compare via their seconds projection. Comparing an
    /// absolute against a bare relative is a type error — the open question
    /// in §9 is resolved in favor of (a), forbidding the comparison rather
    /// than promoting through a zero epoch, because neither surveyed header
    /// agreed on which epoch to use.
    pub fn compare(&self, other: &QDate) -> Result<std::cmp::Ordering, DateTypeError> {
        match (self, other) {
            (QDate::Absolute(a), QDate::Absolute(b)) => Ok(a.cmp(b)),
            (QDate::Relative(a), QDate::Relative(b)) => Ok(a
                .as_seconds_f64()
                .partial_cmp(&b.as_seconds_f64())
                .unwrap_or(std::cmp::Ordering::Equal)),
            _ => Err(DateTypeError("cannot order an absolute date against a relative one")),
        }
    }
}

fn add_relative_to_absolute(base: DateTime<FixedOffset>, r: &RelativeDate) -> DateTime<FixedOffset> {
    let total_months = r.years * 12 + r.months;
    let mut year = base.year();
    let mut month = base.month() as i32 + total_months;
    year += (month - 1).div_euclid(12);
    month = (month - 1).rem_euclid(12) + 1;
    let day_in_month = days_in_month(year, month as u32);
    let day = base.day().min(day_in_month);

    let shifted = base
        .timezone()
        .with_ymd_and_hms(
            year,
            month as u32,
            day,
            base.hour(),
            base.minute(),
            base.second(),
        )
        .single()
        .unwrap_or(base);

    let micros_duration = Duration::days(r.days as i64)
        + Duration::hours(r.hours as i64)
        + Duration::minutes(r.minutes as i64)
        + Duration::seconds(r.seconds as i64)
        + Duration::microseconds(r.microseconds as i64);

    (shifted + micros_duration)
        .with_nanosecond(base.nanosecond())
        .unwrap_or(shifted + micros_duration)
}

fn duration_to_relative(delta: Duration) -> RelativeDate {
    let total_micros = delta.num_microseconds().unwrap_or(0);
    RelativeDate {
        years: 0,
        months: 0,
        days: (total_micros / 86_400_000_000) as i32,
        hours: 0,
        minutes: 0,
        seconds: 0,
        microseconds: (total_micros % 86_400_000_000) as i32,
    }
    .normalize()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = chrono::NaiveDate::from_ymd_opt(ny, nm, 1).unwrap();
    let first_of_this = chrono::NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    (first_of_next - first_of_this).num_days() as u32
}

impl fmt::Display for QDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QDate::Absolute(d) => write!(f, "{}", d.to_rfc3339()),
            QDate::Relative(r) => write!(
                f,
                "{}y{}m{}d{}h{}m{}s{}us",
                r.years, r.months, r.days, r.hours, r.minutes, r.seconds, r.microseconds
            ),
        }
    }
}
