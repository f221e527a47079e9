// src/schedule.rs
//! Time-window schedule engine: decides, from a declarative schedule shape,
//! whether "now" is a valid moment to run a check.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::config::ScheduleConfig;

/// The monitor operates entirely in KST (UTC+9, no DST), regardless of host
/// locale.
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("KST offset")
}

pub fn now_kst() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&kst())
}

/// Parse an `HH:MM` string. Rejecting bad input here makes malformed schedule
/// configuration fatal at construction time, not at trigger time.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .with_context(|| format!("invalid schedule time `{s}`, expected HH:MM"))
}

/// Declarative schedule. Exactly one shape is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSpec {
    /// Run at the listed times of day, to the minute.
    AtTimes(Vec<NaiveTime>),
    /// Run every `interval_minutes` while inside the daily window.
    /// The window may wrap past midnight (start > end).
    Window {
        start: NaiveTime,
        end: NaiveTime,
        interval_minutes: u32,
    },
    /// Run every `interval_minutes`, around the clock.
    Every { interval_minutes: u32 },
}

impl ScheduleSpec {
    /// Build from the raw config shape. Precedence: explicit times, then
    /// window, then bare interval.
    pub fn from_config(cfg: &ScheduleConfig) -> Result<Self> {
        if !cfg.times.is_empty() {
            let times = cfg
                .times
                .iter()
                .map(|s| parse_hhmm(s))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::AtTimes(times));
        }
        if let (Some(start), Some(end)) = (&cfg.start_time, &cfg.end_time) {
            if cfg.interval_minutes == 0 {
                bail!("schedule interval_minutes must be at least 1");
            }
            return Ok(Self::Window {
                start: parse_hhmm(start)?,
                end: parse_hhmm(end)?,
                interval_minutes: cfg.interval_minutes,
            });
        }
        if cfg.interval_minutes == 0 {
            bail!("schedule interval_minutes must be at least 1");
        }
        Ok(Self::Every {
            interval_minutes: cfg.interval_minutes,
        })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::AtTimes(times) => format!(
                "daily at {}",
                times
                    .iter()
                    .map(|t| t.format("%H:%M").to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Window {
                start,
                end,
                interval_minutes,
            } => format!(
                "every {interval_minutes}m between {} and {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            ),
            Self::Every { interval_minutes } => format!("every {interval_minutes}m"),
        }
    }
}

/// Daily-window membership, inclusive at both edges. Windows where
/// start > end wrap past midnight: 22:00-06:00 contains 23:00 and 05:00 but
/// not 12:00.
pub fn in_window(t: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        start <= t && t <= end
    } else {
        t >= start || t <= end
    }
}

/// Owns the only mutable schedule state: the last run and last fired minute.
#[derive(Debug)]
pub struct ScheduleEngine {
    spec: ScheduleSpec,
    last_run: Option<DateTime<FixedOffset>>,
    last_fired_minute: Option<NaiveDateTime>,
}

fn minute_key(now: DateTime<FixedOffset>) -> NaiveDateTime {
    now.date_naive()
        .and_hms_opt(now.hour(), now.minute(), 0)
        .expect("minute truncation")
}

impl ScheduleEngine {
    pub fn new(spec: ScheduleSpec) -> Self {
        Self {
            spec,
            last_run: None,
            last_fired_minute: None,
        }
    }

    pub fn spec(&self) -> &ScheduleSpec {
        &self.spec
    }

    fn interval_elapsed(&self, now: DateTime<FixedOffset>, interval_minutes: u32) -> bool {
        match self.last_run {
            None => true,
            Some(prev) => {
                now.signed_duration_since(prev) >= Duration::minutes(i64::from(interval_minutes))
            }
        }
    }

    /// Pure eligibility predicate per the schedule shape.
    ///
    /// Bare-interval mode always answers true: its cadence belongs to the
    /// tick loop, not to this predicate.
    pub fn should_run_now(&self, now: DateTime<FixedOffset>) -> bool {
        match &self.spec {
            ScheduleSpec::AtTimes(times) => {
                let t = now.time();
                times
                    .iter()
                    .any(|at| at.hour() == t.hour() && at.minute() == t.minute())
            }
            ScheduleSpec::Window {
                start,
                end,
                interval_minutes,
            } => in_window(now.time(), *start, *end) && self.interval_elapsed(now, *interval_minutes),
            ScheduleSpec::Every { .. } => true,
        }
    }

    /// Eligibility at tick granularity. The loop wakes roughly every second,
    /// so an explicit-times trigger must not refire within its minute, and
    /// the bare-interval shape enforces its cadence here.
    pub fn due(&self, now: DateTime<FixedOffset>) -> bool {
        if !self.should_run_now(now) {
            return false;
        }
        match &self.spec {
            ScheduleSpec::AtTimes(_) => self.last_fired_minute != Some(minute_key(now)),
            ScheduleSpec::Window { .. } => true,
            ScheduleSpec::Every { interval_minutes } => {
                self.interval_elapsed(now, *interval_minutes)
            }
        }
    }

    pub fn mark_ran(&mut self, now: DateTime<FixedOffset>) {
        self.last_run = Some(now);
        self.last_fired_minute = Some(minute_key(now));
    }
}
