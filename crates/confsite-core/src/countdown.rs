//! Event countdown.
//!
//! `CountdownDuration` is a signed millisecond span with a calendar-style
//! breakdown (whole months use the average Gregorian month, days are what is
//! left over). `CountdownHandle` owns the once-a-second ticker task that the
//! store starts from `set_event_time`.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::utils::pad2;

/// Interval between countdown ticks
pub const TICK: Duration = Duration::from_secs(1);

/// Formats accepted for the event start time, tried in order
const EVENT_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Date-only event start, taken as midnight
const EVENT_DATE_FORMAT: &str = "%Y-%m-%d";

const MS_PER_SECOND: i64 = 1000;

// 400 Gregorian years hold 146097 days and 4800 months.
const DAYS_PER_400_YEARS: i64 = 146_097;
const MONTHS_PER_400_YEARS: i64 = 4_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct CountdownDuration {
    millis: i64,
}

/// Components of a duration, each carrying the duration's sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationParts {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub millis: i64,
}

/// Divide, rounding away from zero
fn div_away_from_zero(num: i64, den: i64) -> i64 {
    let q = num / den;
    if num % den == 0 {
        q
    } else {
        q + num.signum()
    }
}

impl CountdownDuration {
    pub fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// Whole seconds from `now` until `target`, in milliseconds. Sub-second
    /// precision on either side is dropped before subtracting.
    pub fn between<Tz: TimeZone>(now: &DateTime<Tz>, target: &DateTime<Tz>) -> Self {
        Self::from_millis((target.timestamp() - now.timestamp()) * MS_PER_SECOND)
    }

    pub fn as_millis(&self) -> i64 {
        self.millis
    }

    pub fn is_negative(&self) -> bool {
        self.millis < 0
    }

    #[must_use]
    pub fn minus_millis(self, millis: i64) -> Self {
        Self::from_millis(self.millis.saturating_sub(millis))
    }

    pub fn parts(&self) -> DurationParts {
        let ms = self.millis;
        let seconds_total = ms / MS_PER_SECOND;
        let minutes_total = seconds_total / 60;
        let hours_total = minutes_total / 60;
        let mut days = hours_total / 24;

        let months_total = days * MONTHS_PER_400_YEARS / DAYS_PER_400_YEARS;
        days -= div_away_from_zero(months_total * DAYS_PER_400_YEARS, MONTHS_PER_400_YEARS);

        DurationParts {
            years: months_total / 12,
            months: months_total % 12,
            days,
            hours: hours_total % 24,
            minutes: minutes_total % 60,
            seconds: seconds_total % 60,
            millis: ms % MS_PER_SECOND,
        }
    }
}

/// Parse an event start time such as `2018-10-6 9:00` as local time. A bare
/// date (`2018-10-6`) means midnight.
pub fn parse_event_time(input: &str) -> Option<DateTime<Local>> {
    let input = input.trim();
    EVENT_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, EVENT_DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

/// Countdown fields as displayed on the site, each at least two digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTimeObject {
    pub months: String,
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl From<&CountdownDuration> for EventTimeObject {
    fn from(duration: &CountdownDuration) -> Self {
        let parts = duration.parts();
        Self {
            months: pad2(parts.months),
            days: pad2(parts.days),
            hours: pad2(parts.hours),
            minutes: pad2(parts.minutes),
            seconds: pad2(parts.seconds),
        }
    }
}

/// Owns a running countdown ticker. Cancel it with [`CountdownHandle::cancel`]
/// or by dropping it.
#[must_use = "dropping the handle stops the countdown"]
#[derive(Debug)]
pub struct CountdownHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    /// Spawn a task calling `on_tick` every [`TICK`], first one tick from now.
    pub(crate) fn spawn<F, Fut>(mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            loop {
                tokio::select! {
                    _ = &mut rx => break,
                    _ = ticker.tick() => on_tick().await,
                }
            }
            debug!("Countdown ticker stopped");
        });

        Self {
            shutdown: Some(tx),
            task: Some(task),
        }
    }

    /// Stop the ticker and wait for its task to exit.
    pub async fn cancel(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const SECOND: i64 = 1000;
    const HOUR: i64 = 3600 * SECOND;
    const DAY: i64 = 24 * HOUR;

    #[test]
    fn test_parts_days_and_hours() {
        let parts = CountdownDuration::from_millis(3 * DAY + 9 * HOUR + 5 * SECOND).parts();
        assert_eq!(parts.months, 0);
        assert_eq!(parts.days, 3);
        assert_eq!(parts.hours, 9);
        assert_eq!(parts.minutes, 0);
        assert_eq!(parts.seconds, 5);
    }

    #[test]
    fn test_parts_month_rollover() {
        // 30 days stays under a month; 31 days is one month and no days
        assert_eq!(CountdownDuration::from_millis(30 * DAY).parts().months, 0);
        assert_eq!(CountdownDuration::from_millis(30 * DAY).parts().days, 30);
        let parts = CountdownDuration::from_millis(31 * DAY).parts();
        assert_eq!((parts.months, parts.days), (1, 0));
        let parts = CountdownDuration::from_millis(70 * DAY).parts();
        assert_eq!((parts.months, parts.days), (2, 9));
    }

    #[test]
    fn test_parts_years_split_from_months() {
        let parts = CountdownDuration::from_millis(400 * DAY).parts();
        assert_eq!(parts.years, 1);
        assert_eq!(parts.months, 1);
        assert_eq!(parts.days, 4);
    }

    #[test]
    fn test_parts_negative() {
        let parts = CountdownDuration::from_millis(-(DAY + 2 * HOUR + 3 * SECOND)).parts();
        assert_eq!(parts.days, -1);
        assert_eq!(parts.hours, -2);
        assert_eq!(parts.seconds, -3);
    }

    #[test]
    fn test_minus_millis_runs_past_zero() {
        let d = CountdownDuration::from_millis(500).minus_millis(1000);
        assert_eq!(d.as_millis(), -500);
        assert!(d.is_negative());
    }

    #[test]
    fn test_event_time_object_padding() {
        let obj = EventTimeObject::from(&CountdownDuration::from_millis(3 * DAY + 9 * HOUR));
        assert_eq!(obj.months, "00");
        assert_eq!(obj.days, "03");
        assert_eq!(obj.hours, "09");
        assert_eq!(obj.minutes, "00");
        assert_eq!(obj.seconds, "00");

        let obj = EventTimeObject::from(&CountdownDuration::from_millis(12 * HOUR + 45 * SECOND));
        assert_eq!(obj.hours, "12");
        assert_eq!(obj.seconds, "45");
    }

    #[test]
    fn test_parse_event_time() {
        let dt = parse_event_time("2018-10-6 9:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2018-10-06 09:00");
        assert!(parse_event_time(" 2018-10-06 09:30:15 ").is_some());
        assert!(parse_event_time("October 6th").is_none());
        assert!(parse_event_time("2018-10-6 25:00").is_none());
        assert!(parse_event_time("").is_none());
    }

    #[test]
    fn test_parse_event_time_date_only_is_midnight() {
        let dt = parse_event_time("2018-10-6").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2018-10-06 00:00:00");
        assert_eq!(parse_event_time("2018-10-6 0:00"), Some(dt));
    }

    #[test]
    fn test_between_whole_seconds() {
        let now = Local.with_ymd_and_hms(2018, 10, 1, 9, 0, 0).unwrap()
            + chrono::Duration::milliseconds(750);
        let target = Local.with_ymd_and_hms(2018, 10, 1, 9, 0, 10).unwrap();
        assert_eq!(CountdownDuration::between(&now, &target).as_millis(), 10_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_ticks_every_second() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = CountdownHandle::spawn(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        handle.cancel().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticker() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let handle = CountdownHandle::spawn(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }
}
