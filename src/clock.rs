//! Calendar clock driven by scaled elapsed time.
//!
//! One real second of elapsed time equals one simulated hour at scale 1.0.
//! The calendar is a fixed 30-day month, 12-month year.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{check_delta, SimResult};

pub const MAX_TIME_SCALE: f64 = 10.0;
pub const HOURS_PER_DAY: f64 = 24.0;
pub const DAYS_PER_MONTH: u32 = 30;
pub const MONTHS_PER_YEAR: u32 = 12;
const MS_PER_HOUR: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeState {
    /// Simulated milliseconds since the clock started.
    pub elapsed_ms: f64,
    pub hour_of_day: f64,
    pub day: u32,
    pub month: u32,
    pub year: u32,
    pub time_scale: f64,
}

impl Default for TimeState {
    fn default() -> Self {
        Self {
            elapsed_ms: 0.0,
            hour_of_day: 12.0,
            day: 1,
            month: 1,
            year: 1,
            time_scale: 1.0,
        }
    }
}

pub type TimeListener = Box<dyn FnMut(&TimeState) -> anyhow::Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

pub struct Clock {
    state: TimeState,
    listeners: BTreeMap<ListenerId, TimeListener>,
    next_listener: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::from_state(TimeState::default())
    }

    /// Start from an arbitrary calendar position.
    pub fn from_state(mut state: TimeState) -> Self {
        state.time_scale = clamp_scale(state.time_scale);
        Self {
            state,
            listeners: BTreeMap::new(),
            next_listener: 0,
        }
    }

    pub fn state(&self) -> TimeState {
        self.state
    }

    pub fn time_scale(&self) -> f64 {
        self.state.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.state.time_scale = clamp_scale(scale);
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&TimeState) -> anyhow::Result<()> + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Advance by `delta_ms * time_scale` and carry hours into the calendar.
    pub fn update(&mut self, delta_ms: f64, time_scale: f64) -> SimResult<TimeState> {
        check_delta(delta_ms)?;
        let scaled = delta_ms * clamp_scale(time_scale);
        check_delta(scaled)?;
        self.state.elapsed_ms += scaled;
        self.state.hour_of_day += scaled / MS_PER_HOUR;

        if self.state.hour_of_day >= HOURS_PER_DAY {
            let days = (self.state.hour_of_day / HOURS_PER_DAY).floor();
            self.state.hour_of_day = self.state.hour_of_day.rem_euclid(HOURS_PER_DAY);
            self.advance_days(days as u64);
        }

        self.notify();
        Ok(self.state)
    }

    /// Carry whole days into the calendar. Years saturate at `u32::MAX`.
    fn advance_days(&mut self, days: u64) {
        let days_per_year = u64::from(DAYS_PER_MONTH) * u64::from(MONTHS_PER_YEAR);
        let day_of_year = u64::from(self.state.month.saturating_sub(1)) * u64::from(DAYS_PER_MONTH)
            + u64::from(self.state.day.saturating_sub(1));
        let total = day_of_year + days % days_per_year;
        let years = days / days_per_year + total / days_per_year;
        let day_of_year = total % days_per_year;

        self.state.day = (day_of_year % u64::from(DAYS_PER_MONTH)) as u32 + 1;
        self.state.month = (day_of_year / u64::from(DAYS_PER_MONTH)) as u32 + 1;
        self.state.year = self
            .state
            .year
            .saturating_add(u32::try_from(years).unwrap_or(u32::MAX));
    }

    fn notify(&mut self) {
        let snapshot = self.state;
        for (id, listener) in self.listeners.iter_mut() {
            if let Err(err) = listener(&snapshot) {
                tracing::warn!(listener = id.0, error = %err, "time listener failed");
            }
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 0.0;
    }
    scale.clamp(0.0, MAX_TIME_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn initial_state() {
        let clock = Clock::new();
        let state = clock.state();
        assert_eq!(state.hour_of_day, 12.0);
        assert_eq!((state.day, state.month, state.year), (1, 1, 1));
        assert_eq!(state.time_scale, 1.0);
    }

    #[test]
    fn one_second_is_one_hour() {
        let mut clock = Clock::new();
        clock.update(1_000.0, 1.0).unwrap();
        assert!((clock.state().hour_of_day - 13.0).abs() < 1e-9);
        assert_eq!(clock.state().elapsed_ms, 1_000.0);
    }

    #[test]
    fn scale_multiplies_delta() {
        let mut clock = Clock::new();
        clock.update(1_000.0, 2.0).unwrap();
        assert!((clock.state().hour_of_day - 14.0).abs() < 1e-9);
        assert_eq!(clock.state().elapsed_ms, 2_000.0);
    }

    #[test]
    fn zero_scale_pauses() {
        let mut clock = Clock::new();
        clock.update(5_000.0, 0.0).unwrap();
        assert_eq!(clock.state().hour_of_day, 12.0);
    }

    #[test]
    fn set_time_scale_clamps() {
        let mut clock = Clock::new();
        clock.set_time_scale(25.0);
        assert_eq!(clock.time_scale(), 10.0);
        clock.set_time_scale(-3.0);
        assert_eq!(clock.time_scale(), 0.0);
    }

    #[test]
    fn day_rolls_into_next_month() {
        let mut clock = Clock::from_state(TimeState {
            hour_of_day: 23.5,
            day: 30,
            month: 4,
            ..TimeState::default()
        });
        clock.update(1_000.0, 1.0).unwrap();
        let state = clock.state();
        assert_eq!(state.day, 1);
        assert_eq!(state.month, 5);
        assert!((state.hour_of_day - 0.5).abs() < 1e-9);
    }

    #[test]
    fn month_rolls_into_next_year() {
        let mut clock = Clock::from_state(TimeState {
            hour_of_day: 23.0,
            day: 30,
            month: 12,
            year: 3,
            ..TimeState::default()
        });
        clock.update(2_000.0, 1.0).unwrap();
        let state = clock.state();
        assert_eq!((state.day, state.month, state.year), (1, 1, 4));
    }

    #[test]
    fn large_delta_carries_several_days() {
        let mut clock = Clock::from_state(TimeState {
            hour_of_day: 0.0,
            ..TimeState::default()
        });
        clock.update(72_000.0, 1.0).unwrap();
        assert_eq!(clock.state().day, 4);
        assert_eq!(clock.state().hour_of_day, 0.0);
    }

    #[test]
    fn year_of_days_rolls_the_calendar_over() {
        let mut clock = Clock::new();
        let year_ms = f64::from(DAYS_PER_MONTH * MONTHS_PER_YEAR) * HOURS_PER_DAY * MS_PER_HOUR;
        clock.update(year_ms + 3_000.0, 1.0).unwrap();
        let state = clock.state();
        assert_eq!((state.day, state.month, state.year), (1, 1, 2));
        assert!((state.hour_of_day - 15.0).abs() < 1e-9);
    }

    #[test]
    fn huge_delta_returns_with_calendar_in_range() {
        let mut clock = Clock::new();
        let state = clock.update(1e23, 1.0).unwrap();
        assert!((0.0..HOURS_PER_DAY).contains(&state.hour_of_day));
        assert!((1..=DAYS_PER_MONTH).contains(&state.day));
        assert!((1..=MONTHS_PER_YEAR).contains(&state.month));
        assert!(state.year > 1_000_000);

        let state = clock.update(f64::MAX, MAX_TIME_SCALE);
        assert!(state.is_err());
        let state = clock.update(1e300, 1.0).unwrap();
        assert_eq!(state.year, u32::MAX);
        assert!((0.0..HOURS_PER_DAY).contains(&state.hour_of_day));
    }

    #[test]
    fn rejects_non_finite_delta() {
        let mut clock = Clock::new();
        assert!(clock.update(f64::NAN, 1.0).is_err());
        assert!(clock.update(-1.0, 1.0).is_err());
        assert_eq!(clock.state(), TimeState::default());
    }

    #[test]
    fn listeners_receive_snapshot_and_failures_are_contained() {
        let mut clock = Clock::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        clock.subscribe(|_| anyhow::bail!("listener broke"));
        let sink = seen.clone();
        let id = clock.subscribe(move |state| {
            sink.borrow_mut().push(state.hour_of_day);
            Ok(())
        });

        clock.update(1_000.0, 1.0).unwrap();
        assert_eq!(seen.borrow().len(), 1);

        assert!(clock.unsubscribe(id));
        assert!(!clock.unsubscribe(id));
        clock.update(1_000.0, 1.0).unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }
}
