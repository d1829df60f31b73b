//! Calendar clock abstraction.
//!
//! The bearer challenge token rotates with the calendar date, so the date is
//! injected into the server state instead of being read from the wall clock
//! inside the negotiator. Production uses [`SystemClock`]; tests pin the
//! date with [`FixedClock`].

use chrono::{Local, NaiveDate};

/// Source of the current calendar date.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns today's date in the server's local time zone.
    fn today(&self) -> NaiveDate;
}

/// Clock backed by the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// Builds a fixed clock from a calendar date, returning `None` if the
    /// date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}
