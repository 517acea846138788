use chrono::{Local, NaiveDate};
use std::sync::RwLock;

/// Source of "today" for deadline and lifecycle decisions.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Settable clock for demos and tests.
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: RwLock::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        let mut guard = self
            .today
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self
            .today
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
