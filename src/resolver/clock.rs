use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Wall-clock source for time-dependent replies
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl FixedClock {
    /// Build from local calendar fields; `None` if the time does not exist locally
    pub fn at(date: NaiveDate, hour: u32, minute: u32) -> Option<Self> {
        let naive = date.and_hms_opt(hour, minute, 0)?;
        Local.from_local_datetime(&naive).single().map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
