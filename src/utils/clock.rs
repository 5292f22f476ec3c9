use chrono::{DateTime, SubsecRound, Utc};

/// Source of the current time for transaction timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reads `clock` and drops everything below whole seconds.
pub fn now_truncated(clock: &dyn Clock) -> DateTime<Utc> {
    clock.now().trunc_subsecs(0)
}
