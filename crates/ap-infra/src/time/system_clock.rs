use ap_core::ports::ClockPort;
use chrono::{DateTime, Utc};

pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
