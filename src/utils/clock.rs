use chrono::{DateTime, Local, NaiveDate, Utc};
#[cfg(test)]
use mockall::automock;

/// Represents an entity responsible for providing dates across application. Trackers take it as a
/// parameter so that ids and timestamps stay deterministic in tests.
#[cfg_attr(test, automock)]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    /// Calendar day in the user's timezone.
    fn today(&self) -> NaiveDate {
        self.time().with_timezone(&Local).date_naive()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single moment.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn time(&self) -> DateTime<Utc> {
        self.0
    }
}
