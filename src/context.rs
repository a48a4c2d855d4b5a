use chrono::{DateTime, TimeZone, Utc};

/// Execution context that may carry an absolute deadline.
///
/// Serverless runtimes hand each invocation a deadline after which the
/// handler is terminated. Not every context carries one; `deadline`
/// returns `None` in that case.
pub trait DeadlineContext {
    fn deadline(&self) -> Option<DateTime<Utc>>;
}

/// A context with a fixed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(DateTime<Utc>);

impl Deadline {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Deadline(instant)
    }

    /// Deadline `timeout` from the current wall-clock time.
    pub fn after(timeout: std::time::Duration) -> Self {
        let now = Utc::now();
        chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|timeout| now.checked_add_signed(timeout))
            .map_or(Deadline(DateTime::<Utc>::MAX_UTC), Deadline)
    }

    /// Deadline given as milliseconds since the Unix epoch, the way
    /// runtimes such as AWS Lambda pass it in `Lambda-Runtime-Deadline-Ms`.
    ///
    /// Returns `None` if the value is out of range.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Deadline)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

impl DeadlineContext for Deadline {
    fn deadline(&self) -> Option<DateTime<Utc>> {
        Some(self.0)
    }
}

/// A context that never carries a deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Background;

impl DeadlineContext for Background {
    fn deadline(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl<T: DeadlineContext + ?Sized> DeadlineContext for &T {
    fn deadline(&self) -> Option<DateTime<Utc>> {
        (**self).deadline()
    }
}

impl<T: DeadlineContext + ?Sized> DeadlineContext for std::sync::Arc<T> {
    fn deadline(&self) -> Option<DateTime<Utc>> {
        (**self).deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_millis_round_trips_to_instant() {
        let deadline = Deadline::from_epoch_millis(1_709_294_405_250).unwrap();
        assert_eq!(deadline.instant().timestamp_millis(), 1_709_294_405_250);
        assert_eq!(deadline.deadline(), Some(deadline.instant()));
    }

    #[test]
    fn after_is_in_the_future() {
        let before = Utc::now();
        let deadline = Deadline::after(std::time::Duration::from_secs(3));
        let left = deadline.instant() - before;
        assert!(left <= chrono::Duration::seconds(3) + chrono::Duration::milliseconds(100));
        assert!(left >= chrono::Duration::seconds(3));
    }

    #[test]
    fn background_has_no_deadline() {
        assert_eq!(Background.deadline(), None);
        let ctx: std::sync::Arc<dyn DeadlineContext> = std::sync::Arc::new(Background);
        assert_eq!(ctx.deadline(), None);
    }
}
