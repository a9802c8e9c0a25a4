//! Providers for default field values (id, timestamps).

use chrono::{Local, NaiveDateTime};

/// Generates ids for rows inserted without one.
pub trait IdGenerator: Send + Sync {
    fn generate_id(&self) -> String;
}

/// Random UUID v4 ids in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate_id(&self) -> String {
        self()
    }
}

/// Source of "now" for createdAt / updatedAt.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant. Useful in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn uuid_ids_are_unique() {
        let generator = UuidV4Generator;
        let a = generator.generate_id();
        assert_eq!(a.len(), 36);
        assert_ne!(a, generator.generate_id());
    }

    #[test]
    fn closures_generate_ids() {
        let generator = || "fixed".to_string();
        assert_eq!(generator.generate_id(), "fixed");
    }

    #[test]
    fn fixed_clock() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(FixedClock(ts).now(), ts);
    }
}
