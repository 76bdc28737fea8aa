//! Age derivation from birth year.
//!
//! Age is computed on every read from the local wall-clock year and is never stored.

use chrono::Datelike;

/// Current calendar year from the local clock.
#[must_use]
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Age in whole years as of `current_year`.
///
/// Widened to `i64` so extreme birth years cannot overflow.
#[must_use]
pub fn age_in(current_year: i32, birth_year: i32) -> i64 {
    i64::from(current_year) - i64::from(birth_year)
}

/// Age in whole years as of now.
#[must_use]
pub fn age(birth_year: i32) -> i64 {
    age_in(current_year(), birth_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_age_in() {
        assert_eq!(age_in(2026, 2020), 6);
        assert_eq!(age_in(2026, 2026), 0);
        assert_eq!(age_in(2026, 2030), -4);
    }

    #[test]
    fn test_age_uses_current_year() {
        assert_eq!(age(2020), i64::from(current_year()) - 2020);
    }

    proptest! {
        #[test]
        fn prop_age_is_difference(current in any::<i32>(), birth in any::<i32>()) {
            prop_assert_eq!(age_in(current, birth), i64::from(current) - i64::from(birth));
        }
    }
}
