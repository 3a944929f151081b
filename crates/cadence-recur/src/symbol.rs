//! Symbolic day-of-week sets.
//!
//! Weekdays and months themselves are [`chrono::Weekday`] and
//! [`chrono::Month`]; this module adds the set form consumed by
//! days-of-week-subset rules.

use chrono::Weekday;

/// A set of days of the week, one bit per day counted from Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: Self = Self(0);

    /// Monday through Friday.
    pub const WEEKDAYS: Self = Self::EMPTY
        .with(Weekday::Mon)
        .with(Weekday::Tue)
        .with(Weekday::Wed)
        .with(Weekday::Thu)
        .with(Weekday::Fri);

    /// Saturday and Sunday.
    pub const WEEKENDS: Self = Self::EMPTY.with(Weekday::Sat).with(Weekday::Sun);

    #[must_use]
    pub const fn single(day: Weekday) -> Self {
        Self::EMPTY.with(day)
    }

    #[must_use]
    pub const fn with(self, day: Weekday) -> Self {
        Self(self.0 | bit(day))
    }

    #[must_use]
    pub const fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

const fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_sunday()
}

impl From<Weekday> for WeekdaySet {
    fn from(day: Weekday) -> Self {
        Self::single(day)
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        days.into_iter().fold(Self::EMPTY, Self::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_and_weekend_sets_partition_the_week() {
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ] {
            assert!(WeekdaySet::WEEKDAYS.contains(day));
            assert!(!WeekdaySet::WEEKENDS.contains(day));
        }
        for day in [Weekday::Sat, Weekday::Sun] {
            assert!(WeekdaySet::WEEKENDS.contains(day));
            assert!(!WeekdaySet::WEEKDAYS.contains(day));
        }
    }

    #[test]
    fn sets_build_from_iterators() {
        let set: WeekdaySet = [Weekday::Tue, Weekday::Thu].into_iter().collect();
        assert!(set.contains(Weekday::Tue));
        assert!(set.contains(Weekday::Thu));
        assert!(!set.contains(Weekday::Wed));
    }

    #[test]
    fn empty_set_contains_nothing() {
        assert!(WeekdaySet::EMPTY.is_empty());
        assert!(!WeekdaySet::EMPTY.contains(Weekday::Mon));
        assert!(!WeekdaySet::single(Weekday::Mon).is_empty());
    }
}
