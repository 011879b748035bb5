//! Weekly opening hours as half-hour slots.
//!
//! Each day owns one slot list in a fixed array indexed by [`Weekday`], so an
//! "open at" filter is an equality test against a known array position.

use crate::error::GeoboxError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Monday = 0 ... Sunday = 6.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        };
        f.write_str(name)
    }
}

/// Half-hour slot of a day, 0 (00:00) to 47 (23:30).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HalfHour(u8);

impl HalfHour {
    pub const SLOTS_PER_DAY: u8 = 48;

    pub fn new(index: u8) -> Option<Self> {
        (index < Self::SLOTS_PER_DAY).then_some(Self(index))
    }

    /// Slot for a wall-clock time.
    ///
    /// Minutes past :15 count as the half hour and minutes past :45 as the
    /// next hour; rounding past 23:45 wraps to 00:00 of the same day.
    pub fn from_time(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        let mut slot = hour * 2;
        if minute > 15 {
            slot += 1;
        }
        if minute > 45 {
            slot += 1;
        }
        Some(Self(slot % Self::SLOTS_PER_DAY))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Start of the slot in fractional hours (10.5 is 10:30).
    pub fn hours(self) -> f32 {
        f32::from(self.0) / 2.0
    }
}

impl TryFrom<u8> for HalfHour {
    type Error = GeoboxError;

    fn try_from(index: u8) -> Result<Self, GeoboxError> {
        Self::new(index).ok_or_else(|| {
            GeoboxError::InvalidHours(format!(
                "slot {} outside 0..{}",
                index,
                Self::SLOTS_PER_DAY
            ))
        })
    }
}

impl From<HalfHour> for u8 {
    fn from(slot: HalfHour) -> Self {
        slot.0
    }
}

impl fmt::Display for HalfHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = if self.0 % 2 == 1 { 30 } else { 0 };
        write!(f, "{:02}:{:02}", self.0 / 2, minutes)
    }
}

/// Opening span for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySpan {
    AllDay,
    /// Whole hours, `open` inclusive and `close` exclusive. Reversed bounds
    /// are swapped.
    Hours { open: u8, close: u8 },
}

impl DaySpan {
    fn slots(self) -> impl Iterator<Item = HalfHour> {
        let (open, close) = match self {
            DaySpan::AllDay => (0, 24),
            DaySpan::Hours { open, close } => {
                let (open, close) = (open.min(24), close.min(24));
                (open.min(close), open.max(close))
            }
        };
        (open * 2..close * 2).map(HalfHour)
    }
}

/// Open slots for every day of the week.
///
/// Each day's list is kept sorted and free of duplicates, including after
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DaySlots", into = "DaySlots")]
pub struct WeeklyHours {
    days: [Vec<HalfHour>; 7],
}

/// Serialized form of [`WeeklyHours`].
#[derive(Serialize, Deserialize)]
struct DaySlots {
    days: [Vec<HalfHour>; 7],
}

impl From<DaySlots> for WeeklyHours {
    fn from(DaySlots { mut days }: DaySlots) -> Self {
        for slots in &mut days {
            slots.sort_unstable();
            slots.dedup();
        }
        Self { days }
    }
}

impl From<WeeklyHours> for DaySlots {
    fn from(hours: WeeklyHours) -> Self {
        Self { days: hours.days }
    }
}

impl WeeklyHours {
    /// Closed every day.
    pub fn closed() -> Self {
        Self::default()
    }

    /// Same spans on every day.
    pub fn every_day(spans: &[DaySpan]) -> Self {
        let mut hours = Self::closed();
        for day in Weekday::ALL {
            hours.set_day(day, spans);
        }
        hours
    }

    /// Replaces the open slots of `day` with the union of `spans`.
    pub fn set_day(&mut self, day: Weekday, spans: &[DaySpan]) {
        let mut slots: Vec<HalfHour> = spans.iter().flat_map(|span| span.slots()).collect();
        slots.sort_unstable();
        slots.dedup();
        self.days[day.index()] = slots;
    }

    pub fn slots(&self, day: Weekday) -> &[HalfHour] {
        &self.days[day.index()]
    }

    pub fn is_open(&self, day: Weekday, slot: HalfHour) -> bool {
        self.slots(day).binary_search(&slot).is_ok()
    }
}

/// Records that carry opening hours.
pub trait HasHours {
    fn hours(&self) -> &WeeklyHours;
}

/// "Open at this time" filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenAt {
    pub day: Weekday,
    pub slot: HalfHour,
}

impl OpenAt {
    pub fn new(day: Weekday, slot: HalfHour) -> Self {
        Self { day, slot }
    }

    pub fn matches<R: HasHours>(&self, record: &R) -> bool {
        record.hours().is_open(self.day, self.slot)
    }

    /// Predicate form, for use with [`crate::store::Filters`].
    pub fn predicate<R: HasHours + 'static>(self) -> impl Fn(&R) -> bool + Send + Sync + 'static {
        move |record: &R| self.matches(record)
    }
}

impl fmt::Display for OpenAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_index() {
        assert_eq!(Weekday::from_index(0), Some(Weekday::Monday));
        assert_eq!(Weekday::from_index(6), Some(Weekday::Sunday));
        assert_eq!(Weekday::from_index(7), None);
        assert_eq!(Weekday::Thursday.index(), 3);
    }

    #[test]
    fn test_slot_rounding() {
        assert_eq!(HalfHour::from_time(10, 15).unwrap().hours(), 10.0);
        assert_eq!(HalfHour::from_time(10, 16).unwrap().hours(), 10.5);
        assert_eq!(HalfHour::from_time(10, 45).unwrap().hours(), 10.5);
        assert_eq!(HalfHour::from_time(10, 46).unwrap().hours(), 11.0);
        assert_eq!(HalfHour::from_time(23, 50).unwrap().index(), 0);
        assert!(HalfHour::from_time(24, 0).is_none());
        assert!(HalfHour::new(48).is_none());
    }

    #[test]
    fn test_span_expansion() {
        let mut hours = WeeklyHours::closed();
        hours.set_day(Weekday::Monday, &[DaySpan::Hours { open: 10, close: 15 }]);

        let expected: Vec<f32> = vec![10.0, 10.5, 11.0, 11.5, 12.0, 12.5, 13.0, 13.5, 14.0, 14.5];
        let actual: Vec<f32> = hours.slots(Weekday::Monday).iter().map(|s| s.hours()).collect();
        assert_eq!(actual, expected);
        assert!(hours.slots(Weekday::Tuesday).is_empty());
    }

    #[test]
    fn test_reversed_and_split_spans() {
        let mut hours = WeeklyHours::closed();
        hours.set_day(
            Weekday::Friday,
            &[
                DaySpan::Hours { open: 14, close: 11 },
                DaySpan::Hours { open: 17, close: 22 },
            ],
        );
        let friday = |h, m| HalfHour::from_time(h, m).unwrap();
        assert!(hours.is_open(Weekday::Friday, friday(11, 0)));
        assert!(hours.is_open(Weekday::Friday, friday(13, 30)));
        assert!(!hours.is_open(Weekday::Friday, friday(15, 0)));
        assert!(hours.is_open(Weekday::Friday, friday(21, 30)));
        assert!(!hours.is_open(Weekday::Friday, friday(22, 0)));
    }

    #[test]
    fn test_deserialized_days_sorted() {
        let json = r#"{"days":[[30,20,2,20],[],[],[],[],[],[47]]}"#;
        let hours: WeeklyHours = serde_json::from_str(json).unwrap();

        let monday: Vec<u8> = hours
            .slots(Weekday::Monday)
            .iter()
            .map(|s| s.index())
            .collect();
        assert_eq!(monday, vec![2, 20, 30]);
        for index in [2, 20, 30] {
            assert!(hours.is_open(Weekday::Monday, HalfHour::new(index).unwrap()));
        }
        assert!(hours.is_open(Weekday::Sunday, HalfHour::new(47).unwrap()));

        let json = serde_json::to_string(&hours).unwrap();
        let back: WeeklyHours = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hours);
    }

    #[test]
    fn test_out_of_range_slot_rejected() {
        assert!(serde_json::from_str::<HalfHour>("200").is_err());
        assert!(serde_json::from_str::<HalfHour>("48").is_err());
        assert_eq!(serde_json::from_str::<HalfHour>("47").unwrap().to_string(), "23:30");
        assert_eq!(serde_json::to_string(&HalfHour::new(21).unwrap()).unwrap(), "21");

        let json = r#"{"days":[[48],[],[],[],[],[],[]]}"#;
        assert!(serde_json::from_str::<WeeklyHours>(json).is_err());
        assert!(matches!(
            HalfHour::try_from(99),
            Err(GeoboxError::InvalidHours(_))
        ));
    }

    #[test]
    fn test_all_day() {
        let hours = WeeklyHours::every_day(&[DaySpan::AllDay]);
        for day in Weekday::ALL {
            assert_eq!(hours.slots(day).len(), 48);
        }
    }

    #[test]
    fn test_open_at_predicate() {
        struct Shop(WeeklyHours);
        impl HasHours for Shop {
            fn hours(&self) -> &WeeklyHours {
                &self.0
            }
        }

        let shop = Shop(WeeklyHours::every_day(&[DaySpan::Hours { open: 9, close: 17 }]));
        let noon = OpenAt::new(Weekday::Sunday, HalfHour::from_time(12, 0).unwrap());
        let night = OpenAt::new(Weekday::Sunday, HalfHour::from_time(20, 0).unwrap());

        let pred = noon.predicate::<Shop>();
        assert!(pred(&shop));
        assert!(!night.matches(&shop));
        assert_eq!(noon.to_string(), "Sunday 12:00");
    }
}
