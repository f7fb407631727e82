//! Conversion of human schedule strings into cron expressions.
//!
//! Two forms are understood: `"<Weekday> <HH:MM>"` for a weekly trigger and
//! `"<HH:MM>"` for a daily one. An unrecognised weekday falls back to every
//! day. Hour and minute are passed through unchecked; the cron parser is the
//! one that rejects nonsense.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Sunday" => Some(Weekday::Sunday),
            "Monday" => Some(Weekday::Monday),
            "Tuesday" => Some(Weekday::Tuesday),
            "Wednesday" => Some(Weekday::Wednesday),
            "Thursday" => Some(Weekday::Thursday),
            "Friday" => Some(Weekday::Friday),
            "Saturday" => Some(Weekday::Saturday),
            _ => None,
        }
    }

    fn cron_name(self) -> &'static str {
        match self {
            Weekday::Sunday => "Sun",
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSpec {
    /// `None` fires every day.
    pub weekday: Option<Weekday>,
    pub hour: String,
    pub minute: String,
}

impl TimeSpec {
    pub fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let (weekday, time) = match parts.as_slice() {
            [day, time] => (Weekday::from_name(day), *time),
            [time, ..] => (None, *time),
            [] => (None, ""),
        };

        let mut pieces = time.split(':');
        let hour = pieces.next().unwrap_or_default().to_string();
        let minute = pieces.next().unwrap_or_default().to_string();

        Self {
            weekday,
            hour,
            minute,
        }
    }

    /// Six-field expression (`sec min hour dom month dow`) for the job scheduler.
    pub fn to_cron(&self) -> String {
        let weekday = self.weekday.map(Weekday::cron_name).unwrap_or("*");
        format!("0 {} {} * * {}", self.minute, self.hour, weekday)
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.weekday {
            Some(day) => write!(f, "weekly {:?} {}:{}", day, self.hour, self.minute),
            None => write!(f, "daily {}:{}", self.hour, self.minute),
        }
    }
}
