// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month arithmetic and the recurrence window rules shared by every
//! recurring obligation.

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::Obligation;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid month '{0}', expected YYYY-MM")]
pub struct MonthParseError(pub String);

/// A calendar month, ordered chronologically and rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Upper bound of the recurrence window of an obligation without an end date.
    pub const OPEN_END: Month = Month {
        year: 9999,
        month: 12,
    };

    pub fn new(year: i32, month: u32) -> Option<Month> {
        if (1..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Month { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Month {
        Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month the local wall clock is in.
    pub fn current() -> Month {
        Month::of(today())
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn last_day(self) -> u32 {
        last_day_of_month(self.year, self.month).unwrap_or(28)
    }

    /// Date of `day` in this month, clamped to the month's last day.
    pub fn day(self, day: u32) -> NaiveDate {
        let d = day.clamp(1, self.last_day());
        NaiveDate::from_ymd_opt(self.year, self.month, d).expect("day clamped to month length")
    }

    pub fn first_day(self) -> NaiveDate {
        self.day(1)
    }

    pub fn previous(self) -> Month {
        if self.month == 1 {
            Month {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Month {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Month {
        if self.month == 12 {
            Month {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Month {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthParseError(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(err)?;
        if y.len() != 4 || m.is_empty() || m.len() > 2 {
            return Err(err());
        }
        if !y.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let year: i32 = y.parse().map_err(|_| err())?;
        let month: u32 = m.parse().map_err(|_| err())?;
        Month::new(year, month).ok_or_else(err)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Number of days in `month` of `year`, `None` when `month` is not 1..=12.
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let last = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        _ => return None,
    };
    Some(last)
}

pub fn is_within_recurrence_window(start: NaiveDate, end: Option<NaiveDate>, month: Month) -> bool {
    let last = end.map(Month::of).unwrap_or(Month::OPEN_END);
    Month::of(start) <= month && month <= last
}

/// Whether an obligation is owed in a month, and how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Due {
    Due(Decimal),
    NotDue,
}

impl Due {
    pub fn is_due(self) -> bool {
        matches!(self, Due::Due(_))
    }

    /// Zero when not due; this is the shape the totals work with.
    pub fn amount(self) -> Decimal {
        match self {
            Due::Due(amount) => amount,
            Due::NotDue => Decimal::ZERO,
        }
    }
}

pub fn due_for_month(item: &Obligation, month: Month) -> Due {
    // a zero amount inside the window is indistinguishable from "not due"
    if item.amount.is_zero() || !is_within_recurrence_window(item.start, item.end, month) {
        Due::NotDue
    } else {
        Due::Due(item.amount)
    }
}

pub fn due_amount_for_month(item: &Obligation, month: Month) -> Decimal {
    due_for_month(item, month).amount()
}

/// Configured due day clamped to the month length; unset means the last day.
pub fn effective_due_day(due_day: Option<u32>, month: Month) -> u32 {
    let last = month.last_day();
    due_day
        .filter(|d| *d > 0)
        .map_or(last, |d| d.min(last))
}

/// Signed calendar days from `today` to the item's due date in `month`.
/// Negative means overdue, zero means due today.
pub fn days_until_due(item: &Obligation, month: Month, today: NaiveDate) -> i64 {
    let due = month.day(effective_due_day(item.due_day, month));
    (due - today).num_days()
}
