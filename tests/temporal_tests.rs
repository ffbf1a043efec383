// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{date, dec, obligation};
use pocketbook::temporal::{
    Due, Month, days_until_due, due_amount_for_month, due_for_month, effective_due_day,
    is_within_recurrence_window, last_day_of_month,
};

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

#[test]
fn month_lengths_follow_the_gregorian_calendar() {
    assert_eq!(last_day_of_month(2024, 2), Some(29));
    assert_eq!(last_day_of_month(2025, 2), Some(28));
    assert_eq!(last_day_of_month(1900, 2), Some(28));
    assert_eq!(last_day_of_month(2000, 2), Some(29));
    assert_eq!(last_day_of_month(2025, 4), Some(30));
    assert_eq!(last_day_of_month(2025, 12), Some(31));
    assert_eq!(last_day_of_month(2025, 13), None);
    assert_eq!(last_day_of_month(2025, 0), None);
}

#[test]
fn month_parsing_and_display() {
    assert_eq!(month("2025-3").to_string(), "2025-03");
    assert_eq!(month(" 2025-11 ").to_string(), "2025-11");
    assert!("2025-13".parse::<Month>().is_err());
    assert!("25-01".parse::<Month>().is_err());
    assert!("2025/01".parse::<Month>().is_err());
    assert!("2025-".parse::<Month>().is_err());
    assert!(month("2024-12") < month("2025-01"));
}

#[test]
fn month_navigation_crosses_year_boundaries() {
    assert_eq!(month("2025-01").previous(), month("2024-12"));
    assert_eq!(month("2024-12").next(), month("2025-01"));
    assert_eq!(month("2025-02").day(31), date(2025, 2, 28));
    assert_eq!(month("2025-02").first_day(), date(2025, 2, 1));
}

#[test]
fn recurrence_window_is_inclusive_by_month() {
    let start = date(2025, 1, 20);
    let end = Some(date(2025, 3, 2));
    assert!(!is_within_recurrence_window(start, end, month("2024-12")));
    assert!(is_within_recurrence_window(start, end, month("2025-01")));
    assert!(is_within_recurrence_window(start, end, month("2025-03")));
    assert!(!is_within_recurrence_window(start, end, month("2025-04")));
    // open-ended runs until the sentinel
    assert!(is_within_recurrence_window(start, None, month("2199-06")));
    assert!(is_within_recurrence_window(start, None, Month::OPEN_END));
}

#[test]
fn due_only_inside_window_and_with_positive_amount() {
    let mut item = obligation("i1", "Car", "250.00", date(2025, 2, 10));
    item.end = Some(date(2025, 4, 30));
    assert_eq!(due_for_month(&item, month("2025-01")), Due::NotDue);
    assert_eq!(due_for_month(&item, month("2025-02")), Due::Due(dec("250.00")));
    assert_eq!(due_amount_for_month(&item, month("2025-05")), dec("0"));

    let zero = obligation("i2", "Free", "0", date(2025, 1, 1));
    assert_eq!(due_for_month(&zero, month("2025-03")), Due::NotDue);
    assert!(!due_for_month(&zero, month("2025-03")).is_due());
}

#[test]
fn effective_due_day_clamps_to_month_length() {
    assert_eq!(effective_due_day(Some(31), month("2025-02")), 28);
    assert_eq!(effective_due_day(Some(31), month("2024-02")), 29);
    assert_eq!(effective_due_day(Some(15), month("2025-02")), 15);
    assert_eq!(effective_due_day(None, month("2025-04")), 30);
    assert_eq!(effective_due_day(Some(0), month("2025-01")), 31);
}

#[test]
fn days_until_due_counts_calendar_days() {
    let mut item = obligation("b1", "Power", "80", date(2025, 1, 1));
    item.due_day = Some(10);
    let m = month("2025-03");
    assert_eq!(days_until_due(&item, m, date(2025, 3, 10)), 0);
    assert_eq!(days_until_due(&item, m, date(2025, 3, 7)), 3);
    assert_eq!(days_until_due(&item, m, date(2025, 3, 12)), -2);
    // due in a later month from the perspective of today
    assert_eq!(days_until_due(&item, month("2025-04"), date(2025, 3, 31)), 10);
}
