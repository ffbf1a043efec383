// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{date, obligation, setup};
use pocketbook::classifier::{DueStatus, classify, due_alerts, sort_key, status_of};
use pocketbook::ledger::{PaymentKind, PaymentLedger};
use pocketbook::models::{Obligation, ObligationKind};
use pocketbook::temporal::{Month, due_for_month};

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

fn due_on(id: &str, name: &str, day: u32) -> Obligation {
    let mut o = obligation(id, name, "100", date(2025, 1, 1));
    o.due_day = Some(day);
    o
}

fn status(item: &Obligation, paid: bool, m: &str, today: chrono::NaiveDate) -> DueStatus {
    let m = month(m);
    status_of(paid, due_for_month(item, m), item, m, today)
}

#[test]
fn status_rules_apply_in_order() {
    let item = due_on("a", "Rent", 10);
    let today = date(2025, 3, 8);

    let mut ended = item.clone();
    ended.end = Some(date(2025, 2, 28));
    assert_eq!(status(&ended, false, "2025-03", today), DueStatus::NotDue);
    // paid beats every date rule
    assert_eq!(status(&item, true, "2025-02", today), DueStatus::Paid);
    assert_eq!(status(&item, false, "2025-02", today), DueStatus::Overdue);
    assert_eq!(status(&item, false, "2025-04", today), DueStatus::Upcoming);
    assert_eq!(status(&item, false, "2025-03", today), DueStatus::DueSoon);
    assert_eq!(status(&item, false, "2025-03", date(2025, 3, 10)), DueStatus::DueSoon);
    assert_eq!(status(&item, false, "2025-03", date(2025, 3, 11)), DueStatus::Overdue);
    assert_eq!(status(&item, false, "2025-03", date(2025, 3, 1)), DueStatus::Pending);
}

#[test]
fn classify_orders_by_priority_then_day_then_name() {
    let conn = setup();
    let mut ledger = PaymentLedger::load(&conn).unwrap();
    let m = month("2025-03");
    let today = date(2025, 3, 12);

    let items = vec![
        due_on("paid", "Gym", 1),
        due_on("late", "Phone", 5),
        due_on("soon-b", "Water", 14),
        due_on("soon-a", "Gas", 14),
        due_on("later", "Internet", 28),
    ];
    ledger
        .set_paid(&conn, PaymentKind::Bill, "paid", m, true)
        .unwrap();

    let out = classify(&ledger, ObligationKind::Bill, &items, m, today);
    let ids: Vec<&str> = out.iter().map(|c| c.item.id.as_str()).collect();
    assert_eq!(ids, vec!["late", "soon-a", "soon-b", "later", "paid"]);
    assert_eq!(out[0].status, DueStatus::Overdue);
    assert_eq!(out[4].status, DueStatus::Paid);
    assert_eq!(out[1].due_date, date(2025, 3, 14));
}

#[test]
fn sort_key_uses_clamped_due_day() {
    let conn = setup();
    let ledger = PaymentLedger::load(&conn).unwrap();
    let item = due_on("x", "Loan", 31);
    let key = sort_key(&ledger, ObligationKind::Installment, &item, month("2025-02"), date(2025, 1, 5));
    assert_eq!(key.due_day, 28);
    assert_eq!(key.priority, DueStatus::Upcoming.priority());
}

#[test]
fn alerts_only_for_the_current_month() {
    let conn = setup();
    let mut ledger = PaymentLedger::load(&conn).unwrap();
    let soon = due_on("s", "Rent", 10);
    let late = due_on("l", "Phone", 2);
    let far = due_on("f", "Internet", 25);
    let settled = due_on("p", "Gym", 9);
    let m = month("2025-03");
    ledger
        .set_paid(&conn, PaymentKind::Installment, "p", m, true)
        .unwrap();
    let items = [&soon, &late, &far, &settled];
    let tagged = || items.iter().map(|o| (ObligationKind::Installment, *o));

    assert_eq!(due_alerts(&ledger, tagged(), m, date(2025, 3, 8)), 2);
    assert_eq!(due_alerts(&ledger, tagged(), month("2025-04"), date(2025, 3, 8)), 0);
}
