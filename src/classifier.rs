// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::PaymentLedger;
use crate::models::{Obligation, ObligationKind};
use crate::temporal::{Due, Month, days_until_due, due_for_month, effective_due_day};

/// Unpaid items due within this many days count as due soon.
pub const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DueStatus {
    NotDue,
    Paid,
    Overdue,
    Upcoming,
    DueSoon,
    Pending,
}

impl DueStatus {
    /// Lower sorts first: unresolved urgent items surface at the top.
    pub fn priority(self) -> u8 {
        match self {
            DueStatus::Overdue => 0,
            DueStatus::DueSoon => 1,
            DueStatus::Pending | DueStatus::Upcoming => 2,
            DueStatus::Paid => 4,
            DueStatus::NotDue => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DueStatus::NotDue => "-",
            DueStatus::Paid => "paid",
            DueStatus::Overdue => "overdue",
            DueStatus::Upcoming => "upcoming",
            DueStatus::DueSoon => "due soon",
            DueStatus::Pending => "unpaid",
        }
    }
}

/// First matching rule wins: not due, paid, past month, future month, then
/// days until the due date.
pub fn status_of(paid: bool, due: Due, item: &Obligation, month: Month, today: NaiveDate) -> DueStatus {
    if !due.is_due() {
        return DueStatus::NotDue;
    }
    if paid {
        return DueStatus::Paid;
    }
    let current = Month::of(today);
    if month < current {
        return DueStatus::Overdue;
    }
    if month > current {
        return DueStatus::Upcoming;
    }
    let days = days_until_due(item, month, today);
    if days < 0 {
        DueStatus::Overdue
    } else if days <= DUE_SOON_DAYS {
        DueStatus::DueSoon
    } else {
        DueStatus::Pending
    }
}

/// Display order: priority, then effective due day, then name (byte order).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SortKey {
    pub priority: u8,
    pub due_day: u32,
    pub name: String,
}

pub fn sort_key(
    ledger: &PaymentLedger,
    kind: ObligationKind,
    item: &Obligation,
    month: Month,
    today: NaiveDate,
) -> SortKey {
    let due = due_for_month(item, month);
    let paid = ledger.is_paid(kind.payment_kind(), &item.id, month);
    SortKey {
        priority: status_of(paid, due, item, month, today).priority(),
        due_day: effective_due_day(item.due_day, month),
        name: item.name.clone(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedItem {
    pub kind: ObligationKind,
    pub item: Obligation,
    pub due: Decimal,
    pub paid: bool,
    pub status: DueStatus,
    pub due_date: NaiveDate,
    pub key: SortKey,
}

/// Classifies every item for `month` and returns them in display order.
pub fn classify(
    ledger: &PaymentLedger,
    kind: ObligationKind,
    items: &[Obligation],
    month: Month,
    today: NaiveDate,
) -> Vec<ClassifiedItem> {
    let mut out: Vec<ClassifiedItem> = items
        .iter()
        .map(|item| {
            let due = due_for_month(item, month);
            let paid = ledger.is_paid(kind.payment_kind(), &item.id, month);
            let status = status_of(paid, due, item, month, today);
            let due_day = effective_due_day(item.due_day, month);
            ClassifiedItem {
                kind,
                item: item.clone(),
                due: due.amount(),
                paid,
                status,
                due_date: month.day(due_day),
                key: SortKey {
                    priority: status.priority(),
                    due_day,
                    name: item.name.clone(),
                },
            }
        })
        .collect();
    out.sort_by(|a, b| a.key.cmp(&b.key));
    out
}

/// Unpaid items due within [`DUE_SOON_DAYS`] (or already late). Only the
/// current month raises alerts.
pub fn due_alerts<'a, I>(ledger: &PaymentLedger, items: I, month: Month, today: NaiveDate) -> usize
where
    I: IntoIterator<Item = (ObligationKind, &'a Obligation)>,
{
    if month != Month::of(today) {
        return 0;
    }
    items
        .into_iter()
        .filter(|(kind, item)| {
            due_for_month(item, month).is_due()
                && !ledger.is_paid(kind.payment_kind(), &item.id, month)
                && days_until_due(item, month, today) <= DUE_SOON_DAYS
        })
        .count()
}
