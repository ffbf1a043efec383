// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly totals, plus the two month-view side effects: auto-settling
//! obligations whose due day has passed and rolling unpaid ones forward.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

use crate::ledger::PaymentLedger;
use crate::models::{
    Budget, Expense, ExternalExpense, NewExternalExpense, Obligation, ObligationKind,
    ROLLOVER_CATEGORY, Settings,
};
use crate::store::ReconcilingStore;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use crate::temporal::{Due, Month, days_until_due, due_for_month};

/// Budget usage at or above this percentage raises a warning.
pub const BUDGET_WARNING_PERCENT: u32 = 80;

#[derive(Debug, Clone, Default)]
pub struct MonthInputs {
    pub installments: Vec<Obligation>,
    pub bills: Vec<Obligation>,
    pub expenses: Vec<Expense>,
    pub external: Vec<ExternalExpense>,
}

impl MonthInputs {
    pub fn load<R: RemoteStore, L: LocalStore>(store: &mut ReconcilingStore<R, L>) -> Result<MonthInputs> {
        Ok(MonthInputs {
            installments: store.obligations(ObligationKind::Installment)?,
            bills: store.obligations(ObligationKind::Bill)?,
            expenses: store.expenses(None)?,
            external: store.external_expenses(None)?,
        })
    }

    pub fn obligations(&self) -> impl Iterator<Item = (ObligationKind, &Obligation)> {
        self.installments
            .iter()
            .map(|i| (ObligationKind::Installment, i))
            .chain(self.bills.iter().map(|b| (ObligationKind::Bill, b)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: Month,
    pub income: Decimal,
    pub installments_total: Decimal,
    pub bills_total: Decimal,
    pub recurring_total: Decimal,
    pub daily_expense_total: Decimal,
    pub external_total: Decimal,
    pub total_expenses: Decimal,
    /// Negative when the month overspent.
    pub actual_savings: Decimal,
    pub saving_target: Decimal,
    /// Percent of income saved; absent without income.
    pub savings_rate: Option<Decimal>,
    /// Percent of the saving target reached; absent without a target.
    pub target_achievement: Option<Decimal>,
}

fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        None
    } else {
        Some((part / whole * Decimal::ONE_HUNDRED).round_dp(1))
    }
}

/// In cash mode only settled items count toward the totals.
fn counts(cash_mode: bool, paid: bool) -> bool {
    !cash_mode || paid
}

pub fn summarize(
    inputs: &MonthInputs,
    ledger: &PaymentLedger,
    settings: &Settings,
    month: Month,
) -> MonthlySummary {
    let mut installments_total = Decimal::ZERO;
    let mut bills_total = Decimal::ZERO;
    for (kind, item) in inputs.obligations() {
        let Due::Due(amount) = due_for_month(item, month) else {
            continue;
        };
        let paid = ledger.is_paid(kind.payment_kind(), &item.id, month);
        if !counts(settings.cash, paid) {
            continue;
        }
        match kind {
            ObligationKind::Installment => installments_total += amount,
            ObligationKind::Bill => bills_total += amount,
        }
    }

    let daily_expense_total: Decimal = inputs
        .expenses
        .iter()
        .filter(|e| e.month() == month)
        .map(|e| e.amount)
        .sum();
    let external_total: Decimal = inputs
        .external
        .iter()
        .filter(|e| e.month() == month && counts(settings.cash, e.paid))
        .map(|e| e.amount)
        .sum();

    let recurring_total = installments_total + bills_total;
    let total_expenses = recurring_total + daily_expense_total + external_total;
    let actual_savings = settings.salary - total_expenses;
    MonthlySummary {
        month,
        income: settings.salary,
        installments_total,
        bills_total,
        recurring_total,
        daily_expense_total,
        external_total,
        total_expenses,
        actual_savings,
        saving_target: settings.saving,
        savings_rate: percent_of(actual_savings, settings.salary),
        target_achievement: percent_of(actual_savings, settings.saving),
    }
}

pub fn summarize_month<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    month: Month,
) -> Result<MonthlySummary> {
    let settings = store.settings()?;
    let inputs = MonthInputs::load(store)?;
    Ok(summarize(&inputs, store.ledger(), &settings, month))
}

/// Summaries of the month before `month` and of `month` itself.
pub fn compare_months<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    month: Month,
) -> Result<(MonthlySummary, MonthlySummary)> {
    let settings = store.settings()?;
    let inputs = MonthInputs::load(store)?;
    Ok((
        summarize(&inputs, store.ledger(), &settings, month.previous()),
        summarize(&inputs, store.ledger(), &settings, month),
    ))
}

/// Marks every due, unpaid obligation whose due date is today or earlier as
/// paid. Never unmarks anything. Returns how many items were settled.
pub fn auto_deduct_if_due<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    month: Month,
    today: NaiveDate,
) -> Result<usize> {
    let inputs = MonthInputs::load(store)?;
    let mut settled = 0;
    for (kind, item) in inputs.obligations() {
        if !due_for_month(item, month).is_due() {
            continue;
        }
        let payment_kind = kind.payment_kind();
        if store.is_paid(payment_kind, &item.id, month) {
            continue;
        }
        if days_until_due(item, month, today) <= 0 {
            store.set_payment_status(payment_kind, &item.id, month, true)?;
            settled += 1;
        }
    }
    if settled > 0 {
        info!(%month, settled, "auto-settled due items");
    }
    Ok(settled)
}

pub fn arrears_note(name: &str, month: Month) -> String {
    format!("{} ({})", name, month)
}

/// Carries obligations left unpaid last month into `month` as external
/// expenses dated the 1st. An entry with the same note already in `month`
/// suppresses the copy, so re-running is harmless.
pub fn rollover_arrears<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    month: Month,
) -> Result<usize> {
    let previous = month.previous();
    let inputs = MonthInputs::load(store)?;
    let mut notes: HashSet<String> = inputs
        .external
        .iter()
        .filter(|e| e.month() == month)
        .map(|e| e.note.clone())
        .collect();

    let mut rolled = 0;
    for (kind, item) in inputs.obligations() {
        let Due::Due(amount) = due_for_month(item, previous) else {
            continue;
        };
        if store.is_paid(kind.payment_kind(), &item.id, previous) {
            continue;
        }
        let note = arrears_note(&item.name, previous);
        if notes.contains(&note) {
            continue;
        }
        store.add_external_expense(&NewExternalExpense {
            date: month.first_day(),
            category: ROLLOVER_CATEGORY.to_string(),
            note: note.clone(),
            amount,
            paid: false,
        })?;
        notes.insert(note);
        rolled += 1;
    }
    if rolled > 0 {
        info!(%month, rolled, "rolled over unpaid items");
    }
    Ok(rolled)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthPrep {
    pub auto_settled: usize,
    pub rolled_over: usize,
}

/// Runs the side effects enabled in settings before a month is shown.
pub fn prepare_month<R: RemoteStore, L: LocalStore>(
    store: &mut ReconcilingStore<R, L>,
    month: Month,
    today: NaiveDate,
) -> Result<MonthPrep> {
    let settings = store.settings()?;
    let mut prep = MonthPrep::default();
    if settings.auto {
        prep.auto_settled = auto_deduct_if_due(store, month, today)?;
    }
    if settings.roll {
        prep.rolled_over = rollover_arrears(store, month)?;
    }
    Ok(prep)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetLevel {
    Ok,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub category: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub percent: Decimal,
    pub level: BudgetLevel,
}

/// Daily spending per budget in `month`; categories match case-insensitively.
pub fn budget_usage(budgets: &[Budget], expenses: &[Expense], month: Month) -> Vec<BudgetUsage> {
    budgets
        .iter()
        .map(|b| {
            let spent: Decimal = expenses
                .iter()
                .filter(|e| e.month() == month && b.matches(&e.category))
                .map(|e| e.amount)
                .sum();
            let percent = percent_of(spent, b.limit).unwrap_or(Decimal::ZERO);
            let level = if percent >= Decimal::ONE_HUNDRED {
                BudgetLevel::Exceeded
            } else if percent >= Decimal::from(BUDGET_WARNING_PERCENT) {
                BudgetLevel::Warning
            } else {
                BudgetLevel::Ok
            };
            BudgetUsage {
                category: b.category.clone(),
                limit: b.limit,
                spent,
                percent,
                level,
            }
        })
        .collect()
}

/// Usage of the budget covering `category` in `month`, when one exists.
pub fn category_budget_usage(
    budgets: &[Budget],
    expenses: &[Expense],
    category: &str,
    month: Month,
) -> Option<BudgetUsage> {
    let budget = budgets.iter().find(|b| b.matches(category))?;
    budget_usage(std::slice::from_ref(budget), expenses, month).pop()
}
