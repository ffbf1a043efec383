// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ledger::PaymentKind;
use crate::store::Collection;
use crate::temporal::Month;

/// Category given to expenses synthesized from unpaid obligations of the previous month.
pub const ROLLOVER_CATEGORY: &str = "Arrears rollover";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObligationKind {
    Installment,
    Bill,
}

impl ObligationKind {
    pub const ALL: [ObligationKind; 2] = [ObligationKind::Installment, ObligationKind::Bill];

    pub fn collection(self) -> Collection {
        match self {
            ObligationKind::Installment => Collection::Installments,
            ObligationKind::Bill => Collection::Bills,
        }
    }

    pub fn payment_kind(self) -> PaymentKind {
        match self {
            ObligationKind::Installment => PaymentKind::Installment,
            ObligationKind::Bill => PaymentKind::Bill,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ObligationKind::Installment => "Installment",
            ObligationKind::Bill => "Bill",
        }
    }
}

/// An installment or a bill: a fixed amount owed every month of its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub start: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(rename = "dueDay", default)]
    pub due_day: Option<u32>,
    #[serde(rename = "isLocal", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_local: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewObligation {
    pub name: String,
    pub amount: Decimal,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    #[serde(rename = "dueDay")]
    pub due_day: Option<u32>,
}

impl NewObligation {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Name must not be empty");
        }
        if self.amount <= Decimal::ZERO {
            bail!("Amount must be positive, got {}", self.amount);
        }
        if let Some(end) = self.end {
            if end < self.start {
                bail!("End date {} is before start date {}", end, self.start);
            }
        }
        if let Some(day) = self.due_day {
            if !(1..=31).contains(&day) {
                bail!("Due day must be between 1 and 31, got {}", day);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Transfer,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "transfer" => Ok(PaymentMethod::Transfer),
            "wallet" => Ok(PaymentMethod::Wallet),
            other => bail!("Unknown payment method '{}' (use cash|card|transfer|wallet)", other),
        }
    }
}

/// A day-to-day expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "cat")]
    pub category: String,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "pay", default)]
    pub method: PaymentMethod,
    pub amount: Decimal,
    #[serde(rename = "isLocal", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_local: bool,
}

impl Expense {
    pub fn month(&self) -> Month {
        Month::of(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    #[serde(rename = "cat")]
    pub category: String,
    pub note: String,
    #[serde(rename = "pay")]
    pub method: PaymentMethod,
    pub amount: Decimal,
}

impl NewExpense {
    pub fn validate(&self) -> Result<()> {
        validate_entry(&self.category, self.amount)
    }
}

/// A one-off expense outside the daily budget, settled or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalExpense {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "cat")]
    pub category: String,
    #[serde(default)]
    pub note: String,
    pub amount: Decimal,
    #[serde(default)]
    pub paid: bool,
    #[serde(rename = "isLocal", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_local: bool,
}

impl ExternalExpense {
    pub fn month(&self) -> Month {
        Month::of(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExternalExpense {
    pub date: NaiveDate,
    #[serde(rename = "cat")]
    pub category: String,
    pub note: String,
    pub amount: Decimal,
    pub paid: bool,
}

impl NewExternalExpense {
    pub fn validate(&self) -> Result<()> {
        validate_entry(&self.category, self.amount)
    }
}

fn validate_entry(category: &str, amount: Decimal) -> Result<()> {
    if category.trim().is_empty() {
        bail!("Category must not be empty");
    }
    if amount <= Decimal::ZERO {
        bail!("Amount must be positive, got {}", amount);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    #[serde(rename = "cat")]
    pub category: String,
    pub limit: Decimal,
}

impl Budget {
    pub fn matches(&self, category: &str) -> bool {
        self.category.trim().to_lowercase() == category.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub salary: Decimal,
    /// Monthly saving target.
    pub saving: Decimal,
    /// Count obligations and external expenses only once they are paid.
    pub cash: bool,
    /// Settle recurring items automatically once their due day has passed.
    pub auto: bool,
    /// Carry unpaid obligations of the previous month into the current one.
    pub roll: bool,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            salary: Decimal::ZERO,
            saving: Decimal::ZERO,
            cash: false,
            auto: false,
            roll: false,
            theme: "dark".to_string(),
        }
    }
}

impl Settings {
    /// 15% of the salary, rounded to a whole unit.
    pub fn suggested_saving(&self) -> Decimal {
        (self.salary * Decimal::new(15, 2)).round()
    }
}
