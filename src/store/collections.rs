// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed accessors for each collection, built on the generic operations.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::warn;

use super::local::LocalStore;
use super::remote::RemoteStore;
use super::{Collection, Document, ReconcilingStore, to_document};
use crate::ledger::PaymentKind;
use crate::models::{
    Budget, Expense, ExternalExpense, NewExpense, NewExternalExpense, NewObligation, Obligation,
    ObligationKind, Settings,
};
use crate::temporal::Month;

pub const SETTINGS_DOC_ID: &str = "user_settings";

fn decode<T: DeserializeOwned>(collection: Collection, doc: Document) -> Option<T> {
    match serde_json::from_value(Value::Object(doc)) {
        Ok(v) => Some(v),
        Err(err) => {
            warn!(%collection, %err, "skipping malformed record");
            None
        }
    }
}

fn decode_all<T: DeserializeOwned>(collection: Collection, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|d| decode(collection, d))
        .collect()
}

fn decode_written<T: DeserializeOwned>(collection: Collection, doc: Document) -> Result<T> {
    serde_json::from_value(Value::Object(doc))
        .with_context(|| format!("Stored {} record could not be read back", collection))
}

/// Document for a dated entry, with the derived `month` attribute refreshed.
fn dated_document<T: serde::Serialize>(entry: &T, date: chrono::NaiveDate) -> Result<Document> {
    let mut doc = to_document(entry)?;
    doc.insert("month".into(), Value::String(Month::of(date).to_string()));
    Ok(doc)
}

impl<R: RemoteStore, L: LocalStore> ReconcilingStore<R, L> {
    pub fn settings(&mut self) -> Result<Settings> {
        let doc = self.read_one(Collection::Settings, SETTINGS_DOC_ID)?;
        Ok(doc
            .and_then(|d| decode(Collection::Settings, d))
            .unwrap_or_default())
    }

    pub fn save_settings(&mut self, settings: &Settings) -> Result<Settings> {
        let doc = self.set(
            Collection::Settings,
            SETTINGS_DOC_ID,
            to_document(settings)?,
            true,
        )?;
        decode_written(Collection::Settings, doc)
    }

    pub fn obligations(&mut self, kind: ObligationKind) -> Result<Vec<Obligation>> {
        let collection = kind.collection();
        let docs = self.read_all(collection)?;
        Ok(decode_all(collection, docs))
    }

    pub fn add_obligation(&mut self, kind: ObligationKind, draft: &NewObligation) -> Result<Obligation> {
        draft.validate()?;
        let collection = kind.collection();
        let doc = self.create(collection, to_document(draft)?)?;
        decode_written(collection, doc)
    }

    pub fn delete_obligation(&mut self, kind: ObligationKind, id: &str) -> Result<()> {
        self.delete(kind.collection(), id)
    }

    /// Daily expenses, newest first, optionally restricted to one month.
    pub fn expenses(&mut self, month: Option<Month>) -> Result<Vec<Expense>> {
        let docs = self.read_all(Collection::Expenses)?;
        let mut items: Vec<Expense> = decode_all(Collection::Expenses, docs);
        if let Some(m) = month {
            items.retain(|e| e.month() == m);
        }
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }

    pub fn add_expense(&mut self, draft: &NewExpense) -> Result<Expense> {
        draft.validate()?;
        let doc = self.create(Collection::Expenses, dated_document(draft, draft.date)?)?;
        decode_written(Collection::Expenses, doc)
    }

    pub fn update_expense(&mut self, id: &str, draft: &NewExpense) -> Result<Expense> {
        draft.validate()?;
        let doc = self.update(Collection::Expenses, id, dated_document(draft, draft.date)?)?;
        decode_written(Collection::Expenses, doc)
    }

    pub fn delete_expense(&mut self, id: &str) -> Result<()> {
        self.delete(Collection::Expenses, id)
    }

    /// External expenses, newest first, optionally restricted to one month.
    pub fn external_expenses(&mut self, month: Option<Month>) -> Result<Vec<ExternalExpense>> {
        let docs = self.read_all(Collection::External)?;
        let mut items: Vec<ExternalExpense> = decode_all(Collection::External, docs);
        if let Some(m) = month {
            items.retain(|e| e.month() == m);
        }
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }

    pub fn add_external_expense(&mut self, draft: &NewExternalExpense) -> Result<ExternalExpense> {
        draft.validate()?;
        let doc = self.create(Collection::External, dated_document(draft, draft.date)?)?;
        decode_written(Collection::External, doc)
    }

    /// Flips the paid flag; `None` when no such expense exists.
    pub fn toggle_external_paid(&mut self, id: &str) -> Result<Option<bool>> {
        let Some(current) = self
            .external_expenses(None)?
            .into_iter()
            .find(|e| e.id == id)
        else {
            return Ok(None);
        };
        let paid = !current.paid;
        let mut doc = dated_document(&current, current.date)?;
        doc.insert("paid".into(), Value::Bool(paid));
        self.update(Collection::External, id, doc)?;
        Ok(Some(paid))
    }

    pub fn delete_external_expense(&mut self, id: &str) -> Result<()> {
        self.delete(Collection::External, id)
    }

    pub fn budgets(&mut self) -> Result<Vec<Budget>> {
        let docs = self.read_all(Collection::Budgets)?;
        Ok(decode_all(Collection::Budgets, docs))
    }

    /// Creates the budget, or updates the one whose category matches
    /// case-insensitively.
    pub fn save_budget(&mut self, category: &str, limit: Decimal) -> Result<Budget> {
        let category = category.trim();
        if category.is_empty() {
            anyhow::bail!("Category must not be empty");
        }
        if limit <= Decimal::ZERO {
            anyhow::bail!("Budget limit must be positive, got {}", limit);
        }
        let existing = self.budgets()?.into_iter().find(|b| b.matches(category));
        let doc = match existing {
            Some(b) => {
                let data = to_document(&json!({ "limit": limit }))?;
                self.update(Collection::Budgets, &b.id, data)?
            }
            None => {
                let data = to_document(&json!({ "cat": category, "limit": limit }))?;
                self.create(Collection::Budgets, data)?
            }
        };
        decode_written(Collection::Budgets, doc)
    }

    pub fn delete_budget(&mut self, id: &str) -> Result<()> {
        self.delete(Collection::Budgets, id)
    }

    pub fn is_paid(&self, kind: PaymentKind, id: &str, month: Month) -> bool {
        self.ledger.is_paid(kind, id, month)
    }

    /// Records the flag in the ledger and mirrors a payment record remotely
    /// under `{kind}_{id}_{month}`.
    pub fn set_payment_status(
        &mut self,
        kind: PaymentKind,
        id: &str,
        month: Month,
        paid: bool,
    ) -> Result<()> {
        let record = to_document(&json!({
            "type": kind,
            "itemId": id,
            "month": month,
            "paid": paid,
        }))?;
        let payment_id = format!("{}_{}_{}", kind, id, month);
        self.set(Collection::Payments, &payment_id, record, true)?;
        self.ledger.set_paid(&self.local, kind, id, month, paid)
    }

    pub fn toggle_paid(&mut self, kind: PaymentKind, id: &str, month: Month) -> Result<bool> {
        let paid = !self.is_paid(kind, id, month);
        self.set_payment_status(kind, id, month, paid)?;
        Ok(paid)
    }
}
