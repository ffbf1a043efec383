// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{FakeRemote, date, dec, offline_store, online_store, setup};
use pocketbook::db;
use pocketbook::ledger::PaymentKind;
use pocketbook::models::{
    NewExpense, NewExternalExpense, NewObligation, ObligationKind, PaymentMethod, Settings,
};
use pocketbook::store::local::LocalStore;
use pocketbook::store::outbox::{OUTBOX_KEY, PendingOperation};
use pocketbook::store::{Collection, Document, ReconcilingStore, is_temp_id, to_document};
use pocketbook::temporal::Month;
use rusqlite::Connection;
use serde_json::json;

fn doc(v: serde_json::Value) -> Document {
    to_document(&v).unwrap()
}

fn lunch() -> NewExpense {
    NewExpense {
        date: date(2025, 3, 4),
        category: "Food".into(),
        note: "lunch".into(),
        method: PaymentMethod::Card,
        amount: dec("12.50"),
    }
}

#[test]
fn offline_create_gets_temp_id_and_is_queued() {
    let remote = FakeRemote::new();
    let mut store = offline_store(&remote);

    let created = store.create(Collection::Expenses, doc(json!({ "cat": "Food" }))).unwrap();
    let id = created["id"].as_str().unwrap();
    assert!(is_temp_id(id));
    assert_eq!(created["isLocal"], true);

    let cached = store.read_all(Collection::Expenses).unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(store.pending().len(), 1);
    assert!(matches!(store.pending()[0], PendingOperation::Create { collection: Collection::Expenses, .. }));
    assert!(remote.calls().is_empty());
}

#[test]
fn temp_ids_are_unique_within_a_millisecond() {
    let remote = FakeRemote::new();
    let mut store = offline_store(&remote);
    let a = store.create(Collection::Budgets, doc(json!({ "cat": "A" }))).unwrap();
    let b = store.create(Collection::Budgets, doc(json!({ "cat": "B" }))).unwrap();
    assert_ne!(a["id"], b["id"]);
}

#[test]
fn reconnect_replays_queue_in_order_and_empties_it() {
    let remote = FakeRemote::new();
    remote.seed(Collection::Expenses, json!({ "id": "e1", "cat": "Old", "amount": "1" }));
    let mut store = offline_store(&remote);

    store.create(Collection::Expenses, doc(json!({ "cat": "New" }))).unwrap();
    store.update(Collection::Expenses, "e1", doc(json!({ "cat": "Edited" }))).unwrap();
    store.delete(Collection::Budgets, "gone").unwrap();
    assert_eq!(store.pending().len(), 3);

    let report = store.set_online(true).unwrap().unwrap();
    assert_eq!(report.replayed, 3);
    assert_eq!(report.dropped, 0);
    assert!(store.pending().is_empty());
    assert_eq!(
        remote.calls(),
        vec!["create expenses", "update expenses/e1", "delete budgets/gone"]
    );
    let edited = remote
        .docs(Collection::Expenses)
        .into_iter()
        .find(|d| d["id"] == "e1")
        .unwrap();
    assert_eq!(edited["cat"], "Edited");
    assert!(edited.contains_key("updatedAt"));
}

#[test]
fn failed_replays_are_dropped_not_retried() {
    let remote = FakeRemote::new();
    let mut store = offline_store(&remote);
    // a queued update of a record the remote never saw is rejected
    store.update(Collection::Expenses, "missing", doc(json!({ "cat": "X" }))).unwrap();
    store.create(Collection::Expenses, doc(json!({ "cat": "Y" }))).unwrap();

    let report = store.set_online(true).unwrap().unwrap();
    assert_eq!(report.replayed, 1);
    assert_eq!(report.dropped, 1);
    assert!(store.pending().is_empty());

    // nothing left to send a second time
    let again = store.drain().unwrap();
    assert_eq!(again.attempted(), 0);
}

#[test]
fn staying_online_does_not_drain_twice() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    assert!(store.set_online(true).unwrap().is_none());
    assert!(store.set_online(false).unwrap().is_none());
    assert!(!store.is_online());
}

#[test]
fn online_create_mirrors_remote_document() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    let created = store.create(Collection::Budgets, doc(json!({ "cat": "Food", "limit": "100" }))).unwrap();
    assert_eq!(created["id"], "doc-1");
    assert!(created.contains_key("createdAt"));
    assert!(store.pending().is_empty());

    store.set_online(false).unwrap();
    let cached = store.read_one(Collection::Budgets, "doc-1").unwrap().unwrap();
    assert_eq!(cached["cat"], "Food");
}

#[test]
fn remote_failure_on_create_keeps_record_locally_without_queueing() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    remote.set_failing(true);

    let created = store.create(Collection::Expenses, doc(json!({ "cat": "Food" }))).unwrap();
    assert!(is_temp_id(created["id"].as_str().unwrap()));
    assert_eq!(created["isLocal"], true);
    assert!(store.pending().is_empty());
    assert_eq!(store.read_all(Collection::Expenses).unwrap().len(), 1);
}

#[test]
fn reads_fall_back_to_cache_when_remote_fails() {
    let remote = FakeRemote::new();
    remote.seed(Collection::Bills, json!({ "id": "b1", "name": "Power" }));
    let mut store = online_store(&remote);
    assert_eq!(store.read_all(Collection::Bills).unwrap().len(), 1);

    remote.set_failing(true);
    let cached = store.read_all(Collection::Bills).unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0]["name"], "Power");
    let one = store.read_one(Collection::Bills, "b1").unwrap().unwrap();
    assert_eq!(one["id"], "b1");
    assert!(store.read_one(Collection::Bills, "nope").unwrap().is_none());
}

#[test]
fn delete_always_removes_locally() {
    let remote = FakeRemote::new();
    remote.seed(Collection::Budgets, json!({ "id": "k", "cat": "Fun", "limit": "5" }));
    let mut store = online_store(&remote);
    store.read_all(Collection::Budgets).unwrap();

    remote.set_failing(true);
    store.delete(Collection::Budgets, "k").unwrap();
    remote.set_failing(false);
    store.set_online(false).unwrap();
    assert!(store.read_all(Collection::Budgets).unwrap().is_empty());
    assert!(store.pending().is_empty());
}

#[test]
fn offline_settings_change_survives_reconnect() {
    let remote = FakeRemote::new();
    remote.seed(Collection::Settings, json!({ "id": "user_settings", "salary": "3000" }));
    let mut store = offline_store(&remote);

    let s = Settings {
        salary: dec("5000"),
        cash: true,
        ..Settings::default()
    };
    store.save_settings(&s).unwrap();
    assert_eq!(store.pending().len(), 1);
    assert_eq!(store.pending()[0].kind(), "set");
    assert_eq!(store.pending()[0].target_id(), Some("user_settings"));

    let report = store.set_online(true).unwrap().unwrap();
    assert_eq!(report.replayed, 1);
    assert!(store.pending().is_empty());
    let after = store.settings().unwrap();
    assert_eq!(after.salary, dec("5000"));
    assert!(after.cash);
    assert_eq!(remote.calls()[0], "set settings/user_settings");
}

#[test]
fn offline_payment_toggle_is_replayed() {
    let remote = FakeRemote::new();
    let mut store = offline_store(&remote);
    let m: Month = "2025-03".parse().unwrap();
    store.toggle_paid(PaymentKind::Installment, "i9", m).unwrap();
    assert_eq!(store.pending().len(), 1);

    store.set_online(true).unwrap();
    let records = remote.docs(Collection::Payments);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "installment_i9_2025-03");
    assert_eq!(records[0]["paid"], true);
}

#[test]
fn failed_online_update_applies_locally_without_queueing() {
    let remote = FakeRemote::new();
    remote.seed(Collection::Expenses, json!({ "id": "e1", "cat": "Food", "amount": "4" }));
    let mut store = online_store(&remote);
    store.read_all(Collection::Expenses).unwrap();

    remote.set_failing(true);
    let merged = store
        .update(Collection::Expenses, "e1", doc(json!({ "amount": "6" })))
        .unwrap();
    assert_eq!(merged["cat"], "Food");
    assert_eq!(merged["amount"], "6");
    assert!(store.pending().is_empty());

    store.set_online(false).unwrap();
    let cached = store.read_one(Collection::Expenses, "e1").unwrap().unwrap();
    assert_eq!(cached["amount"], "6");
    // the remote copy is untouched
    assert_eq!(remote.docs(Collection::Expenses)[0]["amount"], "4");
}

#[test]
fn edited_expense_moves_to_its_new_month() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    let created = store.add_expense(&lunch()).unwrap();
    let mut draft = lunch();
    draft.date = date(2025, 4, 2);
    draft.amount = dec("15");
    let updated = store.update_expense(&created.id, &draft).unwrap();
    assert_eq!(updated.amount, dec("15"));
    assert_eq!(remote.docs(Collection::Expenses)[0]["month"], "2025-04");
    assert!(store.expenses(Some("2025-03".parse().unwrap())).unwrap().is_empty());
}

#[test]
fn merge_set_overlays_existing_fields() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    store
        .set(Collection::Settings, "user_settings", doc(json!({ "salary": "1000", "theme": "dark" })), true)
        .unwrap();
    let merged = store
        .set(Collection::Settings, "user_settings", doc(json!({ "theme": "light" })), true)
        .unwrap();
    assert_eq!(merged["salary"], "1000");
    assert_eq!(merged["theme"], "light");
    let remote_doc = &remote.docs(Collection::Settings)[0];
    assert_eq!(remote_doc["salary"], "1000");
}

#[test]
fn outbox_survives_a_restart() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let open = || {
        let conn = Connection::open(tmp.path()).unwrap();
        db::init_schema(&conn).unwrap();
        conn
    };
    let remote = FakeRemote::new();
    {
        let mut store = ReconcilingStore::open(remote.clone(), open()).unwrap();
        store.add_expense(&lunch()).unwrap();
        assert_eq!(store.pending().len(), 1);
    }

    let mut store = ReconcilingStore::open(remote.clone(), open()).unwrap();
    assert_eq!(store.pending().len(), 1);
    let report = store.set_online(true).unwrap().unwrap();
    assert_eq!(report.replayed, 1);
    assert_eq!(remote.docs(Collection::Expenses).len(), 1);
    assert_eq!(store.local().get_item(OUTBOX_KEY).unwrap().as_deref(), Some("[]"));
}

#[test]
fn corrupt_cache_reads_as_empty() {
    let conn = setup();
    conn.set_item(Collection::Expenses.local_key(), "[{oops").unwrap();
    conn.set_item(OUTBOX_KEY, "nope").unwrap();
    let mut store = ReconcilingStore::open(FakeRemote::new(), conn).unwrap();
    assert!(store.read_all(Collection::Expenses).unwrap().is_empty());
    assert!(store.pending().is_empty());
    assert!(store.expenses(None).unwrap().is_empty());
}

#[test]
fn single_cached_object_reads_as_one_element() {
    let conn = setup();
    conn.set_item(Collection::Budgets.local_key(), r#"{"id":"b","cat":"Food","limit":"9"}"#)
        .unwrap();
    let mut store = ReconcilingStore::open(FakeRemote::new(), conn).unwrap();
    let budgets = store.budgets().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].limit, dec("9"));
}

#[test]
fn typed_expense_roundtrip_through_cache() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    let created = store.add_expense(&lunch()).unwrap();
    assert_eq!(created.category, "Food");
    assert_eq!(created.method, PaymentMethod::Card);
    assert_eq!(remote.docs(Collection::Expenses)[0]["month"], "2025-03");

    store.set_online(false).unwrap();
    let march = store.expenses(Some("2025-03".parse().unwrap())).unwrap();
    assert_eq!(march.len(), 1);
    assert!(store.expenses(Some("2025-04".parse().unwrap())).unwrap().is_empty());
}

#[test]
fn invalid_drafts_are_rejected_before_any_write() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    let mut bad = lunch();
    bad.amount = dec("0");
    assert!(store.add_expense(&bad).is_err());

    let draft = NewObligation {
        name: "Loan".into(),
        amount: dec("10"),
        start: date(2025, 5, 1),
        end: Some(date(2025, 4, 1)),
        due_day: None,
    };
    assert!(store.add_obligation(ObligationKind::Installment, &draft).is_err());
    assert!(remote.calls().iter().all(|c| !c.starts_with("create")));
}

#[test]
fn budget_upsert_matches_category_case_insensitively() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    let first = store.save_budget("Food", dec("200")).unwrap();
    let second = store.save_budget(" food ", dec("250")).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.limit, dec("250"));
    assert_eq!(store.budgets().unwrap().len(), 1);
    assert!(store.save_budget("Fun", dec("-1")).is_err());
}

#[test]
fn external_paid_toggle_flips_flag() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    let e = store
        .add_external_expense(&NewExternalExpense {
            date: date(2025, 3, 2),
            category: "Medical".into(),
            note: "dentist".into(),
            amount: dec("90"),
            paid: false,
        })
        .unwrap();
    assert_eq!(store.toggle_external_paid(&e.id).unwrap(), Some(true));
    assert_eq!(store.toggle_external_paid(&e.id).unwrap(), Some(false));
    assert_eq!(store.toggle_external_paid("nope").unwrap(), None);
    assert_eq!(remote.docs(Collection::External)[0]["paid"], false);
}

#[test]
fn payment_toggle_updates_ledger_and_remote_record() {
    let remote = FakeRemote::new();
    let mut store = online_store(&remote);
    let m: Month = "2025-03".parse().unwrap();

    assert!(store.toggle_paid(PaymentKind::Bill, "b1", m).unwrap());
    assert!(store.is_paid(PaymentKind::Bill, "b1", m));
    let records = remote.docs(Collection::Payments);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "bill_b1_2025-03");
    assert_eq!(records[0]["paid"], true);

    assert!(!store.toggle_paid(PaymentKind::Bill, "b1", m).unwrap());
    assert_eq!(remote.docs(Collection::Payments)[0]["paid"], false);
}
