use freightdesk_core::domain::{CallFields, CallId, DealTerms};
use freightdesk_core::CoreError;
use freightdesk_store::error::{StoreError, StoreErrorKind};
use freightdesk_store::Store;

fn store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn fields(dba: &str, datetime: i64, outcome: &str) -> CallFields {
    CallFields {
        sentiment: "positive".to_string(),
        dba: dba.to_string(),
        datetime,
        outcome: outcome.to_string(),
        call_outcome: None,
    }
}

fn terms() -> DealTerms {
    DealTerms {
        load_id: "L-100".to_string(),
        start_location: "Chicago, IL".to_string(),
        end_location: "Dallas, TX".to_string(),
        initial_price: Some(1800.0),
        agreed_price: Some(1650.0),
    }
}

#[test]
fn agreement_creates_linked_deal() {
    let store = store();
    let now = 1_700_000_000;

    let record = store
        .calls()
        .create(now, fields("Acme Hauling", now - 60, "yes"), Some(terms()))
        .expect("create call");

    let deal = record.deal.expect("deal created");
    assert_eq!(deal.call_id, Some(record.call.id));
    assert_eq!(deal.load_id, "L-100");
    assert_eq!(deal.agreed_price, Some(1650.0));
    assert_eq!(record.call.created_at, now);

    let deals = store.deals().list().expect("list deals");
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0].deal.id, deal.id);
    assert_eq!(store.calls().list().expect("list calls").len(), 1);
}

#[test]
fn other_outcomes_never_create_deals() {
    let store = store();
    let now = 1_700_000_000;

    for outcome in ["no", "Yes", "yes ", "maybe"] {
        let record = store
            .calls()
            .create(now, fields("Acme Hauling", now, outcome), Some(terms()))
            .expect("create call");
        assert!(record.deal.is_none(), "outcome {outcome:?} produced a deal");
    }

    assert!(store.deals().list().expect("list deals").is_empty());
    assert_eq!(store.calls().list().expect("list calls").len(), 4);
}

#[test]
fn agreement_without_terms_writes_nothing() {
    let store = store();
    let now = 1_700_000_000;

    let err = store
        .calls()
        .create(now, fields("Acme Hauling", now, "yes"), None)
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Core);
    assert_eq!(
        err.fields(),
        vec!["load_id", "start_location", "end_location"]
    );

    let mut partial = terms();
    partial.end_location = "  ".to_string();
    let err = store
        .calls()
        .create(now, fields("Acme Hauling", now, "yes"), Some(partial))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Core(CoreError::MissingDealFields(ref fields)) if fields == &vec!["end_location"]
    ));

    assert!(store.calls().list().expect("list calls").is_empty());
    assert!(store.deals().list().expect("list deals").is_empty());
}

#[test]
fn create_rejects_blank_required_fields() {
    let store = store();
    let mut input = fields("", 1, "no");
    input.sentiment = String::new();

    let err = store.calls().create(1, input, None).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.fields(), vec!["sentiment", "dba"]);
    assert!(store.calls().list().expect("list").is_empty());
}

#[test]
fn list_orders_by_conversation_time_descending() {
    let store = store();
    let now = 1_700_000_000;

    store
        .calls()
        .create(now, fields("Oldest", now - 300, "no"), None)
        .expect("create");
    let tie_a = store
        .calls()
        .create(now, fields("Tie A", now - 100, "no"), None)
        .expect("create");
    let tie_b = store
        .calls()
        .create(now, fields("Tie B", now - 100, "no"), None)
        .expect("create");
    store
        .calls()
        .create(now, fields("Newest", now, "no"), None)
        .expect("create");

    let names: Vec<String> = store
        .calls()
        .list()
        .expect("list")
        .into_iter()
        .map(|call| call.dba)
        .collect();
    assert_eq!(names, vec!["Newest", "Tie B", "Tie A", "Oldest"]);
    assert!(tie_b.call.id > tie_a.call.id);
}

#[test]
fn update_replaces_fields_without_creating_deal() {
    let store = store();
    let now = 1_700_000_000;
    let record = store
        .calls()
        .create(now, fields("Acme Hauling", now, "no"), None)
        .expect("create");

    let mut replacement = fields("Acme Freight", now + 30, "yes");
    replacement.sentiment = "neutral".to_string();
    replacement.call_outcome = Some("deal".to_string());
    let updated = store
        .calls()
        .update(record.call.id, replacement)
        .expect("update");

    assert_eq!(updated.dba, "Acme Freight");
    assert_eq!(updated.outcome, "yes");
    assert_eq!(updated.call_outcome.as_deref(), Some("deal"));
    assert_eq!(updated.created_at, now);

    let fetched = store
        .calls()
        .get(record.call.id)
        .expect("get")
        .expect("call exists");
    assert_eq!(fetched, updated);
    assert!(store.deals().list().expect("list deals").is_empty());
}

#[test]
fn update_and_delete_missing_call_are_not_found() {
    let store = store();
    let missing = CallId(404);

    let err = store
        .calls()
        .update(missing, fields("Ghost", 1, "no"))
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);

    let err = store.calls().delete(missing).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
    assert!(store.calls().get(missing).expect("get").is_none());
}

#[test]
fn update_of_missing_call_reports_not_found_before_blank_fields() {
    let store = store();
    let err = store
        .calls()
        .update(CallId(999), fields("", 0, ""))
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}

#[test]
fn deleting_call_leaves_deal_dangling() {
    let store = store();
    let now = 1_700_000_000;
    let record = store
        .calls()
        .create(now, fields("Acme Hauling", now, "yes"), Some(terms()))
        .expect("create");
    let deal = record.deal.expect("deal");

    store.calls().delete(record.call.id).expect("delete call");
    let err = store.calls().delete(record.call.id).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);

    let view = store
        .deals()
        .get(deal.id)
        .expect("get deal")
        .expect("deal survives");
    assert_eq!(view.deal.call_id, Some(record.call.id));
    assert!(view.call_dba.is_none());
    assert!(view.call_outcome.is_none());
}

#[test]
fn ids_are_never_reused() {
    let store = store();
    let first = store
        .calls()
        .create(1, fields("First", 1, "no"), None)
        .expect("create");
    store.calls().delete(first.call.id).expect("delete");
    let second = store
        .calls()
        .create(2, fields("Second", 2, "no"), None)
        .expect("create");
    assert!(second.call.id > first.call.id);
}
