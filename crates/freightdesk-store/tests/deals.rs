use freightdesk_core::domain::{CallFields, CallId, DealId, DealNew, DealTerms};
use freightdesk_store::error::{StoreError, StoreErrorKind};
use freightdesk_store::Store;

fn store() -> Store {
    let store = Store::open_in_memory().expect("open in memory");
    store.migrate().expect("migrate");
    store
}

fn deal_input(load_id: &str, call_id: Option<CallId>) -> DealNew {
    DealNew {
        terms: DealTerms {
            load_id: load_id.to_string(),
            start_location: "Atlanta, GA".to_string(),
            end_location: "Miami, FL".to_string(),
            initial_price: Some(950.0),
            agreed_price: None,
        },
        call_id,
    }
}

fn create_call(store: &Store, dba: &str) -> CallId {
    store
        .calls()
        .create(
            1_700_000_000,
            CallFields {
                sentiment: "neutral".to_string(),
                dba: dba.to_string(),
                datetime: 1_699_999_000,
                outcome: "callback".to_string(),
                call_outcome: Some("no_deal".to_string()),
            },
            None,
        )
        .expect("create call")
        .call
        .id
}

#[test]
fn create_without_call_id_succeeds() {
    let store = store();
    let deal = store
        .deals()
        .create(1_700_000_000, deal_input("L-1", None))
        .expect("create deal");
    assert_eq!(deal.call_id, None);
    assert_eq!(deal.initial_price, Some(950.0));

    let view = store.deals().get(deal.id).expect("get").expect("exists");
    assert_eq!(view.deal, deal);
    assert!(view.call_sentiment.is_none());
}

#[test]
fn create_with_unknown_call_id_fails() {
    let store = store();
    let err = store
        .deals()
        .create(1_700_000_000, deal_input("L-1", Some(CallId(77))))
        .unwrap_err();
    assert!(matches!(err, StoreError::MissingCall(CallId(77))));
    assert!(err.is_validation());
    assert_eq!(err.fields(), vec!["call_id"]);
    assert!(store.deals().list().expect("list").is_empty());
}

#[test]
fn create_rejects_missing_route() {
    let store = store();
    let mut input = deal_input("", None);
    input.terms.start_location = String::new();
    let err = store.deals().create(1, input).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::Core);
    assert_eq!(err.fields(), vec!["load_id", "start_location"]);
}

#[test]
fn list_joins_call_summary_newest_first() {
    let store = store();
    let call_id = create_call(&store, "Blue Line Logistics");

    let older = store
        .deals()
        .create(1_700_000_000, deal_input("L-old", Some(call_id)))
        .expect("create");
    let same_second = store
        .deals()
        .create(1_700_000_500, deal_input("L-a", None))
        .expect("create");
    let newest = store
        .deals()
        .create(1_700_000_500, deal_input("L-b", Some(call_id)))
        .expect("create");

    let views = store.deals().list().expect("list");
    let ids: Vec<DealId> = views.iter().map(|view| view.deal.id).collect();
    assert_eq!(ids, vec![newest.id, same_second.id, older.id]);

    assert_eq!(views[0].call_dba.as_deref(), Some("Blue Line Logistics"));
    assert_eq!(views[0].call_sentiment.as_deref(), Some("neutral"));
    assert_eq!(views[0].call_outcome.as_deref(), Some("callback"));
    assert_eq!(views[0].call_datetime, Some(1_699_999_000));
    assert!(views[1].call_dba.is_none());

    let for_call = store.deals().list_for_call(call_id).expect("for call");
    assert_eq!(for_call.len(), 2);
    assert_eq!(for_call[0].id, older.id);
}

#[test]
fn update_revalidates_call_reference() {
    let store = store();
    let call_id = create_call(&store, "Acme");
    let deal = store
        .deals()
        .create(1_700_000_000, deal_input("L-1", None))
        .expect("create");

    let err = store
        .deals()
        .update(deal.id, deal_input("L-1", Some(CallId(999))))
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::MissingCall);

    let mut replacement = deal_input("L-2", Some(call_id));
    replacement.terms.agreed_price = Some(0.0);
    let updated = store
        .deals()
        .update(deal.id, replacement)
        .expect("update");
    assert_eq!(updated.load_id, "L-2");
    assert_eq!(updated.call_id, Some(call_id));
    assert_eq!(updated.agreed_price, Some(0.0));
    assert_eq!(updated.created_at, deal.created_at);

    let cleared = store
        .deals()
        .update(deal.id, deal_input("L-2", None))
        .expect("clear call link");
    assert_eq!(cleared.call_id, None);
}

#[test]
fn update_and_delete_missing_deal_are_not_found() {
    let store = store();
    let err = store
        .deals()
        .update(DealId(5), deal_input("L-1", None))
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);

    let err = store.deals().delete(DealId(5)).unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}

#[test]
fn update_of_missing_deal_reports_not_found_before_blank_terms() {
    let store = store();
    let err = store
        .deals()
        .update(DealId(999), deal_input("", None))
        .unwrap_err();
    assert_eq!(err.kind(), StoreErrorKind::NotFound);
}

#[test]
fn delete_removes_only_the_deal() {
    let store = store();
    let call_id = create_call(&store, "Acme");
    let deal = store
        .deals()
        .create(1, deal_input("L-1", Some(call_id)))
        .expect("create");

    store.deals().delete(deal.id).expect("delete");
    assert!(store.deals().get(deal.id).expect("get").is_none());
    assert!(store.calls().get(call_id).expect("get call").is_some());
}
