//! Pharmacy tools dispatched against an in-memory store.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use apothecary::store::{InventoryItem, MemoryStore, OtcOrRx, PharmacyStore, TicketKind};
use apothecary::tools::ToolDispatcher;

use common::*;

async fn call(d: &ToolDispatcher, name: &str, args: Value) -> Value {
    d.dispatch(name, &args.to_string(), None).await.unwrap()
}

async fn call_as(d: &ToolDispatcher, name: &str, args: Value, caller: &str) -> Value {
    d.dispatch(name, &args.to_string(), Some(caller)).await.unwrap()
}

#[tokio::test]
async fn medication_exact_match_in_english_and_hebrew() {
    let d = dispatcher(sample_store().await);

    let out = call(&d, "get_medication_by_name", json!({"query": "  PARACETAMOL "})).await;
    assert_eq!(out["found"], json!(true));
    assert_eq!(out["medication"]["id"], json!(PARACETAMOL_ID));
    assert_eq!(out["alternatives"], json!([]));

    let out = call(&d, "get_medication_by_name", json!({"query": "אמוקסיצילין"})).await;
    assert_eq!(out["medication"]["id"], json!(AMOXICILLIN_ID));
    assert_eq!(out["medication"]["otc_or_rx"], json!("rx"));
}

#[tokio::test]
async fn brand_alias_resolves_to_generic() {
    let d = dispatcher(sample_store().await);

    for query in ["dexamol", "Dexamol", "דקסמול"] {
        let out = call(&d, "get_medication_by_name", json!({ "query": query })).await;
        assert_eq!(out["found"], json!(true), "query {query}");
        assert_eq!(out["medication"]["id"], json!(PARACETAMOL_ID));
    }
}

#[tokio::test]
async fn partial_query_with_several_hits_is_ambiguous() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_medication(medication("m1", "Omeprazole", "אומפרזול", OtcOrRx::Otc))
        .await;
    store
        .insert_medication(medication("m2", "Omeprazole XR", "אומפרזול XR", OtcOrRx::Otc))
        .await;
    let d = dispatcher(store);

    let out = call(&d, "get_medication_by_name", json!({"query": "omepraz"})).await;
    assert_eq!(
        out,
        json!({
            "found": false,
            "medication": null,
            "alternatives": ["Omeprazole", "Omeprazole XR"],
            "error": "ambiguous",
        })
    );

    // The exact name wins even though it is also a substring of another.
    let out = call(&d, "get_medication_by_name", json!({"query": "omeprazole"})).await;
    assert_eq!(out["medication"]["id"], json!("m1"));

    // A single substring hit resolves.
    let out = call(&d, "get_medication_by_name", json!({"query": "xr"})).await;
    assert_eq!(out["medication"]["id"], json!("m2"));
}

#[tokio::test]
async fn medication_lookup_edge_cases() {
    let d = dispatcher(sample_store().await);

    let out = call(&d, "get_medication_by_name", json!({"query": "   "})).await;
    assert_eq!(out["error"], json!("empty_query"));

    let out = call(&d, "get_medication_by_name", json!({"query": "unobtainium"})).await;
    assert_eq!(
        out,
        json!({"found": false, "medication": null, "alternatives": [], "error": "not_found"})
    );
}

#[tokio::test]
async fn inventory_status_buckets() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_medication(medication("ibu", "Ibuprofen", "איבופרופן", OtcOrRx::Otc))
        .await;
    for (store_id, name, quantity) in [("S1", "A", 0), ("S2", "B", 2), ("S3", "C", 10)] {
        store
            .insert_inventory(InventoryItem::new("ibu", store_id, name, quantity))
            .await;
    }
    let d = dispatcher(store);

    let out = call(&d, "check_inventory", json!({"medication_id": "ibu"})).await;
    let statuses: Vec<(String, String)> = out["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["store_name"].as_str().unwrap().to_string(),
                r["status"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("A".to_string(), "out".to_string()),
            ("B".to_string(), "low".to_string()),
            ("C".to_string(), "in_stock".to_string()),
        ]
    );
}

#[tokio::test]
async fn inventory_store_filter_and_errors() {
    let d = dispatcher(sample_store().await);

    let out = call(
        &d,
        "check_inventory",
        json!({"medication_id": PARACETAMOL_ID, "store_name": "  tel aviv   - DIZENGOFF "}),
    )
    .await;
    assert_eq!(
        out,
        json!({"results": [{"store_name": DIZENGOFF, "quantity": 12, "status": "in_stock"}]})
    );

    let out = call(
        &d,
        "check_inventory",
        json!({"medication_id": PARACETAMOL_ID, "store_name": "Eilat"}),
    )
    .await;
    assert_eq!(out, json!({"results": [], "error": "unknown_store_or_no_record"}));

    let out = call(&d, "check_inventory", json!({})).await;
    assert_eq!(out, json!({"results": [], "error": "missing_medication_id"}));
}

#[tokio::test]
async fn prescription_requirement() {
    let d = dispatcher(sample_store().await);

    let out = call(
        &d,
        "check_prescription_requirement",
        json!({"medication_id": AMOXICILLIN_ID}),
    )
    .await;
    assert_eq!(
        out,
        json!({"requires_prescription": true, "notes": "Prescription required (Rx)."})
    );

    let out = call(
        &d,
        "check_prescription_requirement",
        json!({"medication_id": PARACETAMOL_ID}),
    )
    .await;
    assert_eq!(out["requires_prescription"], json!(false));

    let out = call(&d, "check_prescription_requirement", json!({"medication_id": "nope"})).await;
    assert_eq!(out["error"], json!("not_found"));
    assert_eq!(out["requires_prescription"], Value::Null);
}

#[tokio::test]
async fn user_by_phone_normalizes_input() {
    let d = dispatcher(sample_store().await);

    let out = call(&d, "get_user_by_phone", json!({"phone": " +97250-123-4567 "})).await;
    assert_eq!(out["found"], json!(true));
    assert_eq!(
        out["user"],
        json!({"id": USER_ID, "full_name": "Test User", "preferred_language": "en"})
    );

    let out = call(&d, "get_user_by_phone", json!({"phone": "12345"})).await;
    assert_eq!(out, json!({"found": false, "user": null, "error": "invalid_phone"}));

    let out = call(&d, "get_user_by_phone", json!({"phone": "+972509999999"})).await;
    assert_eq!(out, json!({"found": false, "user": null}));
}

#[tokio::test]
async fn current_user_needs_identity() {
    let d = dispatcher(sample_store().await);

    let out = call(&d, "get_current_user", json!({})).await;
    assert_eq!(
        out,
        json!({"found": false, "user": null, "error": "authentication_required"})
    );

    let out = call_as(&d, "get_current_user", json!({}), USER_ID).await;
    assert_eq!(out["found"], json!(true));
    assert_eq!(out["user"]["phone"], json!("+972501234567"));

    let out = call_as(&d, "get_current_user", json!({}), "ghost").await;
    assert_eq!(out, json!({"found": false, "user": null}));
}

#[tokio::test]
async fn prescription_request_creates_ticket() {
    let store = sample_store().await;
    let d = dispatcher(Arc::clone(&store));

    let out = call(
        &d,
        "create_prescription_request",
        json!({"user_id": USER_ID, "medication_id": AMOXICILLIN_ID, "pickup_store": DIZENGOFF}),
    )
    .await;
    assert_eq!(out["status"], json!("created"));
    let request_id = out["request_id"].as_str().unwrap().to_string();

    let tickets = store.tickets().await;
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].id, request_id);
    assert_eq!(tickets[0].kind, TicketKind::PrescriptionRequest);
    assert_eq!(tickets[0].store_name.as_deref(), Some(DIZENGOFF));
}

#[tokio::test]
async fn prescription_request_validation() {
    let d = dispatcher(sample_store().await);

    let cases = [
        (json!({"medication_id": AMOXICILLIN_ID}), "missing_required_fields"),
        (json!({"user_id": "ghost", "medication_id": AMOXICILLIN_ID}), "unknown_user"),
        (json!({"user_id": USER_ID, "medication_id": "nope"}), "unknown_medication"),
    ];
    for (args, error) in cases {
        let out = call(&d, "create_prescription_request", args).await;
        assert_eq!(
            out,
            json!({"request_id": null, "status": "error", "error": error})
        );
    }
}

#[tokio::test]
async fn reservation_decrements_stock_and_records_ticket() {
    let store = sample_store().await;
    let d = dispatcher(Arc::clone(&store));

    let out = call_as(
        &d,
        "reserve_inventory",
        json!({"medication_id": AMOXICILLIN_ID, "store_name": DIZENGOFF, "quantity": 2}),
        USER_ID,
    )
    .await;
    assert_eq!(out["reserved"], json!(true));
    let reservation_id = out["reservation_id"].as_str().unwrap().to_string();

    let stock = store.inventory(AMOXICILLIN_ID, None).await.unwrap();
    assert_eq!(stock[0].quantity, 3);

    let tickets = store.tickets().await;
    assert_eq!(tickets[0].id, reservation_id);
    assert_eq!(tickets[0].kind, TicketKind::InventoryReservation);
    assert_eq!(tickets[0].user_id.as_deref(), Some(USER_ID));
}

#[tokio::test]
async fn reservation_refusals() {
    let d = dispatcher(sample_store().await);

    let cases = [
        (json!({"medication_id": AMOXICILLIN_ID, "store_name": DIZENGOFF}), "missing_required_fields"),
        (
            json!({"medication_id": AMOXICILLIN_ID, "store_name": DIZENGOFF, "quantity": 0}),
            "missing_required_fields",
        ),
        (
            json!({"medication_id": AMOXICILLIN_ID, "store_name": "Eilat", "quantity": 1}),
            "store_or_item_not_found",
        ),
        (
            json!({"medication_id": AMOXICILLIN_ID, "store_name": DIZENGOFF, "quantity": 6}),
            "insufficient_stock",
        ),
    ];
    for (args, reason) in cases {
        let out = call_as(&d, "reserve_inventory", args, USER_ID).await;
        assert_eq!(out, json!({"reserved": false, "reason": reason}));
    }

    let out = call(
        &d,
        "reserve_inventory",
        json!({"medication_id": AMOXICILLIN_ID, "store_name": DIZENGOFF, "quantity": 1}),
    )
    .await;
    assert_eq!(out, json!({"reserved": false, "reason": "authentication_required"}));
}

#[tokio::test]
async fn seeded_store_answers_the_demo_questions() {
    let store: Arc<dyn PharmacyStore> = Arc::new(MemoryStore::seeded());
    let d = ToolDispatcher::new(Arc::new(apothecary::tools::ToolRegistry::pharmacy()), Some(store));

    let out = call(&d, "get_medication_by_name", json!({"query": "dexamol"})).await;
    assert_eq!(out["found"], json!(true));
    let id = out["medication"]["id"].as_str().unwrap().to_string();

    let out = call(&d, "check_inventory", json!({"medication_id": id})).await;
    assert_eq!(out["results"].as_array().unwrap().len(), 3);
}
