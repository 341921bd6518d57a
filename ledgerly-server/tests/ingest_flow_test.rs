//! End-to-end logic tests for the classification ingest path: a raw webhook
//! payload is verified, mapped to insert rows, and later aggregated into the
//! per-file category summary. No database or network is involved; these cover
//! the pure pipeline between the wire format and the summary output.

use ledgerly_core::utils::signature::{compute_signature, verify_signature};
use ledgerly_server::services::ingest::{extract_events, map_events};
use ledgerly_server::services::summary::{summarize, TxnView, UNCATEGORIZED};
use rust_decimal_macros::dec;
use serde_json::json;

const SECRET: &str = "test-webhook-secret";

fn batch_payload() -> serde_json::Value {
    json!({
        "events": [
            {
                "accountant_id": "5f0f5f7a-9df0-4b70-9e5c-0a54a7f1f3a1",
                "client_id": "b0c1d2e3-f405-4607-a809-0a1b2c3d4e5f",
                "file_id": "3b9f6a50-b6ac-4c4e-a3b0-4a676a2f0d36",
                "category_id": 1,
                "tx_amount": -120.50,
                "tx_narration": "SWIGGY ORDER",
                "confidence": "high"
            },
            {
                "accountant_id": "5f0f5f7a-9df0-4b70-9e5c-0a54a7f1f3a1",
                "client_id": "b0c1d2e3-f405-4607-a809-0a1b2c3d4e5f",
                "file_id": "3b9f6a50-b6ac-4c4e-a3b0-4a676a2f0d36",
                "category_id": null,
                "tx_amount": 45000,
                "tx_narration": "SALARY CREDIT"
            },
            {
                "file_id": "3b9f6a50-b6ac-4c4e-a3b0-4a676a2f0d36",
                "tx_amount": -10
            }
        ]
    })
}

#[test]
fn signed_payload_round_trips_through_verification() {
    let body = serde_json::to_vec(&batch_payload()).unwrap();

    let signature = compute_signature(SECRET, &body).unwrap();
    assert!(verify_signature(SECRET, &body, &signature).unwrap());

    let prefixed = format!("sha256={}", signature);
    assert!(verify_signature(SECRET, &body, &prefixed).unwrap());

    // A different secret must not verify.
    assert!(!verify_signature("other-secret", &body, &signature).unwrap());
}

#[test]
fn batch_maps_valid_events_and_reports_invalid_ones() {
    let events = extract_events(batch_payload()).unwrap();
    let (rows, invalids) = map_events(events);

    assert_eq!(rows.len(), 2);
    assert_eq!(invalids.len(), 1);
    assert_eq!(invalids[0].index, 2);
    assert!(invalids[0].error.contains("accountant_id"));
    assert!(invalids[0].error.contains("client_id"));

    assert_eq!(rows[0].category_id_by_ai, Some(1));
    assert_eq!(rows[0].tx_amount, Some(dec!(-120.50)));
    assert_eq!(rows[1].category_id_by_ai, None);
}

#[test]
fn ingested_rows_aggregate_into_file_summary() {
    let events = extract_events(batch_payload()).unwrap();
    let (rows, _) = map_events(events);

    // Name resolution happens at listing time; the AI-categorized row gets a
    // name, the uncategorized one does not.
    let names: Vec<Option<&str>> = rows
        .iter()
        .map(|r| r.category_id_by_ai.map(|_| "Food & Dining"))
        .collect();

    let views: Vec<TxnView<'_>> = rows
        .iter()
        .zip(names.iter())
        .map(|(row, name)| TxnView {
            category: *name,
            amount: row.tx_amount,
        })
        .collect();

    let summary = summarize(&views);

    assert_eq!(summary.expense.total, dec!(120.50));
    assert_eq!(summary.expense.groups[0].name, "Food & Dining");
    assert_eq!(summary.income.total, dec!(45000));
    assert_eq!(summary.income.groups[0].name, UNCATEGORIZED);
    assert_eq!(summary.unified.total, dec!(45120.50));
    assert_eq!(summary.unified.groups.len(), 2);
}

#[test]
fn all_invalid_batch_yields_no_rows() {
    // The webhook rejects a batch with zero mappable events; this is the
    // shape such a batch reduces to.
    let events = extract_events(json!([{"tx_amount": -5}, {"category_id": 2}])).unwrap();
    let (rows, invalids) = map_events(events);

    assert!(rows.is_empty());
    assert_eq!(invalids.len(), 2);
}

#[test]
fn bare_array_payload_flows_the_same_way() {
    let events = extract_events(json!([
        {
            "accountant_id": "5f0f5f7a-9df0-4b70-9e5c-0a54a7f1f3a1",
            "client_id": "b0c1d2e3-f405-4607-a809-0a1b2c3d4e5f",
            "file_id": "3b9f6a50-b6ac-4c4e-a3b0-4a676a2f0d36",
            "tx_amount": -1
        }
    ]))
    .unwrap();

    let (rows, invalids) = map_events(events);
    assert_eq!(rows.len(), 1);
    assert!(invalids.is_empty());
}
