// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MITRE catalogue reads: relation fan-out, relation filters, and the
//! metadata envelope.

use serde_json::json;

use quarry_client::executor::QueryOutcome;
use quarry_client::mitre::{get_techniques, read_metadata};
use quarry_core::{Filter, QuerySpec};

use crate::support::ScriptedDaemon;

fn catalogue_daemon() -> ScriptedDaemon {
    ScriptedDaemon::start(|request| {
        if request.contains("COUNT(*)") {
            r#"ok [{"COUNT(*)": 2}]"#.to_string()
        } else if request.starts_with("technique_tactic sql ") {
            r#"ok [{"id": "T1001", "tactic_id": "TA0011", "name": "Command and Control"}]"#
                .to_string()
        } else if request.starts_with("technique sql ") {
            r#"ok [{"id": "T1001", "name": "Data Obfuscation"},
                   {"id": "T1003", "name": "OS Credential Dumping"}]"#
                .to_string()
        } else if request.starts_with("metadata sql ") {
            r#"ok [{"key": "db_version", "value": "1.0"}, {"key": "revision", "value": "2"}]"#
                .to_string()
        } else {
            "err unknown entity".to_string()
        }
    })
}

#[tokio::test]
async fn techniques_carry_their_tactic_lists() {
    let daemon = catalogue_daemon();
    let spec = QuerySpec::new().select(["id", "name", "tactics"]);
    let outcome = get_techniques(daemon.config(), &spec).await.unwrap();
    let QueryOutcome::Complete(result) = outcome else {
        panic!("expected a complete result");
    };
    assert_eq!(result.total_items, 2);
    assert_eq!(
        result.items[0]["tactics"],
        json!([{"id": "T1001", "tactic_id": "TA0011", "name": "Command and Control"}])
    );
    assert_eq!(result.items[1]["tactics"], json!([]));
}

#[tokio::test]
async fn relation_filter_narrows_the_result_page() {
    let daemon = catalogue_daemon();
    let spec = QuerySpec::new()
        .select(["id", "tactics"])
        .filter("tactics", Filter::eq("TA0011"));
    let outcome = get_techniques(daemon.config(), &spec).await.unwrap();
    let QueryOutcome::Complete(result) = outcome else {
        panic!("expected a complete result");
    };
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0]["id"], json!("T1001"));
}

#[tokio::test]
async fn metadata_envelope_reports_every_row() {
    let daemon = catalogue_daemon();
    let envelope = read_metadata(daemon.config(), &QuerySpec::new()).await.render();
    assert_eq!(envelope.message, "MITRE metadata was successfully read");
    assert_eq!(envelope.total_affected_items, 2);
    assert_eq!(envelope.affected_items[1]["value"], json!("2"));
    assert!(envelope.failed_items.is_empty());
}
