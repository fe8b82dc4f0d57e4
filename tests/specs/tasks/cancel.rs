// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task reads and bulk cancellation against a scripted daemon.

use serde_json::json;

use quarry_client::executor::QueryOutcome;
use quarry_client::tasks::{cancel_tasks, get_tasks};
use quarry_core::{Filter, QuerySpec};

use crate::support::ScriptedDaemon;

#[tokio::test]
async fn task_read_reshapes_epoch_times() {
    let daemon = ScriptedDaemon::start(|request| {
        assert!(request.starts_with("task sql "));
        if request.contains("COUNT(*)") {
            r#"ok [{"COUNT(*)": 1}]"#.to_string()
        } else {
            r#"ok [{"task_id": 3, "agent_id": "007", "status": "done",
                    "create_time": 1700000000, "last_update_time": 1700000060}]"#
                .to_string()
        }
    });
    let spec = QuerySpec::new().filter("status", Filter::eq("done"));
    let outcome = get_tasks(daemon.config(), &spec).await.unwrap();
    let QueryOutcome::Complete(result) = outcome else {
        panic!("expected a complete result");
    };
    assert_eq!(result.total_items, 1);
    assert_eq!(result.items[0]["create_time"], json!("2023-11-14T22:13:20Z"));
    assert_eq!(result.items[0]["last_update_time"], json!("2023-11-14T22:14:20Z"));
    assert_eq!(result.items[0]["agent_id"], json!("007"));
}

#[tokio::test]
async fn bulk_cancel_reports_partial_failure() {
    let daemon = ScriptedDaemon::start(|request| {
        match request {
            "task 1 cancel" => "ok done".to_string(),
            "task 2 cancel" => "err Task in progress cannot be cancelled".to_string(),
            "task 3 cancel" => "ok done".to_string(),
            other => panic!("unexpected request: {other}"),
        }
    });
    let ids: Vec<String> = ["1", "2", "3"].map(String::from).into();
    let envelope = cancel_tasks(daemon.config(), &ids).await.render();

    assert_eq!(envelope.message, "Some tasks were not cancelled");
    assert_eq!(envelope.affected_items, vec![json!("1"), json!("3")]);
    assert_eq!(envelope.total_affected_items, 2);
    assert_eq!(envelope.total_failed_items, 1);
    assert_eq!(envelope.failed_items[0].error.code, 2004);
    assert_eq!(
        envelope.failed_items[0].error.message,
        "Task in progress cannot be cancelled"
    );
}
