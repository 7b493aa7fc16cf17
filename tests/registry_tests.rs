//! Tests for the in-memory agent registry

mod common;

use chrono::Utc;
use serde_json::json;

use common::{agent, capability};
use evm_agent_server::registry::{
    AgentRegistry, MessageType, NewDelegation, OutgoingMessage, RegistryError, TaskDescriptor,
    TaskStatus, WorkflowStep, COORDINATOR_ID,
};

fn task(kind: &str) -> TaskDescriptor {
    TaskDescriptor {
        task_type: kind.to_string(),
        description: format!("run {}", kind),
        parameters: json!({ "asset": "USDC" }),
    }
}

fn message(from: &str, to: &str, n: u32) -> OutgoingMessage {
    OutgoingMessage {
        from: from.to_string(),
        to: to.to_string(),
        message_type: MessageType::Request,
        payload: json!({ "n": n }),
        signature: None,
    }
}

#[tokio::test]
async fn test_reregistration_replaces_entry() {
    let registry = AgentRegistry::new();
    registry
        .register_agent(agent("yield", vec![capability("c1", &["lend"], &[], &[])]))
        .await;
    registry.update_reputation("yield", 40).await.unwrap();

    let mut second = agent("yield", vec![capability("c2", &["swap"], &["uniswap"], &[])]);
    second.name = "Yield v2".to_string();
    second.endpoint = "https://v2.example".to_string();
    registry.register_agent(second.clone()).await;

    let agents = registry.list_agents().await;
    assert_eq!(agents.len(), 1);
    let stored = &agents[0];
    assert_eq!(stored.name, "Yield v2");
    assert_eq!(stored.endpoint, "https://v2.example");
    assert_eq!(stored.capabilities, second.capabilities);
    assert_eq!(stored.reputation, 100);
}

#[tokio::test]
async fn test_discovery_matches_any_tag_set() {
    let registry = AgentRegistry::new();
    registry
        .register_agent(agent("by-op", vec![capability("a", &["swap"], &[], &[])]))
        .await;
    registry
        .register_agent(agent("by-protocol", vec![capability("b", &[], &["swap"], &[])]))
        .await;
    registry
        .register_agent(agent(
            "by-chain",
            vec![
                capability("c", &["lend"], &[], &[]),
                capability("d", &[], &[], &["swap"]),
            ],
        ))
        .await;
    registry
        .register_agent(agent("other", vec![capability("e", &["bridge"], &["aave"], &["base"])]))
        .await;

    let ids: Vec<String> = registry
        .discover_agents("swap")
        .await
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec!["by-op", "by-protocol", "by-chain"]);
    assert!(registry.discover_agents("unknown-tag").await.is_empty());
}

#[tokio::test]
async fn test_discovery_orders_by_reputation() {
    let registry = AgentRegistry::new();
    for id in ["first", "second", "third"] {
        registry
            .register_agent(agent(id, vec![capability(id, &["lend"], &["aave"], &["ethereum"])]))
            .await;
    }
    registry.update_reputation("third", 50).await.unwrap();

    let ids: Vec<String> = registry
        .discover_agents("aave")
        .await
        .into_iter()
        .map(|a| a.id)
        .collect();
    // 150 first, then the two 100s in registration order
    assert_eq!(ids, vec!["third", "first", "second"]);
}

#[tokio::test]
async fn test_mailbox_is_fifo_and_drained() {
    let registry = AgentRegistry::new();
    let before = Utc::now();
    for n in 0..3 {
        registry.send_message(message("alice", "bob", n)).await;
    }
    registry.send_message(message("bob", "alice", 99)).await;

    let inbox = registry.receive_messages("bob").await;
    assert_eq!(inbox.len(), 3);
    for (n, msg) in inbox.iter().enumerate() {
        assert_eq!(msg.payload, json!({ "n": n }));
        assert_eq!(msg.from, "alice");
        assert!(msg.timestamp >= before);
    }
    assert!(registry.receive_messages("bob").await.is_empty());
    assert_eq!(registry.receive_messages("alice").await.len(), 1);
    assert!(registry.receive_messages("nobody").await.is_empty());
}

#[tokio::test]
async fn test_receiving_refreshes_last_seen() {
    let registry = AgentRegistry::new();
    let registered = registry.register_agent(agent("bob", vec![])).await;
    registry.receive_messages("bob").await;
    let seen = registry.get_agent("bob").await.unwrap();
    assert!(seen.last_seen >= registered.last_seen);
    assert_eq!(seen.registered_at, registered.registered_at);
}

#[tokio::test]
async fn test_reputation_is_clamped() {
    let registry = AgentRegistry::new();
    registry.register_agent(agent("a", vec![])).await;

    assert_eq!(registry.update_reputation("a", 500).await.unwrap().reputation, 200);
    assert_eq!(registry.update_reputation("a", -500).await.unwrap().reputation, 0);
    assert_eq!(registry.update_reputation("a", 7).await.unwrap().reputation, 7);
    assert_eq!(
        registry.update_reputation("a", i32::MIN).await.unwrap().reputation,
        0
    );

    let err = registry.update_reputation("ghost", 1).await.unwrap_err();
    assert_eq!(err, RegistryError::AgentNotFound("ghost".to_string()));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delegation_lifecycle() {
    let registry = AgentRegistry::new();
    let delegation = registry
        .delegate_task(NewDelegation {
            from: "planner".to_string(),
            to: "executor".to_string(),
            task: task("supply"),
        })
        .await;
    assert_eq!(delegation.status, TaskStatus::Pending);

    let fetched = registry.get_delegation(&delegation.task_id).await.unwrap();
    assert_eq!(fetched.status, TaskStatus::Pending);

    let inbox = registry.receive_messages("executor").await;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].message_type, MessageType::Delegation);
    assert_eq!(inbox[0].payload["taskId"], json!(delegation.task_id));

    let updated = registry
        .update_delegation(
            &delegation.task_id,
            TaskStatus::Completed,
            Some(json!({ "txHash": "0xabc" })),
            None,
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);

    let fetched = registry.get_delegation(&delegation.task_id).await.unwrap();
    assert_eq!(fetched.status, TaskStatus::Completed);
    assert_eq!(fetched.result, Some(json!({ "txHash": "0xabc" })));

    let replies = registry.receive_messages("planner").await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].message_type, MessageType::Response);
    assert_eq!(replies[0].from, "executor");
    assert_eq!(replies[0].payload["taskId"], json!(delegation.task_id));
    assert_eq!(replies[0].payload["status"], json!("completed"));
}

#[tokio::test]
async fn test_update_delegation_keeps_unsupplied_fields() {
    let registry = AgentRegistry::new();
    let d = registry
        .delegate_task(NewDelegation {
            from: "a".to_string(),
            to: "b".to_string(),
            task: task("quote"),
        })
        .await;

    registry
        .update_delegation(&d.task_id, TaskStatus::Completed, Some(json!(42)), None)
        .await
        .unwrap();
    // any status may follow any other
    let back = registry
        .update_delegation(&d.task_id, TaskStatus::InProgress, None, Some("retrying".into()))
        .await
        .unwrap();
    assert_eq!(back.status, TaskStatus::InProgress);
    assert_eq!(back.result, Some(json!(42)));
    assert_eq!(back.error.as_deref(), Some("retrying"));

    let missing = registry
        .update_delegation("no-such-task", TaskStatus::Failed, None, None)
        .await
        .unwrap_err();
    assert!(missing.is_not_found());
    assert!(registry.get_delegation("no-such-task").await.is_err());
}

#[tokio::test]
async fn test_workflow_picks_best_agent_per_step() {
    let registry = AgentRegistry::new();
    registry
        .register_agent(agent("quoter", vec![capability("q", &["quote"], &[], &[])]))
        .await;
    registry
        .register_agent(agent("swapper-a", vec![capability("s", &["swap"], &[], &[])]))
        .await;
    registry
        .register_agent(agent("swapper-b", vec![capability("s", &["swap"], &[], &[])]))
        .await;
    registry.update_reputation("swapper-b", 10).await.unwrap();

    let results = registry
        .compose_workflow(
            "rebalance",
            vec![
                WorkflowStep { capability: "quote".into(), task: task("quote") },
                WorkflowStep { capability: "swap".into(), task: task("swap") },
            ],
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].agent_id, "quoter");
    assert_eq!(results[1].agent_id, "swapper-b");
    for (i, step) in results.iter().enumerate() {
        assert_eq!(step.step, i);
        assert_eq!(step.delegation.from, COORDINATOR_ID);
        // returned immediately, not awaited
        assert_eq!(step.delegation.status, TaskStatus::Pending);
    }
    assert_eq!(registry.receive_messages("swapper-b").await.len(), 1);
    assert!(registry.receive_messages("swapper-a").await.is_empty());
}

#[tokio::test]
async fn test_workflow_aborts_on_missing_capability() {
    let registry = AgentRegistry::new();
    registry
        .register_agent(agent("quoter", vec![capability("q", &["quote"], &[], &[])]))
        .await;
    registry
        .register_agent(agent("swapper", vec![capability("s", &["swap"], &[], &[])]))
        .await;

    let err = registry
        .compose_workflow(
            "broken",
            vec![
                WorkflowStep { capability: "quote".into(), task: task("quote") },
                WorkflowStep { capability: "bridge".into(), task: task("bridge") },
                WorkflowStep { capability: "swap".into(), task: task("swap") },
            ],
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RegistryError::NoCapableAgent {
            workflow: "broken".to_string(),
            step: 1,
            capability: "bridge".to_string(),
        }
    );
    // the step after the failure was never attempted
    assert!(registry.receive_messages("swapper").await.is_empty());
}
