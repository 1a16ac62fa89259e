#![allow(clippy::unwrap_used)]

mod common;

use common::FakePolicy;
use fwconverge_core::model::{
    ConnectionOrigin, Direction, EndpointCriteria, InternetDestination, ServiceSpec,
};
use fwconverge_core::{
    Controller, CoreError, DeleteOutcome, EngineConfig, ExceptionSet, InternetException,
    InternetFirewall, InternetRule, Plan, Position, PositionAnchor, ReadOutcome, Reference,
    RuleAction, RuleState, TriState, WanException, WanFirewall, WanRule,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn controller() -> Controller<FakePolicy> {
    Controller::new(FakePolicy::new(), EngineConfig::default())
}

fn rule_with_source_ip(ip: &str) -> WanRule {
    let mut rule = WanRule::new("allow-office", RuleAction::Allow, Direction::To);
    rule.source = Some(EndpointCriteria {
        ip: TriState::from_vec(vec![ip.to_owned()]),
        ..EndpointCriteria::default()
    });
    rule
}

fn named_exception(name: &str, ip: &str) -> WanException {
    WanException {
        name: Some(name.to_owned()),
        source: Some(EndpointCriteria {
            ip: TriState::from_vec(vec![ip.to_owned()]),
            ..EndpointCriteria::default()
        }),
        ..WanException::default()
    }
}

// ── Create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_publishes_and_reads_back_without_drift() {
    let ctrl = controller();
    let declared = rule_with_source_ip("10.0.0.1");

    let observed = ctrl.create::<WanFirewall>(&declared).await.unwrap();

    assert_eq!(
        ctrl.api().calls(),
        vec!["addRule", "publishPolicyRevision", "policy"]
    );
    assert_eq!(
        observed.history,
        vec![
            RuleState::Planned,
            RuleState::Created,
            RuleState::Published,
            RuleState::Observed
        ]
    );
    let source = observed.rule.source.as_ref().unwrap();
    assert_eq!(source.ip, TriState::from_vec(vec!["10.0.0.1".to_owned()]));
    assert!(observed.rule.destination.is_none());
    assert_eq!(ctrl.api().revisions::<WanFirewall>(), 1);

    let outcome = ctrl
        .plan::<WanFirewall>(Some(&observed.id), &declared)
        .await
        .unwrap();
    assert_eq!(outcome.plan, Plan::NoOp);
}

#[tokio::test]
async fn create_leaves_undeclared_groups_out_of_the_payload() {
    let ctrl = controller();
    ctrl.create::<WanFirewall>(&rule_with_source_ip("10.0.0.1"))
        .await
        .unwrap();

    let input = ctrl.api().last_input("addRule").unwrap();
    assert_eq!(input["rule"]["source"]["ip"], json!(["10.0.0.1"]));
    assert!(input["rule"].get("destination").is_none());
    assert!(input["rule"].get("exceptions").is_none());
    assert_eq!(input["at"]["position"], "LAST_IN_POLICY");
}

#[tokio::test]
async fn exception_site_reference_survives_read_back() {
    let ctrl = controller();
    let mut declared = WanRule::new("block-guest", RuleAction::Block, Direction::Both);
    declared.exceptions = ExceptionSet::from_vec(vec![WanException {
        name: Some("hq".into()),
        source: Some(EndpointCriteria {
            site: TriState::from_vec(vec![Reference::by_name("HQ")]),
            ..EndpointCriteria::default()
        }),
        ..WanException::default()
    }]);

    let observed = ctrl.create::<WanFirewall>(&declared).await.unwrap();

    let remote = ctrl.api().rule::<WanFirewall>(&observed.id).unwrap();
    assert_eq!(
        remote["exceptions"][0]["source"]["site"],
        json!([{ "id": "id-HQ", "name": "HQ" }])
    );
    let exception = &observed.rule.exceptions.items()[0];
    let source = exception.source.as_ref().unwrap();
    assert_eq!(source.site, TriState::from_vec(vec![Reference::by_name("HQ")]));
    assert!(source.ip.is_unset());
    assert!(exception.destination.as_ref().is_none_or(|d| d.is_blank()));

    let outcome = ctrl
        .plan::<WanFirewall>(Some(&observed.id), &declared)
        .await
        .unwrap();
    assert_eq!(outcome.plan, Plan::NoOp);
}

#[tokio::test]
async fn create_moves_when_anchor_differs_from_creation_default() {
    let ctrl = controller();
    let first = ctrl.api().seed::<WanFirewall>(json!({
        "name": "existing", "enabled": true, "action": "ALLOW", "direction": "TO"
    }));
    let mut declared = rule_with_source_ip("10.0.0.2");
    declared.position = Some(PositionAnchor::new(Position::FirstInPolicy, None));

    let observed = ctrl.create::<WanFirewall>(&declared).await.unwrap();

    assert_eq!(
        ctrl.api().calls(),
        vec!["addRule", "moveRule", "publishPolicyRevision", "policy"]
    );
    assert_eq!(ctrl.api().order::<WanFirewall>(), vec![observed.id.clone(), first]);
    assert_eq!(observed.index, 1);
    assert!(observed.history.contains(&RuleState::Moved));
}

#[tokio::test]
async fn name_anchor_resolves_against_live_order() {
    let ctrl = controller();
    let a = ctrl.api().seed::<WanFirewall>(json!({
        "name": "a", "enabled": true, "action": "ALLOW", "direction": "TO"
    }));
    let b = ctrl.api().seed::<WanFirewall>(json!({
        "name": "b", "enabled": true, "action": "ALLOW", "direction": "TO"
    }));
    let mut declared = rule_with_source_ip("10.0.0.3");
    declared.position = Some(PositionAnchor::new(
        Position::AfterRule,
        Some(Reference::by_name("a")),
    ));

    let observed = ctrl.create::<WanFirewall>(&declared).await.unwrap();

    assert_eq!(ctrl.api().order::<WanFirewall>(), vec![a.clone(), observed.id.clone(), b]);
    let moved = ctrl.api().last_input("moveRule").unwrap();
    assert_eq!(moved["to"], json!({ "position": "AFTER_RULE", "ref": a }));
}

// ── Validation and failures ─────────────────────────────────────────

#[tokio::test]
async fn invalid_rule_is_rejected_before_any_remote_call() {
    let ctrl = controller();
    let mut declared = rule_with_source_ip("not-an-ip");
    declared.destination = Some(EndpointCriteria {
        subnet: TriState::from_vec(vec!["10.0.0.0/40".into()]),
        ..EndpointCriteria::default()
    });

    let failure = ctrl.create::<WanFirewall>(&declared).await.unwrap_err();

    assert!(ctrl.api().calls().is_empty());
    assert!(failure.error.is_validation());
    assert_eq!(failure.entries().len(), 2);
    assert_eq!(failure.rule_id, None);
    assert_eq!(failure.reached, RuleState::Planned);
}

#[tokio::test]
async fn every_remote_error_entry_is_reported() {
    let ctrl = controller();
    ctrl.api().fail_next(
        "addRule",
        &[("UNKNOWN_SITE", "site HQ not found"), ("BAD_PORT", "port 0")],
    );

    let failure = ctrl
        .create::<WanFirewall>(&rule_with_source_ip("10.0.0.1"))
        .await
        .unwrap_err();

    let codes: Vec<String> = failure.entries().into_iter().map(|e| e.code).collect();
    assert_eq!(codes, vec!["UNKNOWN_SITE", "BAD_PORT"]);
    assert!(matches!(failure.error, CoreError::RemoteSemantic { .. }));
    assert_eq!(failure.history.last(), Some(&RuleState::Failed));
}

#[tokio::test]
async fn failed_publish_leaves_the_rule_uncommitted() {
    let ctrl = controller();
    ctrl.api()
        .fail_next("publishPolicyRevision", &[("LOCKED", "revision locked")]);

    let failure = ctrl
        .create::<WanFirewall>(&rule_with_source_ip("10.0.0.1"))
        .await
        .unwrap_err();

    assert_eq!(failure.reached, RuleState::Created);
    assert!(failure.rule_id.is_some());
    assert!(failure.left_uncommitted());
    assert!(ctrl.api().has_pending::<WanFirewall>());
}

#[tokio::test]
async fn cancelled_run_sends_nothing() {
    let ctrl = controller();
    ctrl.cancellation_token().cancel();

    let failure = ctrl
        .create::<WanFirewall>(&rule_with_source_ip("10.0.0.1"))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, CoreError::Cancelled { .. }));
    assert!(ctrl.api().calls().is_empty());
}

// ── Update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn update_sends_explicit_empty_for_undeclared_custom_services() {
    let ctrl = controller();
    let id = ctrl.api().seed::<WanFirewall>(json!({
        "name": "svc", "enabled": true, "action": "ALLOW", "direction": "TO",
        "service": {
            "standard": [{ "id": "id-HTTP", "name": "HTTP" }],
            "custom": [{ "port": ["22"], "protocol": "TCP" }]
        }
    }));
    let mut declared = WanRule::new("svc", RuleAction::Allow, Direction::To);
    declared.service = Some(ServiceSpec {
        standard: TriState::from_vec(vec![Reference::by_name("HTTP")]),
        ..ServiceSpec::default()
    });

    let observed = ctrl.update::<WanFirewall>(&id, &declared).await.unwrap();

    let input = ctrl.api().last_input("updateRule").unwrap();
    assert_eq!(input["rule"]["service"]["custom"], json!([]));
    assert_eq!(input["rule"]["destination"]["ip"], json!([]));
    let service = observed.rule.service.unwrap();
    assert_eq!(service.custom, TriState::Empty);
    assert_eq!(
        ctrl.api().calls(),
        vec!["policy", "updateRule", "publishPolicyRevision", "policy"]
    );
}

#[tokio::test]
async fn exception_order_does_not_cause_drift() {
    let ctrl = controller();
    let id = ctrl.api().seed::<WanFirewall>(json!({
        "name": "ordered", "enabled": true, "action": "BLOCK", "direction": "TO",
        "exceptions": [
            { "name": "b", "source": { "ip": ["10.0.0.2"] } },
            { "name": "a", "source": { "ip": ["10.0.0.1"] } }
        ]
    }));
    let mut declared = WanRule::new("ordered", RuleAction::Block, Direction::To);
    declared.exceptions = ExceptionSet::from_vec(vec![
        named_exception("a", "10.0.0.1"),
        named_exception("b", "10.0.0.2"),
    ]);

    let outcome = ctrl.plan::<WanFirewall>(Some(&id), &declared).await.unwrap();

    assert_eq!(outcome.plan, Plan::NoOp);
    let observed = outcome.observed.unwrap();
    let names: Vec<_> = observed
        .rule
        .exceptions
        .items()
        .iter()
        .map(|e| e.name.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[tokio::test]
async fn remote_drift_is_planned_then_converged() {
    let ctrl = controller();
    let id = ctrl.api().seed::<WanFirewall>(json!({
        "name": "allow-office", "enabled": true, "action": "ALLOW", "direction": "TO",
        "source": { "ip": ["10.9.9.9"] }
    }));
    let declared = rule_with_source_ip("10.0.0.1");

    let outcome = ctrl.plan::<WanFirewall>(Some(&id), &declared).await.unwrap();
    let Plan::Update { drift } = &outcome.plan else {
        panic!("expected an update, got {:?}", outcome.plan);
    };
    assert_eq!(drift[0].path, "source.ip");

    let observed = ctrl.converge::<WanFirewall>(Some(&id), &declared).await.unwrap();
    assert_eq!(observed.id, id);
    let after = ctrl.plan::<WanFirewall>(Some(&id), &declared).await.unwrap();
    assert_eq!(after.plan, Plan::NoOp);
}

#[tokio::test]
async fn update_plan_lists_undeclared_values_it_resets() {
    let ctrl = controller();
    let id = ctrl.api().seed::<WanFirewall>(json!({
        "name": "allow-office", "enabled": false, "action": "ALLOW", "direction": "TO",
        "source": { "ip": ["10.0.0.1"] },
        "destination": { "ip": ["10.9.9.9"] },
        "tracking": { "event": { "enabled": true } }
    }));
    let declared = rule_with_source_ip("10.0.0.1");

    let outcome = ctrl.plan::<WanFirewall>(Some(&id), &declared).await.unwrap();
    let paths: Vec<_> = outcome.plan.drift().iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["enabled", "destination.ip", "tracking.event.enabled"]);

    ctrl.converge::<WanFirewall>(Some(&id), &declared).await.unwrap();

    let remote = ctrl.api().rule::<WanFirewall>(&id).unwrap();
    assert_eq!(remote["destination"]["ip"], json!([]));
    assert_eq!(remote["tracking"]["event"]["enabled"], json!(false));
    let after = ctrl.plan::<WanFirewall>(Some(&id), &declared).await.unwrap();
    assert_eq!(after.plan, Plan::NoOp);
}

#[tokio::test]
async fn undeclared_remote_values_alone_are_not_drift() {
    let ctrl = controller();
    let id = ctrl.api().seed::<WanFirewall>(json!({
        "name": "allow-office", "enabled": true, "action": "ALLOW", "direction": "TO",
        "source": { "ip": ["10.0.0.1"] },
        "destination": { "ip": ["10.9.9.9"] }
    }));

    let outcome = ctrl
        .plan::<WanFirewall>(Some(&id), &rule_with_source_ip("10.0.0.1"))
        .await
        .unwrap();

    assert_eq!(outcome.plan, Plan::NoOp);
}

#[tokio::test]
async fn rule_already_in_place_is_not_moved() {
    let ctrl = controller();
    let id = ctrl.api().seed::<WanFirewall>(json!({
        "name": "top", "enabled": true, "action": "ALLOW", "direction": "TO"
    }));
    ctrl.api().seed::<WanFirewall>(json!({
        "name": "other", "enabled": true, "action": "ALLOW", "direction": "TO"
    }));
    let mut declared = WanRule::new("top", RuleAction::Allow, Direction::To);
    declared.position = Some(PositionAnchor::new(Position::FirstInPolicy, None));

    ctrl.update::<WanFirewall>(&id, &declared).await.unwrap();

    assert!(!ctrl.api().calls().contains(&"moveRule".to_owned()));
}

#[tokio::test]
async fn disabled_publish_keeps_changes_pending() {
    let mut config = EngineConfig::default();
    config.publish.enabled = false;
    let ctrl = Controller::new(FakePolicy::new(), config);

    let observed = ctrl
        .create::<WanFirewall>(&rule_with_source_ip("10.0.0.1"))
        .await
        .unwrap();

    assert!(!observed.history.contains(&RuleState::Published));
    assert!(ctrl.api().has_pending::<WanFirewall>());
    assert_eq!(ctrl.api().revisions::<WanFirewall>(), 0);
}

// ── Read and delete ─────────────────────────────────────────────────

#[tokio::test]
async fn null_fields_from_the_remote_read_as_empty() {
    let ctrl = controller();
    let id = ctrl.api().seed::<WanFirewall>(json!({
        "name": "allow-office", "description": null, "enabled": true,
        "action": "ALLOW", "direction": "TO",
        "source": null, "country": null, "exceptions": null,
        "destination": { "ip": ["10.0.0.9"], "host": null }
    }));

    let ReadOutcome::Found(observed) = ctrl.read::<WanFirewall>(&id, None).await.unwrap() else {
        panic!("seeded rule not found");
    };

    assert!(observed.rule.description.is_none());
    assert!(observed.rule.source.is_none());
    assert!(observed.rule.country.is_empty());
    assert!(observed.rule.exceptions.items().is_empty());
    let destination = observed.rule.destination.unwrap();
    assert_eq!(destination.ip, TriState::from_vec(vec!["10.0.0.9".to_owned()]));
    assert!(observed.warnings.is_empty());
}

#[tokio::test]
async fn externally_deleted_rule_reads_as_absent_and_is_recreated() {
    let ctrl = controller();
    let declared = rule_with_source_ip("10.0.0.1");
    let created = ctrl.create::<WanFirewall>(&declared).await.unwrap();
    ctrl.api().drop_rule::<WanFirewall>(&created.id);

    let read = ctrl
        .read::<WanFirewall>(&created.id, Some(&declared))
        .await
        .unwrap();
    assert!(matches!(read, ReadOutcome::DeletedExternally));

    let recreated = ctrl
        .converge::<WanFirewall>(Some(&created.id), &declared)
        .await
        .unwrap();
    assert_ne!(recreated.id, created.id);
}

#[tokio::test]
async fn delete_of_absent_rule_is_a_no_op() {
    let ctrl = controller();

    let outcome = ctrl.delete::<WanFirewall>("rule-404").await.unwrap();

    assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);
    assert_eq!(ctrl.api().calls(), vec!["policy"]);
}

#[tokio::test]
async fn delete_removes_and_publishes() {
    let ctrl = controller();
    let id = ctrl.api().seed::<WanFirewall>(json!({
        "name": "gone", "enabled": true, "action": "BLOCK", "direction": "TO"
    }));

    let outcome = ctrl.delete::<WanFirewall>(&id).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Removed { published: true });
    assert!(ctrl.api().rule::<WanFirewall>(&id).is_none());
    assert_eq!(
        ctrl.api().calls(),
        vec!["policy", "removeRule", "publishPolicyRevision"]
    );
}

// ── Internet family ─────────────────────────────────────────────────

fn geo_block() -> InternetRule {
    let mut rule = InternetRule::new("block-geo", RuleAction::Block);
    rule.connection_origin = Some(ConnectionOrigin::Remote);
    rule.destination = Some(InternetDestination {
        country: TriState::from_vec(vec![Reference::by_name("France")]),
        remote_asn: TriState::from_vec(vec!["64512".to_owned()]),
        ..InternetDestination::default()
    });
    rule
}

#[tokio::test]
async fn internet_create_reads_back_without_drift() {
    let ctrl = controller();
    let declared = geo_block();

    let observed = ctrl.create::<InternetFirewall>(&declared).await.unwrap();

    let input = ctrl.api().last_input("addRule").unwrap();
    assert_eq!(
        input["rule"]["destination"],
        json!({
            "country": [{ "by": "NAME", "input": "France" }],
            "remoteAsn": ["64512"]
        })
    );
    assert_eq!(input["rule"]["connectionOrigin"], "REMOTE");
    let destination = observed.rule.destination.as_ref().unwrap();
    assert_eq!(destination.country, TriState::from_vec(vec![Reference::by_name("France")]));
    assert_eq!(observed.rule.connection_origin, Some(ConnectionOrigin::Remote));

    let outcome = ctrl
        .plan::<InternetFirewall>(Some(&observed.id), &declared)
        .await
        .unwrap();
    assert_eq!(outcome.plan, Plan::NoOp);
    assert!(ctrl.api().rule::<WanFirewall>(&observed.id).is_none());
}

#[tokio::test]
async fn internet_update_converges_destination_and_exceptions() {
    let ctrl = controller();
    let id = ctrl.api().seed::<InternetFirewall>(json!({
        "name": "block-geo", "enabled": true, "action": "BLOCK",
        "connectionOrigin": "REMOTE",
        "destination": { "country": [{ "id": "id-France", "name": "France" }], "remoteAsn": ["64999"] },
        "exceptions": [
            { "name": "lab", "destination": { "remoteAsn": ["65000"] } },
            { "name": "hq", "source": { "site": [{ "id": "1", "name": "HQ" }] } }
        ]
    }));
    let mut declared = geo_block();
    declared.exceptions = ExceptionSet::from_vec(vec![
        InternetException {
            name: Some("hq".into()),
            source: Some(EndpointCriteria {
                site: TriState::from_vec(vec![Reference::by_name("HQ")]),
                ..EndpointCriteria::default()
            }),
            ..InternetException::default()
        },
        InternetException {
            name: Some("lab".into()),
            destination: Some(InternetDestination {
                remote_asn: TriState::from_vec(vec!["65000".to_owned()]),
                ..InternetDestination::default()
            }),
            ..InternetException::default()
        },
    ]);

    let outcome = ctrl.plan::<InternetFirewall>(Some(&id), &declared).await.unwrap();
    let paths: Vec<_> = outcome.plan.drift().iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["destination.remote_asn"]);

    let observed = ctrl.converge::<InternetFirewall>(Some(&id), &declared).await.unwrap();

    let input = ctrl.api().last_input("updateRule").unwrap();
    assert_eq!(input["rule"]["destination"]["remoteAsn"], json!(["64512"]));
    assert_eq!(input["rule"]["destination"]["domain"], json!([]));
    assert_eq!(input["rule"]["exceptions"].as_array().unwrap().len(), 2);
    assert_eq!(observed.id, id);
    let after = ctrl.plan::<InternetFirewall>(Some(&id), &declared).await.unwrap();
    assert_eq!(after.plan, Plan::NoOp);
}
