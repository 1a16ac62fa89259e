// WAN rule payloads.

use fwconverge_api::types::{WanExceptionInput, WanRuleInput, WanRuleUpdateInput};

use super::Builder;
use super::criteria::{
    active_period, application, device_attributes, endpoint, group, schedule, service, tracking,
};
use crate::error::CoreError;
use crate::model::{ExceptionSet, PayloadMode, WanException, WanRule};

pub(crate) fn create(rule: &WanRule) -> Result<WanRuleInput, CoreError> {
    let mut b = Builder::new(PayloadMode::Create);
    let body = body(&mut b, rule);
    let input = WanRuleInput {
        name: body.name.unwrap_or_default(),
        description: body.description,
        enabled: rule.enabled,
        section: body.section,
        source: body.source,
        connection_origin: body.connection_origin,
        country: body.country,
        device: body.device,
        device_os: body.device_os,
        device_attributes: body.device_attributes,
        destination: body.destination,
        application: body.application,
        service: body.service,
        action: rule.action.to_string(),
        direction: rule.direction.to_string(),
        tracking: body.tracking,
        schedule: body.schedule,
        active_period: body.active_period,
        exceptions: body.exceptions,
    };
    b.finish(input)
}

pub(crate) fn update(rule: &WanRule) -> Result<WanRuleUpdateInput, CoreError> {
    let mut b = Builder::new(PayloadMode::Update);
    let body = body(&mut b, rule);
    let input = WanRuleUpdateInput {
        enabled: Some(rule.enabled),
        action: Some(rule.action.to_string()),
        direction: Some(rule.direction.to_string()),
        ..body
    };
    b.finish(input)
}

/// Everything but the required scalars, in the update shape.
fn body(b: &mut Builder, rule: &WanRule) -> WanRuleUpdateInput {
    if rule.name.trim().is_empty() {
        b.reject("INVALID_NAME", "name", "a rule needs a name");
    }
    let description = match b.mode() {
        PayloadMode::Create => rule.description.clone(),
        PayloadMode::Update => Some(rule.description.clone().unwrap_or_default()),
    };
    WanRuleUpdateInput {
        name: Some(rule.name.trim().to_owned()),
        description,
        enabled: None,
        section: rule
            .section
            .as_ref()
            .and_then(|section| b.reference(section, "section")),
        source: group(b, rule.source.as_ref(), |b, g| endpoint(b, g, "source")),
        connection_origin: rule.connection_origin.map(|o| o.to_string()),
        country: b.refs(&rule.country, "country"),
        device: b.refs(&rule.device, "device"),
        device_os: b.enums(&rule.device_os),
        device_attributes: group(b, rule.device_attributes.as_ref(), device_attributes),
        destination: group(b, rule.destination.as_ref(), |b, g| {
            endpoint(b, g, "destination")
        }),
        application: group(b, rule.application.as_ref(), |b, g| {
            application(b, g, "application")
        }),
        service: group(b, rule.service.as_ref(), |b, g| service(b, g, "service")),
        action: None,
        direction: None,
        tracking: Some(tracking(b, rule.tracking.as_ref())),
        schedule: Some(schedule(b, rule.schedule.as_ref())),
        active_period: active_period(b, rule.active_period.as_ref()),
        exceptions: exceptions(b, &rule.exceptions),
    }
}

fn exceptions(b: &mut Builder, declared: &ExceptionSet<WanException>) -> Option<Vec<WanExceptionInput>> {
    if declared.is_unset() && b.mode() == PayloadMode::Create {
        return None;
    }
    let built = b.with_mode(PayloadMode::Create, |b| {
        declared
            .items()
            .iter()
            .enumerate()
            .map(|(i, e)| exception(b, e, &format!("exceptions[{i}]")))
            .collect()
    });
    Some(built)
}

fn exception(b: &mut Builder, e: &WanException, path: &str) -> WanExceptionInput {
    let f = |name: &str| format!("{path}.{name}");
    WanExceptionInput {
        name: e.name.clone(),
        source: e.source.as_ref().map(|g| endpoint(b, g, &f("source"))),
        device_os: b.enums(&e.device_os),
        country: b.refs(&e.country, &f("country")),
        device: b.refs(&e.device, &f("device")),
        device_attributes: e.device_attributes.as_ref().map(|g| device_attributes(b, g)),
        destination: e.destination.as_ref().map(|g| endpoint(b, g, &f("destination"))),
        application: e.application.as_ref().map(|g| application(b, g, &f("application"))),
        service: e.service.as_ref().map(|g| service(b, g, &f("service"))),
        direction: e.direction.map(|d| d.to_string()),
        connection_origin: e.connection_origin.map(|o| o.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{
        CustomService, Direction, EndpointCriteria, Protocol, RangeValue, Reference, RuleAction,
        ServiceSpec, TriState,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rule() -> WanRule {
        let mut rule = WanRule::new("allow-dns", RuleAction::Allow, Direction::To);
        rule.source = Some(EndpointCriteria {
            ip: TriState::from_vec(vec!["10.0.0.1".into()]),
            ..EndpointCriteria::default()
        });
        rule
    }

    #[test]
    fn create_leaves_undeclared_groups_out() {
        let input = create(&rule()).unwrap();
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["source"], json!({ "ip": ["10.0.0.1"] }));
        assert!(json.get("destination").is_none());
        assert!(json.get("exceptions").is_none());
        assert_eq!(json["action"], "ALLOW");
        assert_eq!(json["direction"], "TO");
        assert_eq!(json["schedule"]["activeOn"], "ALWAYS");
    }

    #[test]
    fn update_clears_undeclared_collections() {
        let input = update(&rule()).unwrap();
        assert_eq!(input.country, Some(vec![]));
        assert_eq!(input.destination.unwrap().host, Some(vec![]));
        assert_eq!(input.exceptions, Some(vec![]));
        assert_eq!(input.description.as_deref(), Some(""));
        assert!(input.active_period.is_some());
    }

    #[test]
    fn exceptions_encode_for_creation_even_on_update() {
        let mut declared = rule();
        declared.exceptions = ExceptionSet::from_vec(vec![WanException {
            name: Some("skip-hq".into()),
            source: Some(EndpointCriteria {
                site: TriState::from_vec(vec![Reference::by_name("HQ")]),
                ..EndpointCriteria::default()
            }),
            ..WanException::default()
        }]);
        let input = update(&declared).unwrap();
        let json = serde_json::to_value(&input.exceptions.unwrap()[0]).unwrap();
        assert_eq!(
            json,
            json!({
                "name": "skip-hq",
                "source": { "site": [{ "by": "NAME", "input": "HQ" }] }
            })
        );
    }

    #[test]
    fn all_problems_come_back_together() {
        let mut declared = rule();
        declared.name = " ".into();
        declared.destination = Some(EndpointCriteria {
            subnet: TriState::from_vec(vec!["10.0.0.0".into()]),
            ..EndpointCriteria::default()
        });
        declared.service = Some(ServiceSpec {
            standard: TriState::Unset,
            custom: TriState::from_vec(vec![CustomService {
                port: None,
                port_range: Some(RangeValue::new("9000", "80")),
                protocol: Protocol::Tcp,
            }]),
        });
        let err = create(&declared).unwrap_err();
        let codes: Vec<_> = err.entries().into_iter().map(|e| e.code).collect();
        assert_eq!(codes, vec!["INVALID_NAME", "INVALID_SUBNET", "INVALID_PORT"]);
    }
}
