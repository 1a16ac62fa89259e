// Internet rule payloads.

use fwconverge_api::types::{InternetExceptionInput, InternetRuleInput, InternetRuleUpdateInput};

use super::Builder;
use super::criteria::{
    active_period, device_attributes, endpoint, group, internet_destination, schedule, service,
    tracking,
};
use crate::error::CoreError;
use crate::model::{ExceptionSet, InternetException, InternetRule, PayloadMode};

pub(crate) fn create(rule: &InternetRule) -> Result<InternetRuleInput, CoreError> {
    let mut b = Builder::new(PayloadMode::Create);
    let body = body(&mut b, rule);
    let input = InternetRuleInput {
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
        service: body.service,
        action: rule.action.to_string(),
        tracking: body.tracking,
        schedule: body.schedule,
        active_period: body.active_period,
        exceptions: body.exceptions,
    };
    b.finish(input)
}

pub(crate) fn update(rule: &InternetRule) -> Result<InternetRuleUpdateInput, CoreError> {
    let mut b = Builder::new(PayloadMode::Update);
    let body = body(&mut b, rule);
    let input = InternetRuleUpdateInput {
        enabled: Some(rule.enabled),
        action: Some(rule.action.to_string()),
        ..body
    };
    b.finish(input)
}

fn body(b: &mut Builder, rule: &InternetRule) -> InternetRuleUpdateInput {
    if rule.name.trim().is_empty() {
        b.reject("INVALID_NAME", "name", "a rule needs a name");
    }
    let description = match b.mode() {
        PayloadMode::Create => rule.description.clone(),
        PayloadMode::Update => Some(rule.description.clone().unwrap_or_default()),
    };
    InternetRuleUpdateInput {
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
            internet_destination(b, g, "destination")
        }),
        service: group(b, rule.service.as_ref(), |b, g| service(b, g, "service")),
        action: None,
        tracking: Some(tracking(b, rule.tracking.as_ref())),
        schedule: Some(schedule(b, rule.schedule.as_ref())),
        active_period: active_period(b, rule.active_period.as_ref()),
        exceptions: exceptions(b, &rule.exceptions),
    }
}

fn exceptions(
    b: &mut Builder,
    declared: &ExceptionSet<InternetException>,
) -> Option<Vec<InternetExceptionInput>> {
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

fn exception(b: &mut Builder, e: &InternetException, path: &str) -> InternetExceptionInput {
    let f = |name: &str| format!("{path}.{name}");
    InternetExceptionInput {
        name: e.name.clone(),
        source: e.source.as_ref().map(|g| endpoint(b, g, &f("source"))),
        device_os: b.enums(&e.device_os),
        country: b.refs(&e.country, &f("country")),
        device: b.refs(&e.device, &f("device")),
        device_attributes: e.device_attributes.as_ref().map(|g| device_attributes(b, g)),
        destination: e
            .destination
            .as_ref()
            .map(|g| internet_destination(b, g, &f("destination"))),
        service: e.service.as_ref().map(|g| service(b, g, &f("service"))),
        connection_origin: e.connection_origin.map(|o| o.to_string()),
    }
}
