// Internet firewall rule hydration.

use fwconverge_api::types::{InternetExceptionResponse, InternetRuleResponse};

use super::Hydrator;
use super::criteria::{
    active_period, device_attributes, endpoint, group, internet_destination, schedule, service,
    tracking,
};
use crate::exceptions;
use crate::model::{FieldPolicy, InternetException, InternetRule, RuleAction};

pub(crate) fn rule(
    h: &mut Hydrator<'_>,
    remote: &InternetRuleResponse,
    prior: Option<&InternetRule>,
) -> InternetRule {
    let dense = FieldPolicy::Dense;
    InternetRule {
        name: remote.name.clone(),
        description: description(&remote.description, prior.map(|p| &p.description)),
        enabled: remote.enabled,
        section: h.reference(
            remote.section.as_ref(),
            prior.and_then(|p| p.section.as_ref()),
            "section",
        ),
        position: prior.and_then(|p| p.position.clone()),
        source: group(remote.source.is_blank(), prior.map(|p| &p.source), dense, |d| {
            endpoint(h, &remote.source, d, dense, "source")
        }),
        connection_origin: h.enum_value(&remote.connection_origin, "connection_origin"),
        country: h.refs(&remote.country, prior.map(|p| &p.country), dense, "country"),
        device: h.refs(&remote.device, prior.map(|p| &p.device), dense, "device"),
        device_os: h.enums(&remote.device_os, prior.map(|p| &p.device_os), dense, "device_os"),
        device_attributes: group(
            remote.device_attributes.is_blank(),
            prior.map(|p| &p.device_attributes),
            dense,
            |d| device_attributes(&remote.device_attributes, d, dense),
        ),
        destination: group(
            remote.destination.is_blank(),
            prior.map(|p| &p.destination),
            dense,
            |d| internet_destination(h, &remote.destination, d, dense, "destination"),
        ),
        service: group(remote.service.is_blank(), prior.map(|p| &p.service), dense, |d| {
            service(h, &remote.service, d, dense, "service")
        }),
        action: h.required_enum(
            &remote.action,
            prior.map(|p| p.action),
            RuleAction::Block,
            "action",
        ),
        tracking: tracking(h, &remote.tracking, prior.map(|p| &p.tracking)),
        schedule: schedule(h, &remote.schedule, prior.map(|p| &p.schedule)),
        active_period: active_period(h, &remote.active_period, prior.map(|p| &p.active_period)),
        exceptions: exceptions::reconcile(
            h,
            prior.map(|p| &p.exceptions),
            &remote.exceptions,
            exception,
        ),
    }
}

pub(crate) fn exception(
    h: &mut Hydrator<'_>,
    remote: &InternetExceptionResponse,
    prior: Option<&InternetException>,
) -> InternetException {
    // Sparse, like WAN exceptions: a sub-field the remote leaves empty
    // hydrates to `Unset` unless declared `Empty`.
    let sparse = FieldPolicy::Sparse;
    InternetException {
        name: remote.name.clone().filter(|n| !n.is_empty()),
        source: Some(endpoint(
            h,
            &remote.source,
            prior.and_then(|p| p.source.as_ref()),
            sparse,
            "exceptions.source",
        )),
        device_os: h.enums(
            &remote.device_os,
            prior.map(|p| &p.device_os),
            sparse,
            "exceptions.device_os",
        ),
        country: h.refs(
            &remote.country,
            prior.map(|p| &p.country),
            sparse,
            "exceptions.country",
        ),
        device: h.refs(
            &remote.device,
            prior.map(|p| &p.device),
            sparse,
            "exceptions.device",
        ),
        device_attributes: Some(device_attributes(
            &remote.device_attributes,
            prior.and_then(|p| p.device_attributes.as_ref()),
            sparse,
        )),
        destination: Some(internet_destination(
            h,
            &remote.destination,
            prior.and_then(|p| p.destination.as_ref()),
            sparse,
            "exceptions.destination",
        )),
        service: Some(service(
            h,
            &remote.service,
            prior.and_then(|p| p.service.as_ref()),
            sparse,
            "exceptions.service",
        )),
        connection_origin: h.enum_value(&remote.connection_origin, "exceptions.connection_origin"),
    }
}

/// An empty remote description reads as "not declared" unless the
/// operator declared it empty.
pub(crate) fn description(remote: &str, prior: Option<&Option<String>>) -> Option<String> {
    if remote.is_empty() && prior.and_then(Option::as_ref).is_none() {
        return None;
    }
    Some(remote.to_owned())
}
