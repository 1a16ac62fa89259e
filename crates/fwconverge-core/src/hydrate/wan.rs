// WAN firewall rule hydration.

use fwconverge_api::types::{WanExceptionResponse, WanRuleResponse};

use super::Hydrator;
use super::criteria::{
    active_period, application, device_attributes, endpoint, group, schedule, service, tracking,
};
use crate::exceptions;
use crate::model::{Direction, FieldPolicy, RuleAction, WanException, WanRule};

pub(crate) fn rule(h: &mut Hydrator<'_>, remote: &WanRuleResponse, prior: Option<&WanRule>) -> WanRule {
    let dense = FieldPolicy::Dense;
    WanRule {
        name: remote.name.clone(),
        description: super::internet::description(&remote.description, prior.map(|p| &p.description)),
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
            |d| endpoint(h, &remote.destination, d, dense, "destination"),
        ),
        application: group(
            remote.application.is_blank(),
            prior.map(|p| &p.application),
            dense,
            |d| application(h, &remote.application, d, dense, "application"),
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
        direction: h.required_enum(
            &remote.direction,
            prior.map(|p| p.direction),
            Direction::To,
            "direction",
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

/// One exception. Sub-groups are always materialized; remote-empty
/// sub-fields stay unset unless the operator declared them empty.
pub(crate) fn exception(
    h: &mut Hydrator<'_>,
    remote: &WanExceptionResponse,
    prior: Option<&WanException>,
) -> WanException {
    // Exceptions hydrate sparse, unlike the dense rule level: an empty
    // remote sub-field becomes `Unset`, not `Empty`, unless the
    // declaration had it `Empty`.
    let sparse = FieldPolicy::Sparse;
    WanException {
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
        destination: Some(endpoint(
            h,
            &remote.destination,
            prior.and_then(|p| p.destination.as_ref()),
            sparse,
            "exceptions.destination",
        )),
        application: Some(application(
            h,
            &remote.application,
            prior.and_then(|p| p.application.as_ref()),
            sparse,
            "exceptions.application",
        )),
        service: Some(service(
            h,
            &remote.service,
            prior.and_then(|p| p.service.as_ref()),
            sparse,
            "exceptions.service",
        )),
        direction: h.enum_value(&remote.direction, "exceptions.direction"),
        connection_origin: h.enum_value(&remote.connection_origin, "exceptions.connection_origin"),
    }
}
