// Group-level hydration shared by both rule families.

use fwconverge_api::types::{
    ActivePeriodResponse, ApplicationResponse, CustomServiceResponse, DeviceAttributesResponse,
    EndpointResponse, InternetDestinationResponse, ScheduleResponse, ServiceResponse,
    TrackingResponse,
};

use super::{HydrationWarning, Hydrator, strings};
use crate::model::active_period::same_instant;
use crate::model::{
    ActiveOn, ActivePeriod, AlertFrequency, ApplicationCriteria, CustomService, DeviceAttributes,
    EndpointCriteria, FieldPolicy, InternetDestination, RecurringWindow, Schedule, ServiceSpec,
    TriState, Tracking, TrackingAlert, TrackingEvent,
};

/// Hydrate an optional group.
///
/// Dense (rule level): a blank remote group stays absent unless the
/// operator declared it. Sparse (exceptions): the group is always
/// materialized, with unpopulated fields left unset.
pub(crate) fn group<G>(
    blank: bool,
    prior: Option<&Option<G>>,
    policy: FieldPolicy,
    build: impl FnOnce(Option<&G>) -> G,
) -> Option<G> {
    let declared = prior.and_then(Option::as_ref);
    if blank && policy == FieldPolicy::Dense && declared.is_none() {
        return None;
    }
    Some(build(declared))
}

pub(crate) fn endpoint(
    h: &mut Hydrator<'_>,
    remote: &EndpointResponse,
    prior: Option<&EndpointCriteria>,
    policy: FieldPolicy,
    path: &str,
) -> EndpointCriteria {
    let f = |name: &str| format!("{path}.{name}");
    EndpointCriteria {
        host: h.refs(&remote.host, prior.map(|p| &p.host), policy, &f("host")),
        site: h.refs(&remote.site, prior.map(|p| &p.site), policy, &f("site")),
        subnet: strings(&remote.subnet, prior.map(|p| &p.subnet), policy),
        ip: strings(&remote.ip, prior.map(|p| &p.ip), policy),
        ip_range: h.ranges(&remote.ip_range, prior.map(|p| &p.ip_range), policy, &f("ip_range")),
        global_ip_range: h.refs(
            &remote.global_ip_range,
            prior.map(|p| &p.global_ip_range),
            policy,
            &f("global_ip_range"),
        ),
        network_interface: h.interfaces(
            &remote.network_interface,
            prior.map(|p| &p.network_interface),
            policy,
            &f("network_interface"),
        ),
        site_network_subnet: h.refs(
            &remote.site_network_subnet,
            prior.map(|p| &p.site_network_subnet),
            policy,
            &f("site_network_subnet"),
        ),
        floating_subnet: h.refs(
            &remote.floating_subnet,
            prior.map(|p| &p.floating_subnet),
            policy,
            &f("floating_subnet"),
        ),
        user: h.refs(&remote.user, prior.map(|p| &p.user), policy, &f("user")),
        users_group: h.refs(
            &remote.users_group,
            prior.map(|p| &p.users_group),
            policy,
            &f("users_group"),
        ),
        group: h.refs(&remote.group, prior.map(|p| &p.group), policy, &f("group")),
        system_group: h.refs(
            &remote.system_group,
            prior.map(|p| &p.system_group),
            policy,
            &f("system_group"),
        ),
    }
}

pub(crate) fn application(
    h: &mut Hydrator<'_>,
    remote: &ApplicationResponse,
    prior: Option<&ApplicationCriteria>,
    policy: FieldPolicy,
    path: &str,
) -> ApplicationCriteria {
    let f = |name: &str| format!("{path}.{name}");
    ApplicationCriteria {
        application: h.refs(
            &remote.application,
            prior.map(|p| &p.application),
            policy,
            &f("application"),
        ),
        custom_app: h.refs(
            &remote.custom_app,
            prior.map(|p| &p.custom_app),
            policy,
            &f("custom_app"),
        ),
        app_category: h.refs(
            &remote.app_category,
            prior.map(|p| &p.app_category),
            policy,
            &f("app_category"),
        ),
        custom_category: h.refs(
            &remote.custom_category,
            prior.map(|p| &p.custom_category),
            policy,
            &f("custom_category"),
        ),
        sanctioned_apps_category: h.refs(
            &remote.sanctioned_apps_category,
            prior.map(|p| &p.sanctioned_apps_category),
            policy,
            &f("sanctioned_apps_category"),
        ),
        domain: strings(&remote.domain, prior.map(|p| &p.domain), policy),
        fqdn: strings(&remote.fqdn, prior.map(|p| &p.fqdn), policy),
        ip: strings(&remote.ip, prior.map(|p| &p.ip), policy),
        subnet: strings(&remote.subnet, prior.map(|p| &p.subnet), policy),
        ip_range: h.ranges(&remote.ip_range, prior.map(|p| &p.ip_range), policy, &f("ip_range")),
        global_ip_range: h.refs(
            &remote.global_ip_range,
            prior.map(|p| &p.global_ip_range),
            policy,
            &f("global_ip_range"),
        ),
    }
}

pub(crate) fn internet_destination(
    h: &mut Hydrator<'_>,
    remote: &InternetDestinationResponse,
    prior: Option<&InternetDestination>,
    policy: FieldPolicy,
    path: &str,
) -> InternetDestination {
    let f = |name: &str| format!("{path}.{name}");
    InternetDestination {
        application: h.refs(
            &remote.application,
            prior.map(|p| &p.application),
            policy,
            &f("application"),
        ),
        custom_app: h.refs(
            &remote.custom_app,
            prior.map(|p| &p.custom_app),
            policy,
            &f("custom_app"),
        ),
        app_category: h.refs(
            &remote.app_category,
            prior.map(|p| &p.app_category),
            policy,
            &f("app_category"),
        ),
        custom_category: h.refs(
            &remote.custom_category,
            prior.map(|p| &p.custom_category),
            policy,
            &f("custom_category"),
        ),
        sanctioned_apps_category: h.refs(
            &remote.sanctioned_apps_category,
            prior.map(|p| &p.sanctioned_apps_category),
            policy,
            &f("sanctioned_apps_category"),
        ),
        country: h.refs(&remote.country, prior.map(|p| &p.country), policy, &f("country")),
        domain: strings(&remote.domain, prior.map(|p| &p.domain), policy),
        fqdn: strings(&remote.fqdn, prior.map(|p| &p.fqdn), policy),
        ip: strings(&remote.ip, prior.map(|p| &p.ip), policy),
        subnet: strings(&remote.subnet, prior.map(|p| &p.subnet), policy),
        ip_range: h.ranges(&remote.ip_range, prior.map(|p| &p.ip_range), policy, &f("ip_range")),
        global_ip_range: h.refs(
            &remote.global_ip_range,
            prior.map(|p| &p.global_ip_range),
            policy,
            &f("global_ip_range"),
        ),
        remote_asn: strings(&remote.remote_asn, prior.map(|p| &p.remote_asn), policy),
    }
}

pub(crate) fn device_attributes(
    remote: &DeviceAttributesResponse,
    prior: Option<&DeviceAttributes>,
    policy: FieldPolicy,
) -> DeviceAttributes {
    DeviceAttributes {
        category: strings(&remote.category, prior.map(|p| &p.category), policy),
        device_type: strings(&remote.device_type, prior.map(|p| &p.device_type), policy),
        model: strings(&remote.model, prior.map(|p| &p.model), policy),
        manufacturer: strings(&remote.manufacturer, prior.map(|p| &p.manufacturer), policy),
        os: strings(&remote.os, prior.map(|p| &p.os), policy),
        os_version: strings(&remote.os_version, prior.map(|p| &p.os_version), policy),
    }
}

pub(crate) fn service(
    h: &mut Hydrator<'_>,
    remote: &ServiceResponse,
    prior: Option<&ServiceSpec>,
    policy: FieldPolicy,
    path: &str,
) -> ServiceSpec {
    let custom_path = format!("{path}.custom");
    // Custom entries keep remote order: it is significant.
    let custom = remote
        .custom
        .iter()
        .filter_map(|entry| custom_service(h, entry, &custom_path))
        .collect();
    ServiceSpec {
        standard: h.refs(
            &remote.standard,
            prior.map(|p| &p.standard),
            policy,
            &format!("{path}.standard"),
        ),
        custom: TriState::decode(custom, prior.map(|p| &p.custom), policy),
    }
}

fn custom_service(
    h: &mut Hydrator<'_>,
    remote: &CustomServiceResponse,
    path: &str,
) -> Option<CustomService> {
    let protocol = h.enum_value(&remote.protocol, &format!("{path}.protocol"))?;
    let port: Vec<String> = remote.port.iter().filter(|p| !p.is_empty()).cloned().collect();
    Some(CustomService {
        port: (!port.is_empty()).then_some(port),
        port_range: remote
            .port_range
            .as_ref()
            .and_then(|r| h.range(r, &format!("{path}.port_range"))),
        protocol,
    })
}

// ── Rule-level blocks ───────────────────────────────────────────────

/// Tracking. A declaration that left tracking or its alert out stays that
/// way as long as the remote holds the defaults the builder sends.
pub(crate) fn tracking(
    h: &mut Hydrator<'_>,
    remote: &TrackingResponse,
    prior: Option<&Option<Tracking>>,
) -> Option<Tracking> {
    let declared = prior.and_then(Option::as_ref);
    let declared_alert = declared.and_then(|t| t.alert.as_ref());
    let policy = FieldPolicy::Dense;
    let alert = TrackingAlert {
        enabled: remote.alert.enabled,
        frequency: h
            .enum_value(&remote.alert.frequency, "tracking.alert.frequency")
            .unwrap_or(AlertFrequency::Daily),
        subscription_group: h.refs(
            &remote.alert.subscription_group,
            declared_alert.map(|a| &a.subscription_group),
            policy,
            "tracking.alert.subscription_group",
        ),
        webhook: h.refs(
            &remote.alert.webhook,
            declared_alert.map(|a| &a.webhook),
            policy,
            "tracking.alert.webhook",
        ),
        mailing_list: h.refs(
            &remote.alert.mailing_list,
            declared_alert.map(|a| &a.mailing_list),
            policy,
            "tracking.alert.mailing_list",
        ),
    };
    let alert_is_default = Tracking {
        event: TrackingEvent::default(),
        alert: Some(alert.clone()),
    }
    .is_default();
    let tracking = Tracking {
        event: TrackingEvent {
            enabled: remote.event.enabled,
        },
        alert: if declared.is_some_and(|t| t.alert.is_none()) && alert_is_default {
            None
        } else {
            Some(alert)
        },
    };
    if declared.is_none() && tracking.is_default() {
        return None;
    }
    Some(tracking)
}

/// Schedule. No custom configuration on the remote reads as ALWAYS.
pub(crate) fn schedule(
    h: &mut Hydrator<'_>,
    remote: &ScheduleResponse,
    prior: Option<&Option<Schedule>>,
) -> Option<Schedule> {
    let active_on = h
        .enum_value(&remote.active_on, "schedule.active_on")
        .unwrap_or(ActiveOn::Always);
    let custom_timeframe = remote
        .custom_timeframe
        .as_ref()
        .and_then(|r| h.range(r, "schedule.custom_timeframe"));
    let custom_recurring = remote.custom_recurring.as_ref().and_then(|r| {
        let window = h.range(
            &fwconverge_api::types::RangeResponse {
                from: r.from.clone(),
                to: r.to.clone(),
            },
            "schedule.custom_recurring",
        )?;
        let days = r
            .days
            .iter()
            .filter_map(|d| h.enum_value(d, "schedule.custom_recurring.days"))
            .collect();
        Some(RecurringWindow {
            from: window.from,
            to: window.to,
            days,
        })
    });
    let schedule = Schedule {
        active_on,
        custom_timeframe,
        custom_recurring,
    };
    if schedule.is_always() && prior.and_then(Option::as_ref).is_none() {
        return None;
    }
    Some(schedule)
}

/// Active period. A timestamp echoed in a different textual form keeps
/// the declared text; a declared timestamp the remote dropped is kept
/// with a drift warning. The `use_*` flags are recomputed afterwards.
pub(crate) fn active_period(
    h: &mut Hydrator<'_>,
    remote: &ActivePeriodResponse,
    prior: Option<&Option<ActivePeriod>>,
) -> Option<ActivePeriod> {
    let declared = prior.and_then(Option::as_ref);
    let effective_from = timestamp(
        h,
        remote.effective_from.as_deref(),
        declared.and_then(ActivePeriod::effective_from),
        "active_period.effective_from",
    );
    let expires_at = timestamp(
        h,
        remote.expires_at.as_deref(),
        declared.and_then(ActivePeriod::expires_at),
        "active_period.expires_at",
    );
    let period = ActivePeriod::new(effective_from, expires_at);
    if period.is_unbounded() && declared.is_none() {
        return None;
    }
    Some(period)
}

fn timestamp(
    h: &mut Hydrator<'_>,
    remote: Option<&str>,
    declared: Option<&str>,
    field: &str,
) -> Option<String> {
    match (remote.filter(|s| !s.is_empty()), declared) {
        (Some(echoed), Some(declared)) if same_instant(echoed, declared) => {
            Some(declared.to_owned())
        }
        (Some(echoed), _) => Some(echoed.to_owned()),
        (None, Some(declared)) => {
            h.warn(HydrationWarning::Drift {
                field: field.to_owned(),
                message: "not echoed by the remote, keeping the declared value".into(),
            });
            Some(declared.to_owned())
        }
        (None, None) => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::InterfaceNames;
    use crate::model::{Protocol, RangeValue, Reference};
    use fwconverge_api::types::{RangeResponse, ServiceRef, SiteRef};

    #[test]
    fn blank_dense_group_without_declaration_is_absent() {
        let built = group::<EndpointCriteria>(true, None, FieldPolicy::Dense, |_| {
            EndpointCriteria::default()
        });
        assert!(built.is_none());
        let declared = Some(EndpointCriteria::default());
        let built = group(true, Some(&declared), FieldPolicy::Dense, |_| {
            EndpointCriteria::default()
        });
        assert!(built.is_some());
    }

    #[test]
    fn sparse_group_is_always_materialized() {
        let built = group::<EndpointCriteria>(true, None, FieldPolicy::Sparse, |_| {
            EndpointCriteria::default()
        });
        assert!(built.is_some());
    }

    #[test]
    fn sparse_endpoint_leaves_untouched_fields_unset() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let remote = EndpointResponse {
            site: vec![SiteRef::new("5", "HQ")],
            ..EndpointResponse::default()
        };
        let declared = EndpointCriteria {
            site: TriState::Present(vec![Reference::by_name("HQ")]),
            user: TriState::Empty,
            ..EndpointCriteria::default()
        };
        let source = endpoint(&mut h, &remote, Some(&declared), FieldPolicy::Sparse, "source");
        assert_eq!(source.site, TriState::Present(vec![Reference::by_name("HQ")]));
        assert!(source.ip.is_unset());
        assert!(source.user.is_declared_empty());
    }

    #[test]
    fn custom_services_keep_remote_order() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let remote = ServiceResponse {
            standard: vec![ServiceRef::new("1", "HTTP")],
            custom: vec![
                CustomServiceResponse {
                    port: vec!["8443".into(), "443".into()],
                    port_range: None,
                    protocol: "TCP".into(),
                },
                CustomServiceResponse {
                    port: vec![],
                    port_range: Some(RangeResponse {
                        from: Some("1000".into()),
                        to: Some("2000".into()),
                    }),
                    protocol: "UDP".into(),
                },
            ],
        };
        let spec = service(&mut h, &remote, None, FieldPolicy::Dense, "service");
        let custom = spec.custom.items();
        assert_eq!(custom[0].port, Some(vec!["8443".to_string(), "443".to_string()]));
        assert_eq!(custom[1].port_range, Some(RangeValue::new("1000", "2000")));
        assert_eq!(custom[1].protocol, Protocol::Udp);
    }

    #[test]
    fn schedule_without_custom_configuration_is_always() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let remote = ScheduleResponse::default();
        assert_eq!(schedule(&mut h, &remote, None), None);
        let declared = Some(Schedule::default());
        assert_eq!(schedule(&mut h, &remote, Some(&declared)), Some(Schedule::default()));
    }

    #[test]
    fn tracking_keeps_omitted_alert_omitted() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let mut remote = TrackingResponse::default();
        remote.event.enabled = true;
        remote.alert.frequency = "DAILY".into();
        let declared = Some(Tracking {
            event: TrackingEvent { enabled: true },
            alert: None,
        });
        let hydrated = tracking(&mut h, &remote, Some(&declared)).unwrap();
        assert_eq!(hydrated, declared.unwrap());
    }

    #[test]
    fn active_period_flags_ignore_remote_booleans() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let remote = ActivePeriodResponse {
            effective_from: Some("2026-01-01T00:00:00Z".into()),
            expires_at: None,
            use_effective_from: false,
            use_expires_at: true,
        };
        let period = active_period(&mut h, &remote, None).unwrap();
        assert!(period.use_effective_from());
        assert!(!period.use_expires_at());
    }

    #[test]
    fn active_period_keeps_declared_text_for_same_instant() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let declared = Some(ActivePeriod::new(
            Some("2026-01-01T00:00:00".into()),
            Some("2026-12-31T00:00:00Z".into()),
        ));
        let remote = ActivePeriodResponse {
            effective_from: Some("2026-01-01T00:00:00.000Z".into()),
            expires_at: None,
            use_effective_from: true,
            use_expires_at: false,
        };
        let period = active_period(&mut h, &remote, Some(&declared)).unwrap();
        assert_eq!(period, declared.unwrap());
        assert!(period.use_expires_at());
        assert!(matches!(
            h.warnings(),
            [HydrationWarning::Drift { field, .. }] if field == "active_period.expires_at"
        ));
    }
}
