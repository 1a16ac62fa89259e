// Group-level payload pieces shared by both rule families.

use fwconverge_api::types::{
    ActivePeriodInput, ApplicationInput, CustomServiceInput, DeviceAttributesInput, EndpointInput,
    InternetDestinationInput, RecurringInput, ScheduleInput, ServiceInput, TrackingAlertInput,
    TrackingEventInput, TrackingInput,
};

use super::{Builder, range_input};
use crate::model::active_period::parse_instant;
use crate::model::{
    ActiveOn, ActivePeriod, ApplicationCriteria, CustomService, DeviceAttributes,
    EndpointCriteria, InternetDestination, PayloadMode, Protocol, Reference, Schedule, ServiceSpec,
    Tracking, TriState,
};

/// An optional group. Left out of a create; on update an undeclared
/// group is sent with every field cleared.
pub(super) fn group<G: Default, I>(
    b: &mut Builder,
    declared: Option<&G>,
    build: impl FnOnce(&mut Builder, &G) -> I,
) -> Option<I> {
    match (declared, b.mode()) {
        (Some(group), _) => Some(build(b, group)),
        (None, PayloadMode::Create) => None,
        (None, PayloadMode::Update) => Some(build(b, &G::default())),
    }
}

pub(super) fn endpoint(b: &mut Builder, group: &EndpointCriteria, path: &str) -> EndpointInput {
    let f = |name: &str| format!("{path}.{name}");
    EndpointInput {
        host: b.refs(&group.host, &f("host")),
        site: b.refs(&group.site, &f("site")),
        subnet: b.subnets(&group.subnet, &f("subnet")),
        ip: b.ips(&group.ip, &f("ip")),
        ip_range: b.ip_ranges(&group.ip_range, &f("ip_range")),
        global_ip_range: b.refs(&group.global_ip_range, &f("global_ip_range")),
        network_interface: b.refs(&group.network_interface, &f("network_interface")),
        site_network_subnet: b.refs(&group.site_network_subnet, &f("site_network_subnet")),
        floating_subnet: b.refs(&group.floating_subnet, &f("floating_subnet")),
        user: b.refs(&group.user, &f("user")),
        users_group: b.refs(&group.users_group, &f("users_group")),
        group: b.refs(&group.group, &f("group")),
        system_group: b.refs(&group.system_group, &f("system_group")),
    }
}

pub(super) fn application(
    b: &mut Builder,
    group: &ApplicationCriteria,
    path: &str,
) -> ApplicationInput {
    let f = |name: &str| format!("{path}.{name}");
    ApplicationInput {
        application: b.refs(&group.application, &f("application")),
        custom_app: b.refs(&group.custom_app, &f("custom_app")),
        app_category: b.refs(&group.app_category, &f("app_category")),
        custom_category: b.refs(&group.custom_category, &f("custom_category")),
        sanctioned_apps_category: b.refs(
            &group.sanctioned_apps_category,
            &f("sanctioned_apps_category"),
        ),
        domain: b.strings(&group.domain),
        fqdn: b.strings(&group.fqdn),
        ip: b.ips(&group.ip, &f("ip")),
        subnet: b.subnets(&group.subnet, &f("subnet")),
        ip_range: b.ip_ranges(&group.ip_range, &f("ip_range")),
        global_ip_range: b.refs(&group.global_ip_range, &f("global_ip_range")),
    }
}

pub(super) fn internet_destination(
    b: &mut Builder,
    group: &InternetDestination,
    path: &str,
) -> InternetDestinationInput {
    let f = |name: &str| format!("{path}.{name}");
    InternetDestinationInput {
        application: b.refs(&group.application, &f("application")),
        custom_app: b.refs(&group.custom_app, &f("custom_app")),
        app_category: b.refs(&group.app_category, &f("app_category")),
        custom_category: b.refs(&group.custom_category, &f("custom_category")),
        sanctioned_apps_category: b.refs(
            &group.sanctioned_apps_category,
            &f("sanctioned_apps_category"),
        ),
        country: b.refs(&group.country, &f("country")),
        domain: b.strings(&group.domain),
        fqdn: b.strings(&group.fqdn),
        ip: b.ips(&group.ip, &f("ip")),
        subnet: b.subnets(&group.subnet, &f("subnet")),
        ip_range: b.ip_ranges(&group.ip_range, &f("ip_range")),
        global_ip_range: b.refs(&group.global_ip_range, &f("global_ip_range")),
        remote_asn: b.strings(&group.remote_asn),
    }
}

pub(super) fn device_attributes(b: &mut Builder, group: &DeviceAttributes) -> DeviceAttributesInput {
    DeviceAttributesInput {
        category: b.strings(&group.category),
        device_type: b.strings(&group.device_type),
        model: b.strings(&group.model),
        manufacturer: b.strings(&group.manufacturer),
        os: b.strings(&group.os),
        os_version: b.strings(&group.os_version),
    }
}

pub(super) fn service(b: &mut Builder, spec: &ServiceSpec, path: &str) -> ServiceInput {
    let custom_path = format!("{path}.custom");
    let custom = if spec.custom.is_unset() && b.mode() == PayloadMode::Create {
        None
    } else {
        Some(
            spec.custom
                .items()
                .iter()
                .filter_map(|entry| custom_service(b, entry, &custom_path))
                .collect(),
        )
    };
    ServiceInput {
        standard: b.refs(&spec.standard, &format!("{path}.standard")),
        custom,
    }
}

fn custom_service(b: &mut Builder, entry: &CustomService, path: &str) -> Option<CustomServiceInput> {
    let has_ports = entry.port.as_ref().is_some_and(|p| !p.is_empty());
    if has_ports && entry.port_range.is_some() {
        b.reject(
            "INVALID_SERVICE",
            path,
            "a custom service takes either ports or a port range, not both",
        );
        return None;
    }
    if entry.protocol == Protocol::Icmp && (has_ports || entry.port_range.is_some()) {
        b.reject("INVALID_SERVICE", path, "ICMP services take no ports");
        return None;
    }
    let port = entry
        .port
        .as_ref()
        .map(|ports| b.ports(ports, &format!("{path}.port")));
    let port_range = match &entry.port_range {
        Some(range) => Some(b.port_range(range, &format!("{path}.port_range"))?),
        None => None,
    };
    Some(CustomServiceInput {
        port,
        port_range,
        protocol: entry.protocol.to_string(),
    })
}

// ── Rule-level blocks ───────────────────────────────────────────────

/// Tracking is always sent: the remote requires both sub-objects, so a
/// left-out block or alert goes out as the remote defaults.
pub(super) fn tracking(b: &mut Builder, declared: Option<&Tracking>) -> TrackingInput {
    let tracking = declared.cloned().unwrap_or_default();
    let alert = tracking.alert.unwrap_or_default();
    let mut list = |value: &TriState<Reference>, field: &str| {
        b.refs(value, field).or_else(|| Some(Vec::new()))
    };
    let subscription_group = list(&alert.subscription_group, "tracking.alert.subscription_group");
    let webhook = list(&alert.webhook, "tracking.alert.webhook");
    let mailing_list = list(&alert.mailing_list, "tracking.alert.mailing_list");
    TrackingInput {
        event: TrackingEventInput {
            enabled: tracking.event.enabled,
        },
        alert: TrackingAlertInput {
            enabled: alert.enabled,
            frequency: alert.frequency.to_string(),
            subscription_group,
            webhook,
            mailing_list,
        },
    }
}

/// Schedule is always sent; custom blocks that do not belong to the
/// chosen mode are rejected rather than silently dropped.
pub(super) fn schedule(b: &mut Builder, declared: Option<&Schedule>) -> ScheduleInput {
    let schedule = declared.cloned().unwrap_or_default();
    let field = "schedule";
    match schedule.active_on {
        ActiveOn::CustomTimeframe => {
            if schedule.custom_timeframe.is_none() {
                b.reject("INVALID_SCHEDULE", field, "CUSTOM_TIMEFRAME needs custom_timeframe");
            }
            if schedule.custom_recurring.is_some() {
                b.reject("INVALID_SCHEDULE", field, "custom_recurring is only valid with CUSTOM_RECURRING");
            }
        }
        ActiveOn::CustomRecurring => {
            match &schedule.custom_recurring {
                None => b.reject("INVALID_SCHEDULE", field, "CUSTOM_RECURRING needs custom_recurring"),
                Some(window) if window.days.is_empty() => {
                    b.reject("INVALID_SCHEDULE", field, "custom_recurring needs at least one day");
                }
                Some(_) => {}
            }
            if schedule.custom_timeframe.is_some() {
                b.reject("INVALID_SCHEDULE", field, "custom_timeframe is only valid with CUSTOM_TIMEFRAME");
            }
        }
        ActiveOn::Always | ActiveOn::WorkingHours => {
            if schedule.custom_timeframe.is_some() || schedule.custom_recurring.is_some() {
                b.reject(
                    "INVALID_SCHEDULE",
                    field,
                    format_args!("{} takes no custom timeframe or recurrence", schedule.active_on),
                );
            }
        }
    }
    if let Some(frame) = &schedule.custom_timeframe {
        match (parse_instant(&frame.from), parse_instant(&frame.to)) {
            (Some(from), Some(to)) if from < to => {}
            _ => b.reject(
                "INVALID_SCHEDULE",
                "schedule.custom_timeframe",
                format_args!("{frame} is not a forward time range"),
            ),
        }
    }
    ScheduleInput {
        active_on: schedule.active_on.to_string(),
        custom_timeframe: schedule.custom_timeframe.as_ref().map(range_input),
        custom_recurring: schedule.custom_recurring.map(|window| RecurringInput {
            from: window.from,
            to: window.to,
            days: window.days.iter().map(ToString::to_string).collect(),
        }),
    }
}

/// Left out of a create when undeclared; cleared on update.
pub(super) fn active_period(b: &mut Builder, declared: Option<&ActivePeriod>) -> Option<ActivePeriodInput> {
    let Some(period) = declared else {
        return (b.mode() == PayloadMode::Update).then_some(ActivePeriodInput {
            effective_from: None,
            expires_at: None,
            use_effective_from: false,
            use_expires_at: false,
        });
    };
    let parsed = |raw: Option<&str>, b: &mut Builder, field: &str| {
        let raw = raw?;
        let instant = parse_instant(raw);
        if instant.is_none() {
            b.reject("INVALID_ACTIVE_PERIOD", field, format_args!("{raw:?} is not a timestamp"));
        }
        instant
    };
    let from = parsed(period.effective_from(), b, "active_period.effective_from");
    let to = parsed(period.expires_at(), b, "active_period.expires_at");
    if let (Some(from), Some(to)) = (from, to) {
        if from >= to {
            b.reject(
                "INVALID_ACTIVE_PERIOD",
                "active_period",
                "expires_at must be later than effective_from",
            );
        }
    }
    Some(ActivePeriodInput {
        effective_from: period.effective_from().map(str::to_owned),
        expires_at: period.expires_at().map(str::to_owned),
        use_effective_from: period.use_effective_from(),
        use_expires_at: period.use_expires_at(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{RangeValue, RecurringWindow, Weekday};
    use pretty_assertions::assert_eq;

    #[test]
    fn undeclared_group_is_cleared_only_on_update() {
        let mut create = Builder::new(PayloadMode::Create);
        assert!(group(&mut create, None::<&EndpointCriteria>, |b, g| endpoint(b, g, "source")).is_none());

        let mut update = Builder::new(PayloadMode::Update);
        let cleared = group(&mut update, None::<&EndpointCriteria>, |b, g| endpoint(b, g, "source")).unwrap();
        assert_eq!(cleared.ip, Some(vec![]));
        assert_eq!(cleared.system_group, Some(vec![]));
    }

    #[test]
    fn declared_endpoint_omits_unset_fields_on_create() {
        let source = EndpointCriteria {
            ip: TriState::from_vec(vec!["10.0.0.1".into()]),
            site: TriState::Empty,
            ..EndpointCriteria::default()
        };
        let mut b = Builder::new(PayloadMode::Create);
        let input = endpoint(&mut b, &source, "source");
        assert_eq!(input.ip, Some(vec!["10.0.0.1".into()]));
        assert_eq!(input.site, Some(vec![]));
        assert_eq!(input.host, None);
        b.finish(()).unwrap();
    }

    #[test]
    fn update_sends_explicit_empty_custom_list() {
        let spec = ServiceSpec {
            standard: TriState::from_vec(vec![Reference::by_name("HTTP")]),
            custom: TriState::Unset,
        };
        let mut b = Builder::new(PayloadMode::Update);
        let input = service(&mut b, &spec, "service");
        assert_eq!(input.custom, Some(vec![]));

        let mut b = Builder::new(PayloadMode::Create);
        assert_eq!(service(&mut b, &spec, "service").custom, None);
    }

    #[test]
    fn custom_service_rejects_ports_and_range_together() {
        let spec = ServiceSpec {
            standard: TriState::Unset,
            custom: TriState::from_vec(vec![CustomService {
                port: Some(vec!["53".into()]),
                port_range: Some(RangeValue::new("1000", "2000")),
                protocol: Protocol::Udp,
            }]),
        };
        let mut b = Builder::new(PayloadMode::Create);
        service(&mut b, &spec, "service");
        let entries = b.finish(()).unwrap_err().entries();
        assert_eq!(entries[0].code, "INVALID_SERVICE");
    }

    #[test]
    fn left_out_tracking_goes_out_as_defaults() {
        let mut b = Builder::new(PayloadMode::Create);
        let input = tracking(&mut b, None);
        assert!(!input.event.enabled);
        assert!(!input.alert.enabled);
        assert_eq!(input.alert.frequency, "DAILY");
        assert_eq!(input.alert.webhook, Some(vec![]));
    }

    #[test]
    fn schedule_mode_and_blocks_must_agree() {
        let mut b = Builder::new(PayloadMode::Create);
        let declared = Schedule {
            active_on: ActiveOn::CustomRecurring,
            custom_timeframe: None,
            custom_recurring: Some(RecurringWindow {
                from: "08:00".into(),
                to: "18:00".into(),
                days: vec![Weekday::Monday],
            }),
        };
        let input = schedule(&mut b, Some(&declared));
        assert_eq!(input.active_on, "CUSTOM_RECURRING");
        assert_eq!(input.custom_recurring.unwrap().days, vec!["MONDAY"]);
        b.finish(()).unwrap();

        let mut b = Builder::new(PayloadMode::Create);
        schedule(
            &mut b,
            Some(&Schedule {
                active_on: ActiveOn::CustomTimeframe,
                ..Schedule::default()
            }),
        );
        assert_eq!(b.finish(()).unwrap_err().entries()[0].code, "INVALID_SCHEDULE");
    }

    #[test]
    fn active_period_must_move_forward() {
        let mut b = Builder::new(PayloadMode::Create);
        let period = ActivePeriod::new(
            Some("2026-02-01T00:00:00Z".into()),
            Some("2026-01-01T00:00:00Z".into()),
        );
        let input = active_period(&mut b, Some(&period)).unwrap();
        assert!(input.use_effective_from && input.use_expires_at);
        assert_eq!(b.finish(()).unwrap_err().entries()[0].code, "INVALID_ACTIVE_PERIOD");
    }

    #[test]
    fn undeclared_active_period_is_cleared_on_update() {
        let mut b = Builder::new(PayloadMode::Update);
        let input = active_period(&mut b, None).unwrap();
        assert!(!input.use_effective_from);
        assert!(active_period(&mut Builder::new(PayloadMode::Create), None).is_none());
    }
}
