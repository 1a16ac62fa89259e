// ── Mutation input shapes ──
//
// A field set to `None` is left out of the request entirely. On update
// the remote only touches fields present in the payload, so "left out"
// means "no change", never "clear". Choosing between `None` and
// `Some(vec![])` is the payload builder's job, not this module's.

use serde::{Deserialize, Serialize};

use super::refs::ObjectRefInput;

// ── Shared pieces ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeInput {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringInput {
    pub from: String,
    pub to: String,
    pub days: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_range: Option<Vec<RangeInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_ip_range: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interface: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_network_subnet: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_subnet: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_group: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_group: Option<Vec<ObjectRefInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_app: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_category: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_category: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanctioned_apps_category: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_range: Option<Vec<RangeInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_ip_range: Option<Vec<ObjectRefInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternetDestinationInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_app: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_category: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_category: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanctioned_apps_category: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_range: Option<Vec<RangeInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_ip_range: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_asn: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAttributesInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<Vec<CustomServiceInput>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomServiceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range: Option<RangeInput>,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingInput {
    pub event: TrackingEventInput,
    pub alert: TrackingAlertInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEventInput {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingAlertInput {
    pub enabled: bool,
    pub frequency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_group: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailing_list: Option<Vec<ObjectRefInput>>,
}

/// Schedule input. The custom blocks are always serialized, `null`
/// included, so switching back to `ALWAYS` clears them remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub active_on: String,
    pub custom_timeframe: Option<RangeInput>,
    pub custom_recurring: Option<RecurringInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePeriodInput {
    pub effective_from: Option<String>,
    pub expires_at: Option<String>,
    pub use_effective_from: bool,
    pub use_expires_at: bool,
}

// ── WAN ─────────────────────────────────────────────────────────────

/// Body of a WAN `addRule` mutation. Name, enabled, action and direction
/// are required by the remote; everything else may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WanRuleInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<ObjectRefInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Vec<ObjectRefInput>>,
    #[serde(rename = "deviceOS", skip_serializing_if = "Option::is_none")]
    pub device_os: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributesInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<EndpointInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceInput>,
    pub action: String,
    pub direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_period: Option<ActivePeriodInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<Vec<WanExceptionInput>>,
}

/// Body of a WAN `updateRule` mutation: every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WanRuleUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<ObjectRefInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Vec<ObjectRefInput>>,
    #[serde(rename = "deviceOS", skip_serializing_if = "Option::is_none")]
    pub device_os: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributesInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<EndpointInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_period: Option<ActivePeriodInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<Vec<WanExceptionInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WanExceptionInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointInput>,
    #[serde(rename = "deviceOS", skip_serializing_if = "Option::is_none")]
    pub device_os: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributesInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<EndpointInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<String>,
}

// ── Internet ────────────────────────────────────────────────────────

/// Body of an Internet `addRule` mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternetRuleInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<ObjectRefInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Vec<ObjectRefInput>>,
    #[serde(rename = "deviceOS", skip_serializing_if = "Option::is_none")]
    pub device_os: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributesInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<InternetDestinationInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceInput>,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_period: Option<ActivePeriodInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<Vec<InternetExceptionInput>>,
}

/// Body of an Internet `updateRule` mutation: every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternetRuleUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<ObjectRefInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Vec<ObjectRefInput>>,
    #[serde(rename = "deviceOS", skip_serializing_if = "Option::is_none")]
    pub device_os: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributesInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<InternetDestinationInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<TrackingInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_period: Option<ActivePeriodInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<Vec<InternetExceptionInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternetExceptionInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointInput>,
    #[serde(rename = "deviceOS", skip_serializing_if = "Option::is_none")]
    pub device_os: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Vec<ObjectRefInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributesInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<InternetDestinationInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<String>,
}

// ── Lifecycle envelopes ─────────────────────────────────────────────

/// Relative placement of a rule among its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInput {
    pub position: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRuleInput<R> {
    pub rule: R,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<PositionInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRuleInput<R> {
    pub id: String,
    pub rule: R,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRuleInput {
    pub id: String,
    pub to: PositionInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveRuleInput {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn none_fields_are_left_out_but_empty_lists_are_sent() {
        let body = WanRuleUpdateInput {
            service: Some(ServiceInput {
                standard: None,
                custom: Some(Vec::new()),
            }),
            ..WanRuleUpdateInput::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "service": { "custom": [] } })
        );
    }

    #[test]
    fn schedule_serializes_null_custom_blocks() {
        let schedule = ScheduleInput {
            active_on: "ALWAYS".into(),
            custom_timeframe: None,
            custom_recurring: None,
        };
        assert_eq!(
            serde_json::to_value(&schedule).unwrap(),
            json!({ "activeOn": "ALWAYS", "customTimeframe": null, "customRecurring": null })
        );
    }

    #[test]
    fn position_ref_is_renamed() {
        let to = PositionInput {
            position: "AFTER_RULE".into(),
            reference: Some("42".into()),
        };
        assert_eq!(
            serde_json::to_value(&to).unwrap(),
            json!({ "position": "AFTER_RULE", "ref": "42" })
        );
    }
}
