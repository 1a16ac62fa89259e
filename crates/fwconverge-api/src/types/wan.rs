// ── WAN firewall response shapes ──
//
// WAN rules carry a `direction`, a separate `application` criteria group,
// and a destination with the same shape as the source.

use serde::{Deserialize, Serialize};

use super::common::{
    ActivePeriodResponse, ApplicationResponse, DeviceAttributesResponse, EndpointResponse,
    ScheduleResponse, ServiceResponse, TrackingResponse,
};
use super::refs::{CountryRef, DeviceProfileRef, PolicySectionRef};

/// A WAN firewall rule as returned by the policy query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WanRuleResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub id: String,
    #[serde(deserialize_with = "super::null_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_default")]
    pub description: String,
    #[serde(deserialize_with = "super::null_default")]
    pub index: i64,
    #[serde(deserialize_with = "super::null_default")]
    pub enabled: bool,
    pub section: Option<PolicySectionRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub source: EndpointResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub connection_origin: String,
    #[serde(deserialize_with = "super::null_default")]
    pub country: Vec<CountryRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub device: Vec<DeviceProfileRef>,
    #[serde(rename = "deviceOS", deserialize_with = "super::null_default")]
    pub device_os: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub device_attributes: DeviceAttributesResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub destination: EndpointResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub application: ApplicationResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub service: ServiceResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub action: String,
    #[serde(deserialize_with = "super::null_default")]
    pub direction: String,
    #[serde(deserialize_with = "super::null_default")]
    pub tracking: TrackingResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub schedule: ScheduleResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub active_period: ActivePeriodResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub exceptions: Vec<WanExceptionResponse>,
}

/// One entry of a WAN rule's exception list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WanExceptionResponse {
    pub name: Option<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub source: EndpointResponse,
    #[serde(rename = "deviceOS", deserialize_with = "super::null_default")]
    pub device_os: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub country: Vec<CountryRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub device: Vec<DeviceProfileRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub device_attributes: DeviceAttributesResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub destination: EndpointResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub application: ApplicationResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub service: ServiceResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub direction: String,
    #[serde(deserialize_with = "super::null_default")]
    pub connection_origin: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sparse_rule_fills_defaults() {
        let raw = serde_json::json!({
            "id": "1001",
            "name": "allow-dns",
            "enabled": true,
            "action": "ALLOW",
            "source": { "ip": ["10.0.0.1"] },
            "deviceOS": ["WINDOWS"],
            "exceptions": [{ "name": "skip-lab", "source": { "site": [{ "id": "9", "name": "Lab" }] } }]
        });
        let rule: WanRuleResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(rule.source.ip, vec!["10.0.0.1"]);
        assert!(rule.destination.host.is_empty());
        assert_eq!(rule.device_os, vec!["WINDOWS"]);
        assert_eq!(rule.exceptions.len(), 1);
        assert_eq!(rule.exceptions[0].source.site[0].name.as_deref(), Some("Lab"));
        assert!(rule.schedule.custom_timeframe.is_none());
    }

    #[test]
    fn null_fields_read_as_empty() {
        let raw = serde_json::json!({
            "id": "1002",
            "name": "block-lab",
            "description": null,
            "enabled": true,
            "action": "BLOCK",
            "direction": "TO",
            "source": null,
            "country": null,
            "deviceOS": null,
            "destination": { "ip": null, "host": [{ "id": "h1", "name": "db" }] },
            "tracking": { "event": null, "alert": { "enabled": null, "frequency": null } },
            "exceptions": null
        });
        let rule: WanRuleResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(rule.description, "");
        assert!(rule.source.is_blank());
        assert!(rule.country.is_empty());
        assert!(rule.device_os.is_empty());
        assert!(rule.destination.ip.is_empty());
        assert_eq!(rule.destination.host.len(), 1);
        assert!(!rule.tracking.event.enabled);
        assert!(rule.tracking.alert.frequency.is_empty());
        assert!(rule.exceptions.is_empty());
    }
}
