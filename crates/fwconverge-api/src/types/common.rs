// ── Response shapes shared by both firewall families ──
//
// Every struct here is `#[serde(default)]`: the remote API omits empty
// collections and unset sub-objects inconsistently, and an omitted
// collection means the same thing as an empty one on read. The same goes
// for an explicit `null`, hence `null_default` on every non-Option field.

use serde::{Deserialize, Deserializer, Serialize};

use super::refs::{
    ApplicationCategoryRef, ApplicationRef, CustomApplicationRef, CustomCategoryRef,
    FloatingSubnetRef, GlobalIpRangeRef, GroupRef, HostRef, MailingListRef, NetworkInterfaceRef,
    SanctionedAppsCategoryRef, ServiceRef, SiteNetworkSubnetRef, SiteRef, SubscriptionGroupRef,
    SystemGroupRef, UserRef, UsersGroupRef, WebhookRef,
};

// ── Ranges ──────────────────────────────────────────────────────────

/// `{ from, to }`: IP ranges, port ranges and time-of-day ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeResponse {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Custom recurring schedule window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurringResponse {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub days: Vec<String>,
}

// ── Endpoint criteria (source, WAN destination) ─────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub host: Vec<HostRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub site: Vec<SiteRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub subnet: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub ip: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub ip_range: Vec<RangeResponse>,
    #[serde(deserialize_with = "super::null_default")]
    pub global_ip_range: Vec<GlobalIpRangeRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub network_interface: Vec<NetworkInterfaceRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub site_network_subnet: Vec<SiteNetworkSubnetRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub floating_subnet: Vec<FloatingSubnetRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub user: Vec<UserRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub users_group: Vec<UsersGroupRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub group: Vec<GroupRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub system_group: Vec<SystemGroupRef>,
}

// ── Application criteria (WAN application) ──────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub application: Vec<ApplicationRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub custom_app: Vec<CustomApplicationRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub app_category: Vec<ApplicationCategoryRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub custom_category: Vec<CustomCategoryRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub sanctioned_apps_category: Vec<SanctionedAppsCategoryRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub domain: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub fqdn: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub ip: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub subnet: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub ip_range: Vec<RangeResponse>,
    #[serde(deserialize_with = "super::null_default")]
    pub global_ip_range: Vec<GlobalIpRangeRef>,
}

// ── Device posture ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceAttributesResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub category: Vec<String>,
    #[serde(rename = "type", deserialize_with = "super::null_default")]
    pub device_type: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub model: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub manufacturer: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub os: Vec<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub os_version: Vec<String>,
}

// ── Service ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub standard: Vec<ServiceRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub custom: Vec<CustomServiceResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomServiceResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub port: Vec<String>,
    pub port_range: Option<RangeResponse>,
    #[serde(deserialize_with = "super::null_default")]
    pub protocol: String,
}

// ── Tracking ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub event: TrackingEventResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub alert: TrackingAlertResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingEventResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingAlertResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub enabled: bool,
    #[serde(deserialize_with = "super::null_default")]
    pub frequency: String,
    #[serde(deserialize_with = "super::null_default")]
    pub subscription_group: Vec<SubscriptionGroupRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub webhook: Vec<WebhookRef>,
    #[serde(deserialize_with = "super::null_default")]
    pub mailing_list: Vec<MailingListRef>,
}

// ── Schedule ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleResponse {
    #[serde(deserialize_with = "super::null_default")]
    pub active_on: String,
    pub custom_timeframe: Option<RangeResponse>,
    pub custom_recurring: Option<RecurringResponse>,
}

// ── Active period ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivePeriodResponse {
    pub effective_from: Option<String>,
    pub expires_at: Option<String>,
    #[serde(deserialize_with = "super::null_default")]
    pub use_effective_from: bool,
    #[serde(deserialize_with = "super::null_default")]
    pub use_expires_at: bool,
}

// ── Blank checks ────────────────────────────────────────────────────
//
// A group with nothing populated is how the remote says "not configured".

impl EndpointResponse {
    pub fn is_blank(&self) -> bool {
        self.host.is_empty()
            && self.site.is_empty()
            && self.subnet.is_empty()
            && self.ip.is_empty()
            && self.ip_range.is_empty()
            && self.global_ip_range.is_empty()
            && self.network_interface.is_empty()
            && self.site_network_subnet.is_empty()
            && self.floating_subnet.is_empty()
            && self.user.is_empty()
            && self.users_group.is_empty()
            && self.group.is_empty()
            && self.system_group.is_empty()
    }
}

impl ApplicationResponse {
    pub fn is_blank(&self) -> bool {
        self.application.is_empty()
            && self.custom_app.is_empty()
            && self.app_category.is_empty()
            && self.custom_category.is_empty()
            && self.sanctioned_apps_category.is_empty()
            && self.domain.is_empty()
            && self.fqdn.is_empty()
            && self.ip.is_empty()
            && self.subnet.is_empty()
            && self.ip_range.is_empty()
            && self.global_ip_range.is_empty()
    }
}

impl DeviceAttributesResponse {
    pub fn is_blank(&self) -> bool {
        self.category.is_empty()
            && self.device_type.is_empty()
            && self.model.is_empty()
            && self.manufacturer.is_empty()
            && self.os.is_empty()
            && self.os_version.is_empty()
    }
}

impl ServiceResponse {
    pub fn is_blank(&self) -> bool {
        self.standard.is_empty() && self.custom.is_empty()
    }
}

// ── Policy document ─────────────────────────────────────────────────

/// The full policy as returned by the family's policy query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "R: Deserialize<'de>"))]
pub struct PolicyDocument<R> {
    #[serde(deserialize_with = "enabled_unless_false")]
    pub enabled: bool,
    #[serde(deserialize_with = "super::null_default")]
    pub rules: Vec<PolicyRuleEntry<R>>,
    #[serde(deserialize_with = "super::null_default")]
    pub sections: Vec<PolicySectionEntry>,
    pub revision: Option<RevisionInfo>,
}

impl<R> Default for PolicyDocument<R> {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: Vec::new(),
            sections: Vec::new(),
            revision: None,
        }
    }
}

/// A policy is on unless the remote says otherwise.
fn enabled_unless_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRuleEntry<R> {
    pub rule: R,
    #[serde(default, deserialize_with = "super::null_default")]
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySectionEntry {
    #[serde(deserialize_with = "super::null_default")]
    pub section: super::refs::PolicySectionRef,
    #[serde(deserialize_with = "super::null_default")]
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionInfo {
    pub id: Option<String>,
    pub name: Option<String>,
}
