// ── Internet firewall response shapes ──
//
// Internet rules have no direction and no separate application group;
// the destination is application / category / domain flavoured instead.

use serde::{Deserialize, Serialize};

use super::common::{
    ActivePeriodResponse, DeviceAttributesResponse, EndpointResponse, RangeResponse,
    ScheduleResponse, ServiceResponse, TrackingResponse,
};
use super::refs::{
    ApplicationCategoryRef, ApplicationRef, CountryRef, CustomApplicationRef, CustomCategoryRef,
    DeviceProfileRef, GlobalIpRangeRef, PolicySectionRef, SanctionedAppsCategoryRef,
};

/// An Internet firewall rule as returned by the policy query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InternetRuleResponse {
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
    pub destination: InternetDestinationResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub service: ServiceResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub action: String,
    #[serde(deserialize_with = "super::null_default")]
    pub tracking: TrackingResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub schedule: ScheduleResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub active_period: ActivePeriodResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub exceptions: Vec<InternetExceptionResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InternetDestinationResponse {
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
    pub country: Vec<CountryRef>,
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
    #[serde(deserialize_with = "super::null_default")]
    pub remote_asn: Vec<String>,
}

impl InternetDestinationResponse {
    pub fn is_blank(&self) -> bool {
        self.application.is_empty()
            && self.custom_app.is_empty()
            && self.app_category.is_empty()
            && self.custom_category.is_empty()
            && self.sanctioned_apps_category.is_empty()
            && self.country.is_empty()
            && self.domain.is_empty()
            && self.fqdn.is_empty()
            && self.ip.is_empty()
            && self.subnet.is_empty()
            && self.ip_range.is_empty()
            && self.global_ip_range.is_empty()
            && self.remote_asn.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InternetExceptionResponse {
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
    pub destination: InternetDestinationResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub service: ServiceResponse,
    #[serde(deserialize_with = "super::null_default")]
    pub connection_origin: String,
}
