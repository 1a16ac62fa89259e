// ── Declared rules ──
//
// The declarative shape of one WAN or Internet firewall rule. These types
// carry no server-assigned ID: identity is tracked by the caller, and the
// remote index is reported separately on read.

use serde::{Deserialize, Serialize};

use super::active_period::ActivePeriod;
use super::criteria::{ApplicationCriteria, DeviceAttributes, EndpointCriteria, InternetDestination};
use super::exception::{ExceptionSet, InternetException, WanException};
use super::position::PositionAnchor;
use super::reference::Reference;
use super::schedule::Schedule;
use super::service::ServiceSpec;
use super::tracking::Tracking;
use super::tristate::TriState;
use crate::drift::{self, Converge, FieldDrift};

macro_rules! remote_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Serialize,
            Deserialize,
            strum::Display,
            strum::EnumString,
            strum::AsRefStr,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }
    };
}

remote_enum! {
    /// What happens to matching traffic.
    RuleAction { Allow, Block, Prompt, Rbi }
}

remote_enum! {
    /// WAN rules match one way (`TO`) or both ways.
    Direction { To, Both }
}

remote_enum! {
    ConnectionOrigin { Any, Remote, Site }
}

remote_enum! {
    OperatingSystem { Windows, Macos, Ios, Android, Linux, Embedded }
}

fn default_enabled() -> bool {
    true
}

// ── WAN ─────────────────────────────────────────────────────────────

/// A declared WAN firewall rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WanRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Reference>,
    /// Placement among sibling rules; not echoed by the remote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionAnchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<ConnectionOrigin>,
    #[serde(default, skip_serializing_if = "TriState::is_unset")]
    pub country: TriState<Reference>,
    #[serde(default, skip_serializing_if = "TriState::is_unset")]
    pub device: TriState<Reference>,
    #[serde(default, skip_serializing_if = "TriState::is_unset")]
    pub device_os: TriState<OperatingSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<EndpointCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSpec>,
    pub action: RuleAction,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<Tracking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_period: Option<ActivePeriod>,
    #[serde(default, skip_serializing_if = "ExceptionSet::is_unset")]
    pub exceptions: ExceptionSet<WanException>,
}

impl WanRule {
    /// A rule with only the required fields set.
    pub fn new(name: impl Into<String>, action: RuleAction, direction: Direction) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            section: None,
            position: None,
            source: None,
            connection_origin: None,
            country: TriState::Unset,
            device: TriState::Unset,
            device_os: TriState::Unset,
            device_attributes: None,
            destination: None,
            application: None,
            service: None,
            action,
            direction,
            tracking: None,
            schedule: None,
            active_period: None,
            exceptions: ExceptionSet::unset(),
        }
    }
}

// ── Internet ────────────────────────────────────────────────────────

/// A declared Internet firewall rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InternetRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionAnchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<ConnectionOrigin>,
    #[serde(default, skip_serializing_if = "TriState::is_unset")]
    pub country: TriState<Reference>,
    #[serde(default, skip_serializing_if = "TriState::is_unset")]
    pub device: TriState<Reference>,
    #[serde(default, skip_serializing_if = "TriState::is_unset")]
    pub device_os: TriState<OperatingSystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<InternetDestination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSpec>,
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<Tracking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_period: Option<ActivePeriod>,
    #[serde(default, skip_serializing_if = "ExceptionSet::is_unset")]
    pub exceptions: ExceptionSet<InternetException>,
}

impl InternetRule {
    pub fn new(name: impl Into<String>, action: RuleAction) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: true,
            section: None,
            position: None,
            source: None,
            connection_origin: None,
            country: TriState::Unset,
            device: TriState::Unset,
            device_os: TriState::Unset,
            device_attributes: None,
            destination: None,
            service: None,
            action,
            tracking: None,
            schedule: None,
            active_period: None,
            exceptions: ExceptionSet::unset(),
        }
    }
}

// ── Drift ───────────────────────────────────────────────────────────
//
// Position is not a field: it is checked against the live rule order.

impl Converge for WanRule {
    fn drift(&self, observed: &Self, _path: &str, out: &mut Vec<FieldDrift>) {
        drift::scalar(&self.name, &observed.name, "name", out);
        drift::optional(&self.description, &observed.description, "description", out);
        drift::scalar(&self.enabled, &observed.enabled, "enabled", out);
        drift::optional(&self.section, &observed.section, "section", out);
        self.source.drift(&observed.source, "source", out);
        drift::optional(
            &self.connection_origin,
            &observed.connection_origin,
            "connection_origin",
            out,
        );
        self.country.drift(&observed.country, "country", out);
        self.device.drift(&observed.device, "device", out);
        self.device_os.drift(&observed.device_os, "device_os", out);
        self.device_attributes
            .drift(&observed.device_attributes, "device_attributes", out);
        self.destination.drift(&observed.destination, "destination", out);
        self.application.drift(&observed.application, "application", out);
        self.service.drift(&observed.service, "service", out);
        drift::scalar(&self.action, &observed.action, "action", out);
        drift::scalar(&self.direction, &observed.direction, "direction", out);
        self.tracking.drift(&observed.tracking, "tracking", out);
        self.schedule.drift(&observed.schedule, "schedule", out);
        self.active_period
            .drift(&observed.active_period, "active_period", out);
        self.exceptions.drift(&observed.exceptions, "exceptions", out);
    }

    fn resets(&self, observed: &Self, _path: &str, out: &mut Vec<FieldDrift>) {
        drift::text_resets(
            self.description.as_deref(),
            observed.description.as_deref(),
            "description",
            out,
        );
        self.source.resets(&observed.source, "source", out);
        self.country.resets(&observed.country, "country", out);
        self.device.resets(&observed.device, "device", out);
        self.device_os.resets(&observed.device_os, "device_os", out);
        self.device_attributes
            .resets(&observed.device_attributes, "device_attributes", out);
        self.destination.resets(&observed.destination, "destination", out);
        self.application.resets(&observed.application, "application", out);
        self.service.resets(&observed.service, "service", out);
        self.tracking.resets(&observed.tracking, "tracking", out);
        self.schedule.resets(&observed.schedule, "schedule", out);
        self.active_period
            .resets(&observed.active_period, "active_period", out);
        self.exceptions.resets(&observed.exceptions, "exceptions", out);
    }
}

impl Converge for InternetRule {
    fn drift(&self, observed: &Self, _path: &str, out: &mut Vec<FieldDrift>) {
        drift::scalar(&self.name, &observed.name, "name", out);
        drift::optional(&self.description, &observed.description, "description", out);
        drift::scalar(&self.enabled, &observed.enabled, "enabled", out);
        drift::optional(&self.section, &observed.section, "section", out);
        self.source.drift(&observed.source, "source", out);
        drift::optional(
            &self.connection_origin,
            &observed.connection_origin,
            "connection_origin",
            out,
        );
        self.country.drift(&observed.country, "country", out);
        self.device.drift(&observed.device, "device", out);
        self.device_os.drift(&observed.device_os, "device_os", out);
        self.device_attributes
            .drift(&observed.device_attributes, "device_attributes", out);
        self.destination.drift(&observed.destination, "destination", out);
        self.service.drift(&observed.service, "service", out);
        drift::scalar(&self.action, &observed.action, "action", out);
        self.tracking.drift(&observed.tracking, "tracking", out);
        self.schedule.drift(&observed.schedule, "schedule", out);
        self.active_period
            .drift(&observed.active_period, "active_period", out);
        self.exceptions.drift(&observed.exceptions, "exceptions", out);
    }

    fn resets(&self, observed: &Self, _path: &str, out: &mut Vec<FieldDrift>) {
        drift::text_resets(
            self.description.as_deref(),
            observed.description.as_deref(),
            "description",
            out,
        );
        self.source.resets(&observed.source, "source", out);
        self.country.resets(&observed.country, "country", out);
        self.device.resets(&observed.device, "device", out);
        self.device_os.resets(&observed.device_os, "device_os", out);
        self.device_attributes
            .resets(&observed.device_attributes, "device_attributes", out);
        self.destination.resets(&observed.destination, "destination", out);
        self.service.resets(&observed.service, "service", out);
        self.tracking.resets(&observed.tracking, "tracking", out);
        self.schedule.resets(&observed.schedule, "schedule", out);
        self.active_period
            .resets(&observed.active_period, "active_period", out);
        self.exceptions.resets(&observed.exceptions, "exceptions", out);
    }
}
