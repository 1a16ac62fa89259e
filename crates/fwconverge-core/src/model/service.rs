use serde::{Deserialize, Serialize};

use super::range::RangeValue;
use super::reference::Reference;
use super::tristate::TriState;
use crate::drift::{self, Converge, FieldDrift};

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
pub enum Protocol {
    Tcp,
    Udp,
    TcpUdp,
    Icmp,
}

/// Service match: predefined services by reference plus custom
/// port/protocol entries. Custom entries and their port lists are ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceSpec {
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub standard: TriState<Reference>,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub custom: TriState<CustomService>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_range: Option<RangeValue>,
    pub protocol: Protocol,
}

impl ServiceSpec {
    pub fn is_blank(&self) -> bool {
        self.standard.is_unset() && self.custom.is_unset()
    }
}

impl Converge for ServiceSpec {
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        self.standard
            .drift(&observed.standard, &format!("{path}.standard"), out);
        drift::ordered(&self.custom, &observed.custom, &format!("{path}.custom"), out);
    }

    fn resets(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        self.standard
            .resets(&observed.standard, &format!("{path}.standard"), out);
        self.custom
            .resets(&observed.custom, &format!("{path}.custom"), out);
    }
}
