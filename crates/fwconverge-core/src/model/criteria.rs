// ── Criteria groups ──
//
// Source, destination and application are bundles of optional tri-state
// fields. A group with no declared field is written as an absent group
// (`None` on the rule), never as an object of unset fields.

use serde::{Deserialize, Serialize};

use super::range::RangeValue;
use super::reference::Reference;
use super::tristate::TriState;
use crate::drift::{Converge, FieldDrift};

macro_rules! criteria_group {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$fmeta:meta])* $field:ident: $ty:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                #[serde(skip_serializing_if = "TriState::is_unset")]
                pub $field: TriState<$ty>,
            )+
        }

        impl $name {
            /// No field is declared.
            pub fn is_blank(&self) -> bool {
                $(self.$field.is_unset())&&+
            }

            /// No field holds an element.
            pub fn has_no_elements(&self) -> bool {
                $(self.$field.is_empty())&&+
            }
        }

        impl Converge for $name {
            fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
                $(
                    self.$field.drift(
                        &observed.$field,
                        &format!("{path}.{}", stringify!($field)),
                        out,
                    );
                )+
            }

            fn resets(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
                $(
                    self.$field.resets(
                        &observed.$field,
                        &format!("{path}.{}", stringify!($field)),
                        out,
                    );
                )+
            }
        }
    };
}

criteria_group! {
    /// Who or what the traffic comes from (and, on WAN rules, goes to).
    EndpointCriteria {
        host: Reference,
        site: Reference,
        subnet: String,
        ip: String,
        ip_range: RangeValue,
        global_ip_range: Reference,
        network_interface: Reference,
        site_network_subnet: Reference,
        floating_subnet: Reference,
        user: Reference,
        users_group: Reference,
        group: Reference,
        system_group: Reference,
    }
}

criteria_group! {
    /// Application match on WAN rules.
    ApplicationCriteria {
        application: Reference,
        custom_app: Reference,
        app_category: Reference,
        custom_category: Reference,
        sanctioned_apps_category: Reference,
        domain: String,
        fqdn: String,
        ip: String,
        subnet: String,
        ip_range: RangeValue,
        global_ip_range: Reference,
    }
}

criteria_group! {
    /// Destination of Internet rules: applications, categories, domains,
    /// addresses, countries and remote ASNs.
    InternetDestination {
        application: Reference,
        custom_app: Reference,
        app_category: Reference,
        custom_category: Reference,
        sanctioned_apps_category: Reference,
        country: Reference,
        domain: String,
        fqdn: String,
        ip: String,
        subnet: String,
        ip_range: RangeValue,
        global_ip_range: Reference,
        remote_asn: String,
    }
}

criteria_group! {
    /// Device posture attributes.
    DeviceAttributes {
        category: String,
        device_type: String,
        model: String,
        manufacturer: String,
        os: String,
        os_version: String,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sparse_declaration_round_trips() {
        let raw = json!({ "ip": ["10.0.0.1"], "site": [{ "name": "HQ" }], "host": [] });
        let source: EndpointCriteria = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(source.site, TriState::Present(vec![Reference::by_name("HQ")]));
        assert!(source.host.is_declared_empty());
        assert!(source.user.is_unset());
        assert_eq!(serde_json::to_value(&source).unwrap(), raw);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = json!({ "ips": ["10.0.0.1"] });
        assert!(serde_json::from_value::<EndpointCriteria>(raw).is_err());
    }

    #[test]
    fn blank_versus_no_elements() {
        let mut group = EndpointCriteria::default();
        assert!(group.is_blank());
        group.ip = TriState::Empty;
        assert!(!group.is_blank());
        assert!(group.has_no_elements());
    }
}
