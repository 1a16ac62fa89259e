// ── Named-and-identified remote objects ──
//
// The policy API returns a few dozen structurally distinct reference
// shapes (hosts, sites, users, applications, services, ...). Each gets its
// own type so the hydrator can name the kind in diagnostics, and each
// exposes `id` / `name` through `RemoteObject`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Read access to the identity fields of a remote object.
pub trait RemoteObject {
    const KIND: ObjectKind;

    /// Stable identifier, if the remote populated one.
    fn id(&self) -> Option<&str>;

    /// Display name, if the remote populated one.
    fn name(&self) -> Option<&str>;
}

macro_rules! remote_refs {
    ($($(#[$meta:meta])* $ty:ident => $kind:ident),+ $(,)?) => {
        /// Every remote object kind that resolves to a reference.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ObjectKind {
            $($kind,)+
            NetworkInterface,
        }

        impl ObjectKind {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$kind => stringify!($kind),)+
                    Self::NetworkInterface => "NetworkInterface",
                }
            }
        }

        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
            pub struct $ty {
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub id: Option<String>,
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub name: Option<String>,
            }

            impl $ty {
                pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
                    Self {
                        id: Some(id.into()),
                        name: Some(name.into()),
                    }
                }
            }

            impl RemoteObject for $ty {
                const KIND: ObjectKind = ObjectKind::$kind;

                fn id(&self) -> Option<&str> {
                    self.id.as_deref()
                }

                fn name(&self) -> Option<&str> {
                    self.name.as_deref()
                }
            }
        )+
    };
}

remote_refs! {
    // Endpoint criteria
    HostRef => Host,
    SiteRef => Site,
    GlobalIpRangeRef => GlobalIpRange,
    SiteNetworkSubnetRef => SiteNetworkSubnet,
    FloatingSubnetRef => FloatingSubnet,
    UserRef => User,
    UsersGroupRef => UsersGroup,
    GroupRef => Group,
    SystemGroupRef => SystemGroup,
    // Application criteria
    ApplicationRef => Application,
    CustomApplicationRef => CustomApplication,
    ApplicationCategoryRef => ApplicationCategory,
    CustomCategoryRef => CustomCategory,
    SanctionedAppsCategoryRef => SanctionedAppsCategory,
    // Rule-level criteria
    CountryRef => Country,
    DeviceProfileRef => DeviceProfile,
    ServiceRef => Service,
    // Tracking targets
    SubscriptionGroupRef => SubscriptionGroup,
    WebhookRef => Webhook,
    MailingListRef => MailingList,
    // Ordering
    PolicySectionRef => PolicySection,
    PolicyRuleRef => PolicyRule,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A socket network interface.
///
/// Unlike the other kinds, the remote sometimes returns an interface with
/// only the socket model and port identifier filled in; the display name
/// then has to be looked up from a model table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_id: Option<String>,
}

impl NetworkInterfaceRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl RemoteObject for NetworkInterfaceRef {
    const KIND: ObjectKind = ObjectKind::NetworkInterface;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

// ── Input side ──────────────────────────────────────────────────────

/// Discriminator for [`ObjectRefInput`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectRefBy {
    Id,
    Name,
}

/// The remote API's discriminated-union reference input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRefInput {
    pub by: ObjectRefBy,
    pub input: String,
}

impl ObjectRefInput {
    pub fn id(value: impl Into<String>) -> Self {
        Self {
            by: ObjectRefBy::Id,
            input: value.into(),
        }
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self {
            by: ObjectRefBy::Name,
            input: value.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_identity_fields_deserialize_as_none() {
        let host: HostRef = serde_json::from_str(r#"{"name":"db-1"}"#).unwrap();
        assert_eq!(host.id(), None);
        assert_eq!(host.name(), Some("db-1"));
        assert_eq!(HostRef::KIND, ObjectKind::Host);
    }

    #[test]
    fn ref_input_uses_screaming_discriminator() {
        let json = serde_json::to_value(ObjectRefInput::name("HQ")).unwrap();
        assert_eq!(json, serde_json::json!({"by": "NAME", "input": "HQ"}));
    }

    #[test]
    fn interface_ref_reads_socket_fields() {
        let iface: NetworkInterfaceRef =
            serde_json::from_str(r#"{"id":"77","socketModel":"X1500","interfaceId":"LAN1"}"#)
                .unwrap();
        assert_eq!(iface.socket_model.as_deref(), Some("X1500"));
        assert_eq!(iface.interface_id.as_deref(), Some("LAN1"));
        assert_eq!(iface.name(), None);
    }
}
