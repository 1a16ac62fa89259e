// ── Criteria hydrator ──
//
// Turns a remote rule response into the declarative rule model. Problems
// in the remote data never abort hydration: a malformed reference, a
// half-filled range or an unknown enum value is dropped from its slot,
// logged, and reported back as a `HydrationWarning`.

pub(crate) mod criteria;
pub(crate) mod internet;
pub(crate) mod wan;

use std::fmt;
use std::str::FromStr;

use fwconverge_api::types::{NetworkInterfaceRef, ObjectKind, RangeResponse, RemoteObject};
use serde::Serialize;
use tracing::warn;

use crate::config::InterfaceNames;
use crate::model::{FieldPolicy, RangeValue, Reference, TriState};
use crate::resolve;

/// A non-fatal problem found while reading remote state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HydrationWarning {
    /// A referenced object had neither an ID nor a name.
    MalformedReference { field: String, object: String },
    /// A range had only one bound.
    IncompleteRange { field: String },
    /// A value outside the known enumeration.
    UnknownEnumValue { field: String, value: String },
    /// A field the operator controls was not echoed back.
    Drift { field: String, message: String },
}

impl fmt::Display for HydrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedReference { field, object } => {
                write!(f, "{field}: {object} without id or name, ignored")
            }
            Self::IncompleteRange { field } => write!(f, "{field}: range with one bound, ignored"),
            Self::UnknownEnumValue { field, value } => {
                write!(f, "{field}: unknown value {value:?}, ignored")
            }
            Self::Drift { field, message } => write!(f, "{field}: {message}"),
        }
    }
}

/// Hydration context: static lookup tables in, warnings out.
pub struct Hydrator<'a> {
    interfaces: &'a InterfaceNames,
    warnings: Vec<HydrationWarning>,
    quiet: bool,
}

impl<'a> Hydrator<'a> {
    pub fn new(interfaces: &'a InterfaceNames) -> Self {
        Self {
            interfaces,
            warnings: Vec::new(),
            quiet: false,
        }
    }

    /// A scratch hydrator for trial runs; its warnings are neither logged
    /// nor kept.
    pub(crate) fn fork(&self) -> Self {
        Self {
            interfaces: self.interfaces,
            warnings: Vec::new(),
            quiet: true,
        }
    }

    pub fn warnings(&self) -> &[HydrationWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<HydrationWarning> {
        self.warnings
    }

    pub(crate) fn warn(&mut self, warning: HydrationWarning) {
        if !self.quiet {
            warn!(%warning, "hydration");
        }
        self.warnings.push(warning);
    }

    // ── Leaf fields ─────────────────────────────────────────────────

    pub(crate) fn refs<R: RemoteObject>(
        &mut self,
        remote: &[R],
        prior: Option<&TriState<Reference>>,
        policy: FieldPolicy,
        field: &str,
    ) -> TriState<Reference> {
        let declared = prior.map(TriState::items).unwrap_or_default();
        let mut items = Vec::with_capacity(remote.len());
        for object in remote {
            match resolve::extract_preferring(object, declared) {
                Some(reference) => items.push(reference),
                None => self.malformed(field, R::KIND),
            }
        }
        TriState::decode(TriState::align(items, prior), prior, policy)
    }

    /// Network interfaces, with missing names filled from the socket table.
    pub(crate) fn interfaces(
        &mut self,
        remote: &[NetworkInterfaceRef],
        prior: Option<&TriState<Reference>>,
        policy: FieldPolicy,
        field: &str,
    ) -> TriState<Reference> {
        let named: Vec<NetworkInterfaceRef> = remote
            .iter()
            .map(|iface| {
                let has_name = iface.name.as_deref().is_some_and(|n| !n.is_empty());
                let looked_up = match (&iface.socket_model, &iface.interface_id) {
                    (Some(model), Some(port)) if !has_name => self.interfaces.lookup(model, port),
                    _ => None,
                };
                NetworkInterfaceRef {
                    name: looked_up.map(str::to_owned).or_else(|| iface.name.clone()),
                    ..iface.clone()
                }
            })
            .collect();
        self.refs(&named, prior, policy, field)
    }

    pub(crate) fn ranges(
        &mut self,
        remote: &[RangeResponse],
        prior: Option<&TriState<RangeValue>>,
        policy: FieldPolicy,
        field: &str,
    ) -> TriState<RangeValue> {
        let items = remote.iter().filter_map(|r| self.range(r, field)).collect();
        TriState::decode(TriState::align(items, prior), prior, policy)
    }

    pub(crate) fn enums<E: FromStr + PartialEq>(
        &mut self,
        remote: &[String],
        prior: Option<&TriState<E>>,
        policy: FieldPolicy,
        field: &str,
    ) -> TriState<E> {
        let items = remote
            .iter()
            .filter_map(|raw| self.enum_value(raw, field))
            .collect();
        TriState::decode(TriState::align(items, prior), prior, policy)
    }

    /// A single optional reference (rule section).
    pub(crate) fn reference<R: RemoteObject>(
        &mut self,
        remote: Option<&R>,
        prior: Option<&Reference>,
        field: &str,
    ) -> Option<Reference> {
        let object = remote?;
        let declared = prior.map(std::slice::from_ref).unwrap_or_default();
        let reference = resolve::extract_preferring(object, declared);
        if reference.is_none() && (object.id().is_some() || object.name().is_some()) {
            self.malformed(field, R::KIND);
        }
        reference
    }

    /// A range; silent `None` when both bounds are missing.
    pub(crate) fn range(&mut self, remote: &RangeResponse, field: &str) -> Option<RangeValue> {
        let from = remote.from.as_deref().filter(|s| !s.is_empty());
        let to = remote.to.as_deref().filter(|s| !s.is_empty());
        if from.is_none() && to.is_none() {
            return None;
        }
        let range = RangeValue::from_bounds(from, to);
        if range.is_none() {
            self.warn(HydrationWarning::IncompleteRange {
                field: field.to_owned(),
            });
        }
        range
    }

    /// An enum value; silent `None` for an empty string.
    pub(crate) fn enum_value<E: FromStr>(&mut self, raw: &str, field: &str) -> Option<E> {
        if raw.is_empty() {
            return None;
        }
        let parsed = raw.parse().ok();
        if parsed.is_none() {
            self.warn(HydrationWarning::UnknownEnumValue {
                field: field.to_owned(),
                value: raw.to_owned(),
            });
        }
        parsed
    }

    /// A required enum. An unknown remote value keeps the declared one and
    /// is reported as drift, since the remote no longer holds it.
    pub(crate) fn required_enum<E: FromStr + fmt::Display + Copy>(
        &mut self,
        raw: &str,
        prior: Option<E>,
        fallback: E,
        field: &str,
    ) -> E {
        if let Some(value) = self.enum_value(raw, field) {
            return value;
        }
        let Some(declared) = prior else {
            return fallback;
        };
        if !raw.is_empty() {
            self.warn(HydrationWarning::Drift {
                field: field.to_owned(),
                message: format!("remote holds {raw:?}, declared {declared} kept"),
            });
        }
        declared
    }

    fn malformed(&mut self, field: &str, kind: ObjectKind) {
        self.warn(HydrationWarning::MalformedReference {
            field: field.to_owned(),
            object: kind.to_string(),
        });
    }
}

/// Plain string lists (addresses, domains, attributes).
pub(crate) fn strings(
    remote: &[String],
    prior: Option<&TriState<String>>,
    policy: FieldPolicy,
) -> TriState<String> {
    let items = remote.iter().filter(|s| !s.is_empty()).cloned().collect();
    TriState::decode(TriState::align(items, prior), prior, policy)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::OperatingSystem;
    use fwconverge_api::types::SiteRef;

    #[test]
    fn empty_remote_collection_is_empty_not_unset() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let sites: Vec<SiteRef> = Vec::new();
        let decoded = h.refs(&sites, Some(&TriState::Unset), FieldPolicy::Dense, "source.site");
        assert_eq!(decoded, TriState::Empty);
    }

    #[test]
    fn malformed_reference_is_dropped_with_warning() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let sites = vec![SiteRef::default(), SiteRef::new("1", "HQ")];
        let decoded = h.refs(&sites, None, FieldPolicy::Dense, "source.site");
        assert_eq!(decoded, TriState::Present(vec![Reference::by_id("1")]));
        assert_eq!(
            h.warnings(),
            &[HydrationWarning::MalformedReference {
                field: "source.site".into(),
                object: "Site".into()
            }]
        );
    }

    #[test]
    fn only_malformed_references_read_as_empty() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let decoded = h.refs(&[SiteRef::default()], None, FieldPolicy::Dense, "source.site");
        assert_eq!(decoded, TriState::Empty);
    }

    #[test]
    fn interface_names_come_from_the_socket_table() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let remote = vec![NetworkInterfaceRef {
            socket_model: Some("X1500".into()),
            interface_id: Some("INT_2".into()),
            ..NetworkInterfaceRef::default()
        }];
        let declared = TriState::Present(vec![Reference::by_name("WAN 2")]);
        let decoded = h.interfaces(&remote, Some(&declared), FieldPolicy::Dense, "f");
        assert_eq!(decoded, declared);
    }

    #[test]
    fn unknown_enum_values_are_reported() {
        let names = InterfaceNames::default();
        let mut h = Hydrator::new(&names);
        let decoded: TriState<OperatingSystem> = h.enums(
            &["WINDOWS".into(), "BEOS".into()],
            None,
            FieldPolicy::Dense,
            "device_os",
        );
        assert_eq!(decoded, TriState::Present(vec![OperatingSystem::Windows]));
        assert_eq!(h.warnings().len(), 1);
    }

    #[test]
    fn forked_hydrator_keeps_its_own_warnings() {
        let names = InterfaceNames::default();
        let h = Hydrator::new(&names);
        let mut trial = h.fork();
        trial.range(&RangeResponse { from: Some("1".into()), to: None }, "f");
        assert_eq!(trial.warnings().len(), 1);
        assert!(h.warnings().is_empty());
    }
}
