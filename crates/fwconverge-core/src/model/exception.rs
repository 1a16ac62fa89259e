// ── Exception sets ──
//
// Exceptions are unordered on the remote. Two sets are equal when they
// hold the same exceptions in any order; within one exception, ordered
// sub-collections still compare positionally.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::criteria::{ApplicationCriteria, DeviceAttributes, EndpointCriteria, InternetDestination};
use super::reference::Reference;
use super::rule::{ConnectionOrigin, Direction, OperatingSystem};
use super::service::ServiceSpec;
use super::tristate::TriState;
use crate::drift::{self, Converge, FieldDrift};

/// Common surface of WAN and Internet exceptions.
pub trait ExceptionModel: Clone + PartialEq + Serialize + Converge {
    fn name(&self) -> Option<&str>;
}

/// An unordered set of rule exceptions.
#[derive(Debug, Clone)]
pub struct ExceptionSet<E>(pub TriState<E>);

impl<E> Default for ExceptionSet<E> {
    fn default() -> Self {
        Self(TriState::Unset)
    }
}

impl<E> ExceptionSet<E> {
    pub fn unset() -> Self {
        Self(TriState::Unset)
    }

    pub fn from_vec(items: Vec<E>) -> Self {
        Self(TriState::from_vec(items))
    }

    pub fn is_unset(&self) -> bool {
        self.0.is_unset()
    }

    pub fn items(&self) -> &[E] {
        self.0.items()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<E: PartialEq> PartialEq for ExceptionSet<E> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (TriState::Unset, TriState::Unset) | (TriState::Empty, TriState::Empty) => true,
            (TriState::Present(_), TriState::Present(_)) => self.0.same_elements(&other.0),
            _ => false,
        }
    }
}

impl<E: Eq> Eq for ExceptionSet<E> {}

impl<E: ExceptionModel> Converge for ExceptionSet<E> {
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        if self.is_unset() {
            return;
        }
        if !converged_sets(self.items(), observed.items()) {
            out.push(FieldDrift::new(path, &self.0, &observed.0));
        }
    }

    fn resets(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        self.0.resets(&observed.0, path, out);
    }
}

/// Every declared exception converges with a distinct observed one, and
/// nothing is left over.
fn converged_sets<E: ExceptionModel>(declared: &[E], observed: &[E]) -> bool {
    if declared.len() != observed.len() {
        return false;
    }
    let mut used = vec![false; observed.len()];
    declared.iter().all(|d| {
        let hit = observed
            .iter()
            .enumerate()
            .find(|(i, o)| !used[*i] && d.converges_with(o))
            .map(|(i, _)| i);
        if let Some(i) = hit {
            used[i] = true;
        }
        hit.is_some()
    })
}

impl<E: Serialize> Serialize for ExceptionSet<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, E: Deserialize<'de>> Deserialize<'de> for ExceptionSet<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TriState::deserialize(deserializer).map(Self)
    }
}

// ── WAN ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WanException {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointCriteria>,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub device_os: TriState<OperatingSystem>,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub country: TriState<Reference>,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub device: TriState<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<EndpointCriteria>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationCriteria>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<ConnectionOrigin>,
}

impl ExceptionModel for WanException {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Converge for WanException {
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        drift::optional(&self.name, &observed.name, &format!("{path}.name"), out);
        self.source.drift(&observed.source, &format!("{path}.source"), out);
        self.device_os
            .drift(&observed.device_os, &format!("{path}.device_os"), out);
        self.country
            .drift(&observed.country, &format!("{path}.country"), out);
        self.device.drift(&observed.device, &format!("{path}.device"), out);
        self.device_attributes.drift(
            &observed.device_attributes,
            &format!("{path}.device_attributes"),
            out,
        );
        self.destination
            .drift(&observed.destination, &format!("{path}.destination"), out);
        self.application
            .drift(&observed.application, &format!("{path}.application"), out);
        self.service
            .drift(&observed.service, &format!("{path}.service"), out);
        drift::optional(
            &self.direction,
            &observed.direction,
            &format!("{path}.direction"),
            out,
        );
        drift::optional(
            &self.connection_origin,
            &observed.connection_origin,
            &format!("{path}.connection_origin"),
            out,
        );
    }
}

// ── Internet ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InternetException {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EndpointCriteria>,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub device_os: TriState<OperatingSystem>,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub country: TriState<Reference>,
    #[serde(skip_serializing_if = "TriState::is_unset")]
    pub device: TriState<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_attributes: Option<DeviceAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<InternetDestination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_origin: Option<ConnectionOrigin>,
}

impl ExceptionModel for InternetException {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Converge for InternetException {
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        drift::optional(&self.name, &observed.name, &format!("{path}.name"), out);
        self.source.drift(&observed.source, &format!("{path}.source"), out);
        self.device_os
            .drift(&observed.device_os, &format!("{path}.device_os"), out);
        self.country
            .drift(&observed.country, &format!("{path}.country"), out);
        self.device.drift(&observed.device, &format!("{path}.device"), out);
        self.device_attributes.drift(
            &observed.device_attributes,
            &format!("{path}.device_attributes"),
            out,
        );
        self.destination
            .drift(&observed.destination, &format!("{path}.destination"), out);
        self.service
            .drift(&observed.service, &format!("{path}.service"), out);
        drift::optional(
            &self.connection_origin,
            &observed.connection_origin,
            &format!("{path}.connection_origin"),
            out,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn named(name: &str) -> WanException {
        WanException {
            name: Some(name.into()),
            ..WanException::default()
        }
    }

    #[test]
    fn equality_ignores_order() {
        let a = ExceptionSet::from_vec(vec![named("a"), named("b")]);
        let b = ExceptionSet::from_vec(vec![named("b"), named("a")]);
        assert_eq!(a, b);
        assert_ne!(a, ExceptionSet::from_vec(vec![named("a"), named("a")]));
    }

    #[test]
    fn unset_never_drifts() {
        let declared: ExceptionSet<WanException> = ExceptionSet::unset();
        let observed = ExceptionSet::from_vec(vec![named("x")]);
        let mut out = Vec::new();
        declared.drift(&observed, "exceptions", &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn sparse_declaration_converges_with_filled_observation() {
        let declared = WanException {
            name: Some("lab".into()),
            source: Some(EndpointCriteria {
                site: TriState::Present(vec![Reference::by_name("HQ")]),
                ..EndpointCriteria::default()
            }),
            ..WanException::default()
        };
        let observed = WanException {
            destination: Some(EndpointCriteria::default()),
            service: Some(ServiceSpec::default()),
            ..declared.clone()
        };
        assert!(declared.converges_with(&observed));
    }
}
