// ── Payload builder ──
//
// Declared rule to mutation input. Validation runs while the payload is
// assembled and never stops at the first problem: every bad address,
// port, range or reference is collected so the operator sees all of them
// in one pass. Nothing is sent when anything was rejected.

mod criteria;
pub(crate) mod internet;
pub(crate) mod wan;

use std::fmt::Display;
use std::net::IpAddr;

use fwconverge_api::types::{ObjectRefInput, RangeInput};

use crate::error::{CoreError, ErrorEntry};
use crate::model::{PayloadMode, RangeValue, Reference, TriState};
use crate::resolve;

/// Accumulates validation problems while one payload is built.
pub(crate) struct Builder {
    mode: PayloadMode,
    invalid_refs: Vec<(String, String)>,
    entries: Vec<ErrorEntry>,
}

impl Builder {
    pub(crate) fn new(mode: PayloadMode) -> Self {
        Self {
            mode,
            invalid_refs: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn mode(&self) -> PayloadMode {
        self.mode
    }

    /// Run `build` under another mode. Exceptions are always encoded for
    /// creation: the whole list replaces the remote one.
    pub(crate) fn with_mode<R>(&mut self, mode: PayloadMode, build: impl FnOnce(&mut Self) -> R) -> R {
        let outer = std::mem::replace(&mut self.mode, mode);
        let built = build(self);
        self.mode = outer;
        built
    }

    pub(crate) fn reject(&mut self, code: &str, field: &str, message: impl Display) {
        self.entries
            .push(ErrorEntry::new(code, format!("{field}: {message}")));
    }

    /// A single invalid reference surfaces as `InvalidReference`; several
    /// problems of any kind surface together as `Validation`.
    pub(crate) fn finish<T>(self, value: T) -> Result<T, CoreError> {
        match (self.invalid_refs.len(), self.entries.is_empty()) {
            (0, true) => Ok(value),
            (1, true) => {
                let (field, reason) = self.invalid_refs.into_iter().next().unwrap_or_default();
                Err(CoreError::InvalidReference { field, reason })
            }
            _ => {
                let mut entries: Vec<ErrorEntry> = self
                    .invalid_refs
                    .into_iter()
                    .map(|(field, reason)| {
                        ErrorEntry::new("INVALID_REFERENCE", format!("{field}: {reason}"))
                    })
                    .collect();
                entries.extend(self.entries);
                Err(CoreError::Validation { entries })
            }
        }
    }

    // ── Collections ─────────────────────────────────────────────────

    /// Encode a collection the way `TriState::encode` does, validating
    /// each element on the way. Rejected elements are dropped.
    fn collect<T, U>(
        &mut self,
        value: &TriState<T>,
        mut convert: impl FnMut(&mut Self, &T) -> Option<U>,
    ) -> Option<Vec<U>> {
        if value.is_unset() && self.mode == PayloadMode::Create {
            return None;
        }
        Some(
            value
                .items()
                .iter()
                .filter_map(|item| convert(self, item))
                .collect(),
        )
    }

    pub(crate) fn refs(
        &mut self,
        value: &TriState<Reference>,
        field: &str,
    ) -> Option<Vec<ObjectRefInput>> {
        self.collect(value, |b, reference| b.reference(reference, field))
    }

    pub(crate) fn reference(&mut self, reference: &Reference, field: &str) -> Option<ObjectRefInput> {
        match resolve::resolve(reference, field) {
            Ok(input) => Some(input),
            Err(CoreError::InvalidReference { field, reason }) => {
                self.invalid_refs.push((field, reason));
                None
            }
            Err(other) => {
                self.reject("INVALID_REFERENCE", field, other);
                None
            }
        }
    }

    /// Free-form strings (domains, FQDNs, device attributes, ASNs).
    pub(crate) fn strings(&mut self, value: &TriState<String>) -> Option<Vec<String>> {
        let Ok(encoded) = value.encode(self.mode, |s| Ok::<_, std::convert::Infallible>(s.clone()));
        encoded
    }

    pub(crate) fn enums<E: Display>(&mut self, value: &TriState<E>) -> Option<Vec<String>> {
        let Ok(encoded) = value.encode(self.mode, |e| Ok::<_, std::convert::Infallible>(e.to_string()));
        encoded
    }

    pub(crate) fn ips(&mut self, value: &TriState<String>, field: &str) -> Option<Vec<String>> {
        self.collect(value, |b, raw| {
            if raw.trim().parse::<IpAddr>().is_ok() {
                Some(raw.trim().to_owned())
            } else {
                b.reject("INVALID_IP", field, format_args!("{raw:?} is not an IP address"));
                None
            }
        })
    }

    pub(crate) fn subnets(&mut self, value: &TriState<String>, field: &str) -> Option<Vec<String>> {
        self.collect(value, |b, raw| {
            if is_subnet(raw.trim()) {
                Some(raw.trim().to_owned())
            } else {
                b.reject("INVALID_SUBNET", field, format_args!("{raw:?} is not a CIDR subnet"));
                None
            }
        })
    }

    pub(crate) fn ip_ranges(&mut self, value: &TriState<RangeValue>, field: &str) -> Option<Vec<RangeInput>> {
        self.collect(value, |b, range| b.ip_range(range, field))
    }

    fn ip_range(&mut self, range: &RangeValue, field: &str) -> Option<RangeInput> {
        let bounds = (
            range.from.trim().parse::<IpAddr>(),
            range.to.trim().parse::<IpAddr>(),
        );
        let valid = match bounds {
            (Ok(IpAddr::V4(from)), Ok(IpAddr::V4(to))) => from <= to,
            (Ok(IpAddr::V6(from)), Ok(IpAddr::V6(to))) => from <= to,
            _ => false,
        };
        if !valid {
            self.reject("INVALID_RANGE", field, format_args!("{range} is not an address range"));
            return None;
        }
        Some(range_input(range))
    }

    // ── Ports ───────────────────────────────────────────────────────

    pub(crate) fn ports(&mut self, ports: &[String], field: &str) -> Vec<String> {
        ports
            .iter()
            .filter_map(|raw| {
                if parse_port(raw).is_some() {
                    Some(raw.trim().to_owned())
                } else {
                    self.reject("INVALID_PORT", field, format_args!("{raw:?} is not a port"));
                    None
                }
            })
            .collect()
    }

    pub(crate) fn port_range(&mut self, range: &RangeValue, field: &str) -> Option<RangeInput> {
        match (parse_port(&range.from), parse_port(&range.to)) {
            (Some(from), Some(to)) if from <= to => Some(range_input(range)),
            _ => {
                self.reject("INVALID_PORT", field, format_args!("{range} is not a port range"));
                None
            }
        }
    }
}

pub(crate) fn range_input(range: &RangeValue) -> RangeInput {
    RangeInput {
        from: range.from.trim().to_owned(),
        to: range.to.trim().to_owned(),
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

fn is_subnet(raw: &str) -> bool {
    let Some((addr, prefix)) = raw.split_once('/') else {
        return false;
    };
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V4(_)) => prefix <= 32,
        Ok(IpAddr::V6(_)) => prefix <= 128,
        Err(_) => false,
    }
}
