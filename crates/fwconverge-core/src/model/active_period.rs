// ── Active period ──
//
// `use_effective_from` / `use_expires_at` are derived: each is true
// exactly when its timestamp is set. They are recomputed on every
// construction and never taken from the remote or from a declaration.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::drift::{Converge, FieldDrift};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ActivePeriodRepr", into = "ActivePeriodRepr")]
pub struct ActivePeriod {
    effective_from: Option<String>,
    expires_at: Option<String>,
    use_effective_from: bool,
    use_expires_at: bool,
}

impl ActivePeriod {
    pub fn new(effective_from: Option<String>, expires_at: Option<String>) -> Self {
        let effective_from = effective_from.filter(|s| !s.is_empty());
        let expires_at = expires_at.filter(|s| !s.is_empty());
        Self {
            use_effective_from: effective_from.is_some(),
            use_expires_at: expires_at.is_some(),
            effective_from,
            expires_at,
        }
    }

    pub fn effective_from(&self) -> Option<&str> {
        self.effective_from.as_deref()
    }

    pub fn expires_at(&self) -> Option<&str> {
        self.expires_at.as_deref()
    }

    pub fn use_effective_from(&self) -> bool {
        self.use_effective_from
    }

    pub fn use_expires_at(&self) -> bool {
        self.use_expires_at
    }

    pub fn is_unbounded(&self) -> bool {
        self.effective_from.is_none() && self.expires_at.is_none()
    }
}

/// Whether two timestamp strings denote the same instant.
///
/// Accepts RFC 3339 and the zone-less `YYYY-MM-DDTHH:MM:SS` form (read as
/// UTC). Unparseable input only matches itself.
pub fn same_instant(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (parse_instant(a), parse_instant(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

pub(crate) fn parse_instant(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_nanos_opt();
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| naive.and_utc().timestamp_nanos_opt())
}

// ── Serialized form ─────────────────────────────────────────────────

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct ActivePeriodRepr {
    #[serde(skip_serializing_if = "Option::is_none")]
    effective_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
    // Accepted for symmetry with the serialized form, then recomputed.
    use_effective_from: bool,
    use_expires_at: bool,
}

impl From<ActivePeriodRepr> for ActivePeriod {
    fn from(repr: ActivePeriodRepr) -> Self {
        Self::new(repr.effective_from, repr.expires_at)
    }
}

impl From<ActivePeriod> for ActivePeriodRepr {
    fn from(period: ActivePeriod) -> Self {
        Self {
            use_effective_from: period.use_effective_from,
            use_expires_at: period.use_expires_at,
            effective_from: period.effective_from,
            expires_at: period.expires_at,
        }
    }
}

/// Timestamps converge when they denote the same instant.
impl Converge for ActivePeriod {
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        let pairs = [
            ("effective_from", self.effective_from(), observed.effective_from()),
            ("expires_at", self.expires_at(), observed.expires_at()),
        ];
        for (field, declared, seen) in pairs {
            let converged = match (declared, seen) {
                (None, None) => true,
                (Some(a), Some(b)) => same_instant(a, b),
                _ => false,
            };
            if !converged {
                out.push(FieldDrift::new(&format!("{path}.{field}"), &declared, &seen));
            }
        }
    }
}
