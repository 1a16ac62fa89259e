use serde::{Deserialize, Serialize};

/// `{ from, to }`: an IP range, a port range, or a time-of-day window.
///
/// Both bounds are always present together; a half-filled remote range is
/// dropped at hydration instead of becoming a `RangeValue`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeValue {
    pub from: String,
    pub to: String,
}

impl RangeValue {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Build from two optional bounds; `None` unless both are non-empty.
    pub fn from_bounds(from: Option<&str>, to: Option<&str>) -> Option<Self> {
        match (from, to) {
            (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => {
                Some(Self::new(from, to))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for RangeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_ranges_are_absent() {
        assert_eq!(RangeValue::from_bounds(Some("1"), None), None);
        assert_eq!(RangeValue::from_bounds(Some(""), Some("2")), None);
        assert_eq!(
            RangeValue::from_bounds(Some("1"), Some("2")),
            Some(RangeValue::new("1", "2"))
        );
    }
}
