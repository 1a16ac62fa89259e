// ── Drift evaluation ──
//
// Compares a declared rule with what the remote reports and decides what
// the next convergence step has to do.
//
// - Declared `Unset` fields are computed by the remote: any observed
//   value converges.
// - `Empty` converges with `Empty`; an observed `Unset` counts as empty.
// - `Present` converges with the same elements. Unordered collections
//   compare as multisets, ordered ones positionally.
//
// An update rewrites undeclared fields with their cleared value, so once a
// rule drifts the plan also lists every observed value the update resets.

use serde::Serialize;

use crate::model::TriState;

/// One field whose observed value does not match the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDrift {
    pub path: String,
    pub declared: String,
    pub observed: String,
}

impl FieldDrift {
    pub fn new<D: Serialize + ?Sized, O: Serialize + ?Sized>(
        path: &str,
        declared: &D,
        observed: &O,
    ) -> Self {
        Self {
            path: path.to_owned(),
            declared: render(declared),
            observed: render(observed),
        }
    }
}

fn render<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<unrenderable>".into())
}

/// Field-by-field convergence check.
pub trait Converge {
    /// Append every drifting field under `path` to `out`.
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>);

    /// Append every observed value an update would clear because it is
    /// not declared.
    fn resets(&self, _observed: &Self, _path: &str, _out: &mut Vec<FieldDrift>) {}

    fn converges_with(&self, observed: &Self) -> bool {
        let mut out = Vec::new();
        self.drift(observed, "", &mut out);
        out.is_empty()
    }
}

/// Unordered collections.
impl<T: PartialEq + Serialize> Converge for TriState<T> {
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        let converged = match self {
            TriState::Unset => true,
            TriState::Empty => observed.is_empty(),
            TriState::Present(_) => self.same_elements(observed),
        };
        if !converged {
            out.push(FieldDrift::new(path, self, observed));
        }
    }

    fn resets(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        if self.is_unset() && !observed.is_empty() {
            out.push(FieldDrift::new(path, &TriState::<T>::Empty, observed));
        }
    }
}

/// Optional groups: a declared `None` is computed; an observed `None`
/// reads as a group with nothing in it.
impl<G: Converge + Default> Converge for Option<G> {
    fn drift(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        let Some(declared) = self else {
            return;
        };
        match observed {
            Some(observed) => declared.drift(observed, path, out),
            None => declared.drift(&G::default(), path, out),
        }
    }

    /// An undeclared group goes out as its default.
    fn resets(&self, observed: &Self, path: &str, out: &mut Vec<FieldDrift>) {
        let Some(observed) = observed else {
            return;
        };
        match self {
            Some(declared) => declared.resets(observed, path, out),
            None => {
                let baseline = G::default();
                baseline.drift(observed, path, out);
                baseline.resets(observed, path, out);
            }
        }
    }
}

/// Optional text an update sends as `""` when undeclared.
pub fn text_resets(
    declared: Option<&str>,
    observed: Option<&str>,
    path: &str,
    out: &mut Vec<FieldDrift>,
) {
    if declared.is_none() && observed.is_some_and(|seen| !seen.is_empty()) {
        out.push(FieldDrift::new(path, "", &observed));
    }
}

/// Ordered collections compare positionally.
pub fn ordered<T: PartialEq + Serialize>(
    declared: &TriState<T>,
    observed: &TriState<T>,
    path: &str,
    out: &mut Vec<FieldDrift>,
) {
    if declared.is_unset() {
        return;
    }
    if declared.items() != observed.items() {
        out.push(FieldDrift::new(path, declared, observed));
    }
}

pub fn scalar<T: PartialEq + Serialize + ?Sized>(
    declared: &T,
    observed: &T,
    path: &str,
    out: &mut Vec<FieldDrift>,
) {
    if declared != observed {
        out.push(FieldDrift::new(path, declared, observed));
    }
}

/// Optional scalars: `None` declared is computed.
pub fn optional<T: PartialEq + Serialize>(
    declared: &Option<T>,
    observed: &Option<T>,
    path: &str,
    out: &mut Vec<FieldDrift>,
) {
    if declared.is_some() && declared != observed {
        out.push(FieldDrift::new(path, declared, observed));
    }
}

// ── Plan ────────────────────────────────────────────────────────────

/// What the next convergence step has to do for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Plan {
    /// No remote rule exists yet.
    Create,
    /// Fields and position both converge.
    NoOp,
    /// Fields drift; position is fine.
    Update { drift: Vec<FieldDrift> },
    /// Only the position is off.
    Move,
    /// Both fields and position are off.
    UpdateAndMove { drift: Vec<FieldDrift> },
}

impl Plan {
    pub fn from_parts(drift: Vec<FieldDrift>, position_converged: bool) -> Self {
        match (drift.is_empty(), position_converged) {
            (true, true) => Self::NoOp,
            (true, false) => Self::Move,
            (false, true) => Self::Update { drift },
            (false, false) => Self::UpdateAndMove { drift },
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    pub fn drift(&self) -> &[FieldDrift] {
        match self {
            Self::Update { drift } | Self::UpdateAndMove { drift } => drift,
            Self::Create | Self::NoOp | Self::Move => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::NoOp => "no-op",
            Self::Update { .. } => "update",
            Self::Move => "move",
            Self::UpdateAndMove { .. } => "update+move",
        }
    }
}
