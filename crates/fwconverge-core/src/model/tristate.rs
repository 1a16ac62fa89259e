// ── Tri-state collections ──
//
// Every optional collection distinguishes "not declared" from "declared
// empty". Collapsing the two either sends a spurious clear to the remote
// or reports drift on every plan, so both directions of the mapping live
// here and nowhere else:
//
// - `encode` turns a declared value into a payload field.
// - `decode` turns a read-back collection into a declared value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A collection field with three states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TriState<T> {
    /// Not part of the declared configuration.
    #[default]
    Unset,
    /// Declared with zero elements.
    Empty,
    /// Declared with at least one element.
    Present(Vec<T>),
}

/// Which remote mutation a payload is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// `addRule`: an omitted field takes the remote default.
    Create,
    /// `updateRule`: an omitted field keeps its previous remote value.
    Update,
}

/// How a zero-length remote collection reads back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Rule-level fields the remote always returns: empty reads as `Empty`.
    Dense,
    /// Exception sub-fields: empty reads as `Unset` unless the operator
    /// declared the field empty.
    Sparse,
}

impl<T> TriState<T> {
    /// `Empty` for a zero-length vector, `Present` otherwise.
    pub fn from_vec(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Present(items)
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_declared_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Declared elements; empty for `Unset` and `Empty`.
    pub fn items(&self) -> &[T] {
        match self {
            Self::Present(items) => items,
            Self::Unset | Self::Empty => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Build the payload field for one mutation.
    ///
    /// `Unset` is left out of a create but sent as an explicit empty list
    /// on update, since the remote only applies fields that are present.
    pub fn encode<U, E>(
        &self,
        mode: PayloadMode,
        mut convert: impl FnMut(&T) -> Result<U, E>,
    ) -> Result<Option<Vec<U>>, E> {
        match (self, mode) {
            (Self::Unset, PayloadMode::Create) => Ok(None),
            (Self::Unset | Self::Empty, _) => Ok(Some(Vec::new())),
            (Self::Present(items), _) => items.iter().map(&mut convert).collect::<Result<_, _>>().map(Some),
        }
    }

    /// Turn a read-back collection into a declared value.
    pub fn decode(items: Vec<T>, prior: Option<&Self>, policy: FieldPolicy) -> Self {
        if !items.is_empty() {
            return Self::Present(items);
        }
        match policy {
            FieldPolicy::Dense => Self::Empty,
            FieldPolicy::Sparse if prior.is_some_and(Self::is_declared_empty) => Self::Empty,
            FieldPolicy::Sparse => Self::Unset,
        }
    }
}

impl<T: PartialEq> TriState<T> {
    /// Reorder read-back elements to follow the declared order.
    ///
    /// Elements the declaration does not mention keep their remote order
    /// and go last.
    pub fn align(mut items: Vec<T>, declared: Option<&Self>) -> Vec<T> {
        let Some(declared) = declared.map(Self::items).filter(|d| !d.is_empty()) else {
            return items;
        };
        items.sort_by_key(|item| {
            declared
                .iter()
                .position(|d| d == item)
                .unwrap_or(usize::MAX)
        });
        items
    }

    /// Multiset equality: same elements, any order.
    pub fn same_elements(&self, other: &Self) -> bool {
        let (a, b) = (self.items(), other.items());
        if a.len() != b.len() {
            return false;
        }
        let mut used = vec![false; b.len()];
        a.iter().all(|x| {
            let hit = b
                .iter()
                .enumerate()
                .find(|(i, y)| !used[*i] && *y == x)
                .map(|(i, _)| i);
            if let Some(i) = hit {
                used[i] = true;
            }
            hit.is_some()
        })
    }
}

// ── Serde ───────────────────────────────────────────────────────────
//
// Missing or null means `Unset`; `[]` means `Empty`. Containers skip
// `Unset` fields with `skip_serializing_if = "TriState::is_unset"`.

impl<T: Serialize> Serialize for TriState<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unset => serializer.serialize_none(),
            Self::Empty => Vec::<T>::new().serialize(serializer),
            Self::Present(items) => items.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TriState<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Vec<T>>::deserialize(deserializer)? {
            None => Self::Unset,
            Some(items) => Self::from_vec(items),
        })
    }
}
