//! Wire types for the remote firewall policy API.
//!
//! Response shapes mirror what the policy query returns. Every collection
//! defaults to empty and every nested object defaults to its zero shape,
//! because the remote API omits fields freely. Input shapes use `Option`
//! for every field that may be left out of a mutation; `None` is never
//! serialized. An explicit `null` reads the same as an omitted field.

pub mod common;
pub mod input;
pub mod internet;
pub mod mutation;
pub mod refs;
pub mod wan;

pub use common::*;
pub use input::*;
pub use internet::*;
pub use mutation::*;
pub use refs::*;
pub use wan::*;

use serde::{Deserialize, Deserializer};

/// Read `null` as the type's default, for response fields that are not `Option`.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
