// ── Reference resolver ──
//
// Declared references go out as the remote's `{ by, input }` union; remote
// objects come back as `{ id, name }` and are read through the typed
// `RemoteObject` accessors, one impl per object kind.

use fwconverge_api::types::{ObjectRefBy, ObjectRefInput, RemoteObject};

use crate::error::CoreError;
use crate::model::{RefMode, Reference};

/// Declared reference to remote input. Rejects an empty value.
pub fn resolve(reference: &Reference, field: &str) -> Result<ObjectRefInput, CoreError> {
    if reference.value.trim().is_empty() {
        return Err(CoreError::InvalidReference {
            field: field.to_owned(),
            reason: format!("empty {} reference", reference.mode),
        });
    }
    let by = match reference.mode {
        RefMode::ById => ObjectRefBy::Id,
        RefMode::ByName => ObjectRefBy::Name,
    };
    Ok(ObjectRefInput {
        by,
        input: reference.value.clone(),
    })
}

/// Remote object to reference, preferring the ID.
///
/// `None` when neither identity field is populated; the caller treats the
/// slot as absent.
pub fn extract<R: RemoteObject + ?Sized>(object: &R) -> Option<Reference> {
    if let Some(id) = non_empty(object.id()) {
        return Some(Reference::by_id(id));
    }
    non_empty(object.name()).map(Reference::by_name)
}

/// Like [`extract`], but keeps the mode the operator declared when the
/// object is one of `declared`.
pub fn extract_preferring<R: RemoteObject + ?Sized>(
    object: &R,
    declared: &[Reference],
) -> Option<Reference> {
    let (id, name) = (non_empty(object.id()), non_empty(object.name()));
    declared
        .iter()
        .find(|candidate| candidate.designates(id, name))
        .cloned()
        .or_else(|| extract(object))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
