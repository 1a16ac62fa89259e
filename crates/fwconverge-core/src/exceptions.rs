// ── Exception reconciliation ──
//
// Exceptions carry no remote identity, so read-back entries are paired
// with declared ones before hydration. A name that is unique on both
// sides pairs directly. Whatever is left is paired by trial: hydrate the
// remote entry against each unclaimed declaration and keep the first one
// it converges with. Paired entries come back in declared order, the
// rest in remote order after them.

use fwconverge_api::types::{InternetExceptionResponse, WanExceptionResponse};
use tracing::trace;

use crate::drift::Converge;
use crate::hydrate::Hydrator;
use crate::model::{ExceptionModel, ExceptionSet, FieldPolicy, TriState};

/// The part of a remote exception the reconciler looks at.
pub(crate) trait RemoteException {
    fn name(&self) -> Option<&str>;
}

impl RemoteException for WanExceptionResponse {
    fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

impl RemoteException for InternetExceptionResponse {
    fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

pub(crate) fn reconcile<'a, R, E, F>(
    h: &mut Hydrator<'a>,
    prior: Option<&ExceptionSet<E>>,
    remote: &[R],
    hydrate: F,
) -> ExceptionSet<E>
where
    R: RemoteException,
    E: ExceptionModel,
    F: Fn(&mut Hydrator<'a>, &R, Option<&E>) -> E,
{
    let declared = prior.map(ExceptionSet::items).unwrap_or_default();
    let mut pairing: Vec<Option<usize>> = vec![None; remote.len()];
    let mut claimed = vec![false; declared.len()];

    // Unique names first.
    for (ri, entry) in remote.iter().enumerate() {
        let Some(name) = entry.name() else { continue };
        if remote.iter().filter(|r| r.name() == Some(name)).count() != 1 {
            continue;
        }
        let mut hits = declared
            .iter()
            .enumerate()
            .filter(|(_, d)| d.name() == Some(name));
        if let (Some((di, _)), None) = (hits.next(), hits.next()) {
            pairing[ri] = Some(di);
            claimed[di] = true;
        }
    }

    // Then content.
    for (ri, entry) in remote.iter().enumerate() {
        if pairing[ri].is_some() {
            continue;
        }
        for (di, candidate) in declared.iter().enumerate() {
            if claimed[di] {
                continue;
            }
            let mut scratch = h.fork();
            let trial = hydrate(&mut scratch, entry, Some(candidate));
            if candidate.converges_with(&trial) {
                trace!(remote = ri, declared = di, "exception paired by content");
                pairing[ri] = Some(di);
                claimed[di] = true;
                break;
            }
        }
    }

    let mut hydrated: Vec<(usize, E)> = remote
        .iter()
        .zip(pairing)
        .map(|(entry, paired)| {
            let prior = paired.map(|di| &declared[di]);
            (paired.unwrap_or(usize::MAX), hydrate(h, entry, prior))
        })
        .collect();
    hydrated.sort_by_key(|(order, _)| *order);

    let items = hydrated.into_iter().map(|(_, e)| e).collect();
    ExceptionSet(TriState::decode(
        items,
        prior.map(|p| &p.0),
        FieldPolicy::Dense,
    ))
}
