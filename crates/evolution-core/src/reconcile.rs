// File: crates/evolution-core/src/reconcile.rs
// Summary: Keyed enter/update/exit reconciliation between retained elements and required data.

use std::collections::BTreeMap;

/// Outcome of one reconciliation pass, keys in ascending order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join<K> {
    pub enter: Vec<K>,
    pub update: Vec<K>,
    pub exit: Vec<K>,
}

impl<K> Default for Join<K> {
    fn default() -> Self { Self { enter: Vec::new(), update: Vec::new(), exit: Vec::new() } }
}

/// What an exit handler wants done with a departing element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// Drop the element now.
    Remove,
    /// Keep it (e.g. while it fades out); the owner removes it later.
    Retain,
}

/// Reconcile `elements` against `required`.
///
/// Keys missing from `elements` are created with `enter`, keys present in both
/// are refreshed with `update`, and keys no longer required are passed to
/// `exit`. Duplicate required keys keep their first occurrence.
pub fn reconcile<K, V, D>(
    elements: &mut BTreeMap<K, V>,
    required: impl IntoIterator<Item = (K, D)>,
    mut enter: impl FnMut(&K, D) -> V,
    mut update: impl FnMut(&K, &mut V, D),
    mut exit: impl FnMut(&K, &mut V) -> Exit,
) -> Join<K>
where
    K: Ord + Clone,
{
    let mut join = Join::default();
    let mut seen: BTreeMap<K, ()> = BTreeMap::new();
    for (key, datum) in required {
        if seen.insert(key.clone(), ()).is_some() {
            continue;
        }
        match elements.get_mut(&key) {
            Some(el) => {
                update(&key, el, datum);
                join.update.push(key);
            }
            None => {
                let el = enter(&key, datum);
                elements.insert(key.clone(), el);
                join.enter.push(key);
            }
        }
    }
    let stale: Vec<K> = elements.keys().filter(|k| !seen.contains_key(*k)).cloned().collect();
    for key in stale {
        let remove = match elements.get_mut(&key) {
            Some(el) => exit(&key, el) == Exit::Remove,
            None => false,
        };
        if remove {
            elements.remove(&key);
        }
        join.exit.push(key);
    }
    join.enter.sort();
    join.update.sort();
    join
}
