use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

use crate::signature::Signature;

/// A compiled form with its concrete type erased.
pub(crate) type Erased = Arc<dyn Any + Send + Sync>;

/// Identifies one compiled form.
///
/// The type id covers the argument and return types so that a tag reused
/// with different types can never hand back a form of the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Key {
    tag: Arc<str>,
    types: TypeId,
    signature: Signature,
}

impl Key {
    pub(crate) fn new(tag: Arc<str>, types: TypeId, signature: Signature) -> Self {
        Self {
            tag,
            types,
            signature,
        }
    }

    pub(crate) fn tag(&self) -> &str {
        &self.tag
    }
}

static CACHE: Lazy<Mutex<HashMap<Key, Erased>>> = Lazy::new(|| Mutex::new(HashMap::new()));

pub(crate) fn lookup(key: &Key) -> Option<Erased> {
    CACHE.lock().get(key).cloned()
}

/// Stores a compiled form and returns the one that ends up cached.
///
/// If another caller stored a form for the same key first, that form wins.
pub(crate) fn insert(key: Key, compiled: Erased) -> Erased {
    Arc::clone(CACHE.lock().entry(key).or_insert(compiled))
}

/// Removes every compiled form from the cache.
///
/// The next call of any wrapped function in graph mode traces it again.
pub fn clear_graph_cache() {
    let mut cache = CACHE.lock();
    let flushed = cache.len();
    cache.clear();
    debug!(flushed, "graph cache cleared");
}

/// Returns the number of compiled forms currently cached.
#[must_use]
pub fn cached_graphs() -> usize {
    CACHE.lock().len()
}
