use std::{any::TypeId, sync::Arc};

use tracing::debug;

use crate::{
    cache::{self, Key},
    mode::mode,
    signature::{Argument, Signature},
};

/// The compiled form of a wrapped function.
pub type Graph<A, R> = Arc<dyn Fn(&A) -> R + Send + Sync>;

type Trace<A, R> = Arc<dyn Fn(&A) -> Graph<A, R> + Send + Sync>;

/// A function whose compiled form is cached under graph mode.
///
/// Created with [`function`]. Cloning is cheap and clones share the tag, so
/// they also share cache entries.
pub struct Function<A, R> {
    tag: Arc<str>,
    trace: Trace<A, R>,
}

impl<A, R> Clone for Function<A, R> {
    fn clone(&self) -> Self {
        Self {
            tag: Arc::clone(&self.tag),
            trace: Arc::clone(&self.trace),
        }
    }
}

impl<A, R> std::fmt::Debug for Function<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function").field("tag", &self.tag).finish()
    }
}

/// Wraps `trace` for conditional compilation under the identity `tag`.
///
/// `trace` is the function body: it may perform side effects and returns
/// the compiled form that computes the result. In graph mode the body runs
/// once per distinct [`Signature`] and the compiled form is cached; in
/// eager mode the body and its compiled form run on every call.
///
/// The tag identifies the function in the cache. Wrapping two different
/// bodies with the same tag and types makes them share compiled forms.
pub fn function<A, R, F, G>(tag: impl Into<String>, trace: F) -> Function<A, R>
where
    A: Argument + 'static,
    R: 'static,
    F: Fn(&A) -> G + Send + Sync + 'static,
    G: Fn(&A) -> R + Send + Sync + 'static,
{
    let trace: Trace<A, R> = Arc::new(move |args: &A| -> Graph<A, R> { Arc::new(trace(args)) });
    Function {
        tag: Arc::from(tag.into()),
        trace,
    }
}

impl<A, R> Function<A, R>
where
    A: Argument + 'static,
    R: 'static,
{
    /// Returns the identity tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Calls the function according to the current [`Mode`](crate::Mode).
    pub fn call(&self, args: &A) -> R {
        if !mode().graph {
            let graph = (self.trace)(args);
            return graph(args);
        }

        let key = Key::new(
            Arc::clone(&self.tag),
            TypeId::of::<(A, R)>(),
            Signature::of(args),
        );

        let graph = match cache::lookup(&key).and_then(downcast::<A, R>) {
            Some(graph) => graph,
            None => self.compile(key, args),
        };

        graph(args)
    }

    fn compile(&self, key: Key, args: &A) -> Graph<A, R> {
        debug!(tag = key.tag(), "tracing function");
        let graph = (self.trace)(args);

        // The key's type id guarantees the stored form has type `Graph<A, R>`,
        // so the fallback only triggers if that invariant is broken.
        let stored = cache::insert(key, Arc::new(Arc::clone(&graph)));
        downcast::<A, R>(stored).unwrap_or(graph)
    }
}

fn downcast<A: 'static, R: 'static>(erased: cache::Erased) -> Option<Graph<A, R>> {
    erased
        .downcast::<Graph<A, R>>()
        .ok()
        .map(|graph| (*graph).clone())
}
