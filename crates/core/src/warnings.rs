//! One-time warnings for experimental, advanced and recently changed features.
//!
//! Each warning is emitted at most once per process and identifier through
//! [`tracing::warn!`]. Advanced and changed warnings can be switched off per
//! identifier or for a whole category with [`set_enabled`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use tracing::warn;

/// The kind of a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// The feature is experimental and likely to change.
    Experimental,

    /// The feature is advanced, or the call may cause unwanted behavior.
    Advanced,

    /// The feature's behavior changed recently.
    Changed,
}

#[derive(Debug, Default)]
struct Switches {
    disabled_categories: HashSet<Category>,
    disabled: HashSet<(Category, String)>,
}

impl Switches {
    fn enabled(&self, category: Category, identifier: &str) -> bool {
        !self.disabled_categories.contains(&category)
            && !self.disabled.contains(&(category, identifier.to_owned()))
    }
}

static SWITCHES: Lazy<RwLock<Switches>> = Lazy::new(|| RwLock::new(Switches::default()));

static WARNED: Lazy<Mutex<HashSet<(Category, String)>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Enables or disables warnings.
///
/// With `identifier` set, only that warning is affected; with `None`, the
/// whole category is.
pub fn set_enabled(category: Category, identifier: Option<&str>, enabled: bool) {
    let mut switches = SWITCHES.write();
    match (identifier, enabled) {
        (Some(id), true) => {
            switches.disabled.remove(&(category, id.to_owned()));
        }
        (Some(id), false) => {
            switches.disabled.insert((category, id.to_owned()));
        }
        (None, true) => {
            switches.disabled_categories.remove(&category);
        }
        (None, false) => {
            switches.disabled_categories.insert(category);
        }
    }
}

/// Warns that `feature` is experimental.
///
/// Returns `true` if the warning was emitted by this call.
pub fn warn_experimental(feature: &str) -> bool {
    emit(Category::Experimental, feature, || {
        format!("{feature} is EXPERIMENTAL and likely to break in the future! Use it with caution.")
    })
}

/// Warns about the use of an advanced feature.
///
/// Returns `true` if the warning was emitted by this call.
pub fn warn_advanced(identifier: &str, message: &str) -> bool {
    emit(Category::Advanced, identifier, || {
        format!(
            "Either you're using an advanced feature OR causing unwanted behavior. \
             To turn this warning off, disable the advanced warning `{identifier}`.\n{message}"
        )
    })
}

/// Warns that the behavior of a feature recently changed.
///
/// Returns `true` if the warning was emitted by this call.
pub fn warn_changed(identifier: &str, message: &str) -> bool {
    emit(Category::Changed, identifier, || {
        format!(
            "The behavior of this functionality recently changed. \
             To turn this warning off, disable the changed warning `{identifier}`.\n{message}"
        )
    })
}

fn emit(category: Category, identifier: &str, message: impl FnOnce() -> String) -> bool {
    if !SWITCHES.read().enabled(category, identifier) {
        return false;
    }
    if !WARNED.lock().insert((category, identifier.to_owned())) {
        return false;
    }

    warn!(?category, identifier, "{}", message());
    true
}
