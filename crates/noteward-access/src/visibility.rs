//! Visibility transition rules.
//!
//! The visibility field is not a guarded state machine: each mutating action
//! unconditionally sets the state associated with that action, and removing
//! a grant performs no transition at all. The field is a cache of "how was
//! this note most recently exposed", lazily reconciled by whichever action
//! last granted exposure, and it can go stale relative to the underlying
//! share and link sets.

use noteward_core::Visibility;

/// State assigned at note creation.
pub fn on_note_created() -> Visibility {
    Visibility::Private
}

/// State forced by a successful share registration.
///
/// Overwrites `Public` if that was the prior state.
pub fn on_share_created(_current: Visibility) -> Visibility {
    Visibility::Shared
}

/// State forced by a successful public link registration.
///
/// Overwrites `Shared` if that was the prior state.
pub fn on_link_created(_current: Visibility) -> Visibility {
    Visibility::Public
}

/// State after a share or public link is revoked: unchanged.
pub fn on_grant_revoked(current: Visibility) -> Visibility {
    current
}

/// State after an explicit visibility update: the requested value, applied
/// verbatim with no check against existing grants.
pub fn on_explicit_update(requested: Visibility) -> Visibility {
    requested
}
