//! Controlled / uncontrolled state ownership.
//!
//! A piece of component state (expanded keys, selected keys) is either owned
//! by the component (uncontrolled) or supplied by the caller on every render
//! (controlled). The mode is an explicit flag derived from whether the
//! caller passed a value to [`OwnedState::sync`]; it is never inferred from
//! the value itself.
//!
//! Mutations go through [`OwnedState::propose`]:
//!
//! - **Uncontrolled**: the value is stored, then the listener sees it.
//! - **Controlled**: the listener sees the proposal; nothing is stored. The
//!   owner is expected to feed it back through `sync` before the next
//!   render. An owner that never does so will see the component stay put.

/// Who owns a piece of state for the current render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// The caller supplies the value every render.
    Controlled,
    /// The component stores the value itself.
    #[default]
    Uncontrolled,
}

/// State slot with controlled/uncontrolled duality.
#[derive(Debug, Clone, Default)]
pub struct OwnedState<S> {
    internal: S,
    external: Option<S>,
    revision: u64,
}

impl<S> OwnedState<S> {
    /// Create an uncontrolled slot holding `initial`.
    #[must_use]
    pub fn new(initial: S) -> Self {
        Self {
            internal: initial,
            external: None,
            revision: 0,
        }
    }

    /// Ownership for the current render.
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        if self.external.is_some() {
            Ownership::Controlled
        } else {
            Ownership::Uncontrolled
        }
    }

    /// Whether the caller owns the value.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.external.is_some()
    }

    /// Effective value: the external one when controlled.
    #[must_use]
    pub fn current(&self) -> &S {
        self.external.as_ref().unwrap_or(&self.internal)
    }

    /// Internally stored value (ignores any controlled override).
    #[must_use]
    pub fn internal(&self) -> &S {
        &self.internal
    }

    /// Monotonic counter bumped whenever the effective value may have changed.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Route a proposed value by ownership, then hand the value to `notify`.
    pub fn propose(&mut self, next: S, notify: impl FnOnce(&S)) {
        match self.ownership() {
            Ownership::Uncontrolled => {
                self.internal = next;
                self.revision = self.revision.wrapping_add(1);
                notify(&self.internal);
            }
            Ownership::Controlled => notify(&next),
        }
    }

    /// Overwrite the internal value without notifying anyone.
    pub fn reset(&mut self, value: S) {
        self.internal = value;
        self.revision = self.revision.wrapping_add(1);
    }
}

impl<S: PartialEq> OwnedState<S> {
    /// Apply this render's controlled value (`None` = uncontrolled).
    ///
    /// Returns `true` when the effective value changed.
    pub fn sync(&mut self, external: Option<S>) -> bool {
        let changed = match (&self.external, &external) {
            (None, None) => false,
            (Some(old), Some(new)) => old != new,
            (Some(old), None) => *old != self.internal,
            (None, Some(new)) => *new != self.internal,
        };
        self.external = external;
        if changed {
            self.revision = self.revision.wrapping_add(1);
        }
        changed
    }
}
