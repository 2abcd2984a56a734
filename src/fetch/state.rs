//! Load lifecycle state machine.
//!
//! Replaces ad-hoc flag juggling with a tagged state and a pure transition
//! function: every lifecycle change is an explicit [`LoadEvent`] applied to
//! a [`LoadState`].

/// Lifecycle of a single resource load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// No load has been requested yet.
    Idle,
    /// A load is in flight.
    Loading,
    /// The load finished and produced data.
    Loaded(T),
    /// The load failed; the message is presentable to the user.
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The loaded data, if any.
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

/// Events a load can emit over its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent<T> {
    /// The load was started (or restarted with a new source).
    Started,
    /// The load finished successfully.
    Finished(T),
    /// The load failed for a reason other than cancellation.
    Failed(String),
    /// The load was aborted. Benign: must not surface as an error.
    Cancelled,
}

/// Applies an event to a state, returning the next state.
///
/// `Cancelled` is the identity transition — a superseded or torn-down load
/// leaves whatever state is current untouched, so a stale abort can never
/// masquerade as a failure.
pub fn transition<T>(state: LoadState<T>, event: LoadEvent<T>) -> LoadState<T> {
    match event {
        LoadEvent::Started => LoadState::Loading,
        LoadEvent::Finished(data) => LoadState::Loaded(data),
        LoadEvent::Failed(message) => LoadState::Failed(message),
        LoadEvent::Cancelled => state,
    }
}
