//! Navigation gate derived from session state.

use super::manager::SessionState;

/// Specifying which screen family the presentation layer may show.
///
/// Starts at `Loading`, settles on one of the other two once the stored
/// session has been read, then flips between them on sign-in and sign-out.
///
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum AuthGate {
    #[default]
    Loading,
    Authenticated,
    Unauthenticated,
}

impl AuthGate {
    /// Return whether moving from this gate to `next` is a legal transition.
    /// Staying put is not a transition.
    ///
    pub fn can_transition_to(self, next: AuthGate) -> bool {
        use AuthGate::*;
        matches!(
            (self, next),
            (Loading, Authenticated)
                | (Loading, Unauthenticated)
                | (Authenticated, Unauthenticated)
                | (Unauthenticated, Authenticated)
        )
    }

    pub fn is_authenticated(self) -> bool {
        self == AuthGate::Authenticated
    }
}

impl From<&SessionState> for AuthGate {
    fn from(state: &SessionState) -> Self {
        if state.is_loading {
            AuthGate::Loading
        } else if state.session.is_some() {
            AuthGate::Authenticated
        } else {
            AuthGate::Unauthenticated
        }
    }
}
