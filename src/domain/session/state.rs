//! Session state as observed by the view layer
//!
//! Fields are private: only the session manager moves a state between
//! phases. Views read it through the accessors or [`SessionState::screen`].

use crate::domain::User;

/// Lifecycle phase of the single local session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    /// Initial phase until `restore()` completes.
    Restoring,
    Unauthenticated,
    Authenticated(User),
}

impl SessionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Restoring => "restoring",
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticated(_) => "authenticated",
        }
    }
}

/// Snapshot of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    phase: SessionPhase,
    loading: bool,
    error: Option<String>,
}

impl SessionState {
    /// State at process start: restoring, loading, no error.
    pub(crate) fn restoring() -> Self {
        Self {
            phase: SessionPhase::Restoring,
            loading: true,
            error: None,
        }
    }

    pub(crate) fn signed_out(error: Option<&str>) -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            loading: false,
            error: error.map(String::from),
        }
    }

    pub(crate) fn signed_in(user: User) -> Self {
        Self {
            phase: SessionPhase::Authenticated(user),
            loading: false,
            error: None,
        }
    }

    /// Mark an attempt in flight. Clears any previous error.
    pub(crate) fn begin_attempt(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.phase {
            SessionPhase::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.phase, SessionPhase::Authenticated(_))
    }

    /// Which screen a view should render. Loading suppresses both the
    /// signed-in and signed-out screens.
    pub fn screen(&self) -> Screen<'_> {
        if self.loading {
            return Screen::Loading;
        }
        match &self.phase {
            SessionPhase::Authenticated(user) => Screen::Dashboard(user),
            _ => Screen::SignIn {
                error: self.error.as_deref(),
            },
        }
    }
}

/// Top-level screen selection derived from a [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen<'a> {
    Loading,
    SignIn { error: Option<&'a str> },
    Dashboard(&'a User),
}
