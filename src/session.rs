//! Authorization gate for admin-only actions.
//!
//! This is not a security boundary. Credentials come from the local config in
//! plaintext and the check runs on the user's own machine, so anyone who can
//! read the config can pass it. It keeps casual visitors from clicking admin
//! controls, nothing more.

use crate::{config::Credentials, error::AuthorizationError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Anonymous,
    Privileged { identity: String },
}

impl AuthState {
    pub fn is_privileged(&self) -> bool {
        matches!(self, AuthState::Privileged { .. })
    }

    pub fn identity(&self) -> Option<&str> {
        match self {
            AuthState::Privileged { identity } => Some(identity),
            AuthState::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&AuthState)>;

/// Session-local login state, injected into every controller that gates
/// an action on it.
pub struct Session {
    credentials: Credentials,
    state: AuthState,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            state: AuthState::Anonymous,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_privileged(&self) -> bool {
        self.state.is_privileged()
    }

    /// Returns false and leaves the state alone on a mismatch.
    pub fn login(&mut self, identity: &str, secret: &str) -> bool {
        if identity != self.credentials.username || secret != self.credentials.password {
            log::warn!("rejected login for '{identity}'");
            return false;
        }

        self.state = AuthState::Privileged {
            identity: identity.to_string(),
        };
        log::info!("'{identity}' logged in");
        self.broadcast();
        true
    }

    pub fn logout(&mut self) {
        self.state = AuthState::Anonymous;
        log::info!("logged out");
        self.broadcast();
    }

    pub fn require(&self, action: &'static str) -> Result<(), AuthorizationError> {
        if self.is_privileged() {
            Ok(())
        } else {
            Err(AuthorizationError { action })
        }
    }

    /// Registers a callback run after every login and logout.
    pub fn subscribe(&mut self, observer: impl FnMut(&AuthState) + 'static) -> ObserverId {
        self.next_observer += 1;
        let id = ObserverId(self.next_observer);
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    fn broadcast(&mut self) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.state);
        }
    }
}
