//! Revocable handles into stored payloads.
//!
//! A handle is what a playback or render surface points at, in the way a
//! browser points an `<audio>` element at an object URL. Handles are derived
//! from records and never the source of truth; whoever acquires one must
//! revoke it when the record is deleted, replaced or no longer shown.

use std::{collections::HashMap, fmt::Display, rc::Rc};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayableHandle {
    id: u64,
}

impl PlayableHandle {
    pub fn url(&self) -> String {
        format!("blob:bandsite/{}", self.id)
    }
}

impl Display for PlayableHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url())
    }
}

#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: u64,
    live: HashMap<u64, Rc<[u8]>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, payload: impl Into<Rc<[u8]>>) -> PlayableHandle {
        self.next_id += 1;
        let handle = PlayableHandle { id: self.next_id };
        self.live.insert(handle.id, payload.into());
        log::debug!("acquired {handle}");
        handle
    }

    /// Releases a handle. Returns false if it was already revoked.
    pub fn revoke(&mut self, handle: &PlayableHandle) -> bool {
        let released = self.live.remove(&handle.id).is_some();
        if released {
            log::debug!("revoked {handle}");
        }
        released
    }

    pub fn resolve(&self, handle: &PlayableHandle) -> Option<Rc<[u8]>> {
        self.live.get(&handle.id).cloned()
    }

    pub fn is_live(&self, handle: &PlayableHandle) -> bool {
        self.live.contains_key(&handle.id)
    }

    /// Number of handles acquired and not yet revoked.
    pub fn live(&self) -> usize {
        self.live.len()
    }
}
