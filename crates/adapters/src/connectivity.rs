//! Connectivity adapters.

use foodify_ports::ConnectivityPort;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Reports the network as always reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

impl ConnectivityPort for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Manually toggled connectivity flag.
///
/// Clones share the same flag, so a host (or a test) can keep one handle and
/// flip it while the feed holds another.
#[derive(Debug, Clone)]
pub struct ConnectivitySwitch {
    online: Arc<AtomicBool>,
}

impl ConnectivitySwitch {
    /// Create a switch with the given initial state.
    #[must_use]
    pub fn new(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    /// Update the reported state.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }
}

impl Default for ConnectivitySwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityPort for ConnectivitySwitch {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_clones_share_state() {
        let switch = ConnectivitySwitch::default();
        let observer = switch.clone();
        assert!(observer.is_online());

        switch.set_online(false);
        assert!(!observer.is_online());
        assert!(AlwaysOnline.is_online());
    }
}
