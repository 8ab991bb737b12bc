//! Network reachability boundary contract.

/// Reports whether the network is reachable.
pub trait ConnectivityPort: Send + Sync {
    /// Returns true when requests can be attempted.
    fn is_online(&self) -> bool;
}
