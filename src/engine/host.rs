// SPDX-License-Identifier: MIT

//! Host resource queries
//!
//! Builders never read the hardware directly; they ask a `HostInfo`, so
//! tests can pin the processor count.

/// Capability for querying host resources
pub trait HostInfo: Send + Sync {
    /// Number of processing units available to this process
    fn cpu_count(&self) -> usize;
}

/// The real machine
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostInfo for SystemHost {
    fn cpu_count(&self) -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or_else(|e| {
                log::warn!("Could not query available parallelism ({}), assuming 1", e);
                1
            })
    }
}

/// A host with a fixed processor count
#[derive(Debug, Clone, Copy)]
pub struct FixedHost(pub usize);

impl HostInfo for FixedHost {
    fn cpu_count(&self) -> usize {
        self.0.max(1)
    }
}

/// Resolve a requested thread count.
///
/// `None` and anything below 1 mean "use every processor on the host".
pub fn resolve_thread_count(requested: Option<i64>, host: &dyn HostInfo) -> usize {
    match requested {
        Some(n) if n >= 1 => {
            let n = usize::try_from(n).unwrap_or(usize::MAX);
            let available = host.cpu_count();
            if n > available {
                log::warn!(
                    "Requested {} threads but host reports only {} processors",
                    n,
                    available
                );
            }
            n
        }
        _ => host.cpu_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_host_is_positive() {
        assert!(SystemHost.cpu_count() >= 1);
    }

    #[test]
    fn test_fixed_host_never_zero() {
        assert_eq!(FixedHost(0).cpu_count(), 1);
        assert_eq!(FixedHost(12).cpu_count(), 12);
    }

    #[test]
    fn test_resolve_none_uses_host() {
        assert_eq!(resolve_thread_count(None, &FixedHost(6)), 6);
    }

    #[test]
    fn test_resolve_non_positive_uses_host() {
        assert_eq!(resolve_thread_count(Some(0), &FixedHost(6)), 6);
        assert_eq!(resolve_thread_count(Some(-1), &FixedHost(6)), 6);
    }

    #[test]
    fn test_resolve_explicit_value_kept() {
        assert_eq!(resolve_thread_count(Some(4), &FixedHost(6)), 4);
        // More than the host has is allowed, only warned about
        assert_eq!(resolve_thread_count(Some(16), &FixedHost(6)), 16);
    }
}
