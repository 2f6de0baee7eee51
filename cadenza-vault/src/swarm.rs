//! Peer-to-peer swarm fallback.
//!
//! When no serving node is live, a buyer with a valid license can
//! still reach the encrypted bytes through the seeding swarm. The
//! swarm client itself (piece exchange, tracker protocol) is a
//! separate process; this trait is the narrow seam the gate uses to
//! ask it for a locally-served handle.

use crate::error::VaultResult;
use async_trait::async_trait;

/// A locally-served handle to swarm-fetched content. The URL points at
/// the local swarm client, which streams pieces as they arrive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwarmHandle {
    /// Local streaming URL.
    pub local_url: String,
}

/// Fetch access to the seeding swarm.
#[async_trait]
pub trait SwarmFetcher: Send + Sync {
    /// Joins the swarm for the given locator and returns a local
    /// handle once streaming can begin.
    async fn fetch(&self, locator: &str) -> VaultResult<SwarmHandle>;
}

/// In-memory swarm fetcher for tests.
pub mod mock {
    use super::*;
    use crate::error::VaultError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// A [`SwarmFetcher`] that fabricates local handles.
    #[derive(Default)]
    pub struct MemorySwarm {
        fail: AtomicBool,
        fetches: AtomicUsize,
    }

    impl MemorySwarm {
        /// Creates a fetcher that always succeeds.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every fetch fail until cleared.
        pub fn fail_fetches(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        /// Number of fetch calls made so far.
        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SwarmFetcher for MemorySwarm {
        async fn fetch(&self, locator: &str) -> VaultResult<SwarmHandle> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(VaultError::Swarm("mock swarm failure".into()));
            }
            Ok(SwarmHandle {
                local_url: format!("http://127.0.0.1:48100/stream/{locator}"),
            })
        }
    }
}
