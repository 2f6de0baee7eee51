//! License-gated content access.
//!
//! Purchased audio lives encrypted at a public locator; it is useless
//! without a decryption grant. Semi-trusted *serving nodes* — staked
//! peers offering seeding and decryption services — hand out
//! time-boxed playback grants to buyers who prove ownership, and a
//! peer-to-peer swarm covers the case where no serving node is live.
//!
//! The [`ContentAccessGate`] re-validates every claimed license
//! through the verifier before any node is contacted, and reports
//! denial with a deliberately generic "no valid license" — callers
//! learn nothing about why verification failed.

mod catalog;
mod error;
mod gate;
mod node;
mod swarm;

pub use catalog::{mock::MemoryCatalog, ContentCatalog, EncryptedContentRecord};
pub use error::{VaultError, VaultResult};
pub use gate::{AccessGrant, ContentAccessGate, NetworkStatus, DECRYPTION_TIMEOUT, SWARM_HANDLE_TTL_SECS};
pub use node::{
    spawn_heartbeat, HeartbeatConfig, NodeId, NodeRegistry, NodeServices, NodeStatus, ServingNode,
};
pub use swarm::{mock::MemorySwarm, SwarmFetcher, SwarmHandle};
