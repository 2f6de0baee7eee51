//! Serving-node registry and heartbeat.
//!
//! Discovery itself is external: some overlay process learns about
//! nodes and feeds them in through [`NodeRegistry::upsert`]. The
//! registry is the live snapshot the gate reads when picking a node,
//! plus an optional heartbeat loop that keeps `status` warm by polling
//! each node's `/status` endpoint on a fixed interval.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Identifier of a serving node, chosen by its operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps a node identifier.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Liveness of a serving node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Answering heartbeats; eligible for selection.
    Active,
    /// Missed its last heartbeat.
    Inactive,
    /// Being slashed; never selected.
    Slashing,
}

/// Which services a node offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeServices {
    /// Seeds encrypted content.
    pub seeding: bool,
    /// Decrypts for license holders.
    pub decryption: bool,
    /// Runs swarm tracking.
    pub tracking: bool,
}

/// A discovered serving node. Mutated only by the discovery and
/// heartbeat processes; the gate just reads the current snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingNode {
    /// Operator-chosen identifier.
    pub node_id: NodeId,
    /// Base URL of the node's service endpoint.
    pub endpoint: String,
    /// Stake deposit backing the node, atomic units.
    pub stake_atomic: u64,
    /// Current liveness.
    pub status: NodeStatus,
    /// Last successful heartbeat, unix seconds.
    pub last_seen: i64,
    /// Tracks the node is currently seeding.
    pub seeding_count: u32,
    /// Trust signal in `[0, 1]`, from consensus participation.
    pub trust_rating: f64,
    /// Services offered.
    pub services: NodeServices,
}

impl ServingNode {
    /// Composite selection score: trust discounted by current load.
    fn selection_score(&self) -> f64 {
        self.trust_rating * (1.0 - f64::from(self.seeding_count) / 1000.0)
    }
}

/// Concurrent snapshot map of discovered nodes, keyed by node id.
/// Many readers, one writer at a time.
#[derive(Default)]
pub struct NodeRegistry {
    nodes: RwLock<HashMap<NodeId, ServingNode>>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a node.
    pub async fn upsert(&self, node: ServingNode) {
        self.nodes.write().await.insert(node.node_id.clone(), node);
    }

    /// Removes a node.
    pub async fn remove(&self, node_id: &NodeId) {
        self.nodes.write().await.remove(node_id);
    }

    /// Current snapshot of all nodes.
    pub async fn snapshot(&self) -> Vec<ServingNode> {
        self.nodes.read().await.values().cloned().collect()
    }

    /// Picks the best node for a decryption request: active, offering
    /// both seeding and decryption, ranked by trust and inverse load.
    pub async fn select_decryption_node(&self) -> Option<ServingNode> {
        self.nodes
            .read()
            .await
            .values()
            .filter(|n| {
                n.status == NodeStatus::Active && n.services.seeding && n.services.decryption
            })
            .max_by(|a, b| {
                a.selection_score()
                    .partial_cmp(&b.selection_score())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .cloned()
    }
}

/// Heartbeat loop policy.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Poll interval.
    pub interval: Duration,
    /// Per-node request deadline.
    pub request_timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeStatusBody {
    seeding_count: Option<u32>,
}

/// Spawns the periodic node-status poll. Ticks never overlap: each
/// tick's polling completes before the next is taken, and missed
/// ticks are skipped rather than replayed.
pub fn spawn_heartbeat(registry: Arc<NodeRegistry>, config: HeartbeatConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Ok(http) = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
        else {
            warn!("could not build heartbeat http client; heartbeat disabled");
            return;
        };
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            poll_all(&registry, &http).await;
        }
    })
}

async fn poll_all(registry: &NodeRegistry, http: &reqwest::Client) {
    let snapshot = registry.snapshot().await;
    for mut node in snapshot {
        let url = format!("{}/status", node.endpoint);
        match http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                node.status = NodeStatus::Active;
                node.last_seen = chrono::Utc::now().timestamp();
                if let Ok(body) = response.json::<NodeStatusBody>().await {
                    if let Some(count) = body.seeding_count {
                        node.seeding_count = count;
                    }
                }
                debug!(node = %node.node_id, "node heartbeat ok");
            }
            _ => {
                warn!(node = %node.node_id, "node appears offline");
                node.status = NodeStatus::Inactive;
            }
        }
        registry.upsert(node).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, status: NodeStatus, trust: f64, load: u32, services: NodeServices) -> ServingNode {
        ServingNode {
            node_id: NodeId::new(id),
            endpoint: format!("http://{id}.example"),
            stake_atomic: 800_000_000,
            status,
            last_seen: 0,
            seeding_count: load,
            trust_rating: trust,
            services,
        }
    }

    fn full_services() -> NodeServices {
        NodeServices {
            seeding: true,
            decryption: true,
            tracking: true,
        }
    }

    #[tokio::test]
    async fn selection_prefers_trusted_and_idle() {
        let registry = NodeRegistry::new();
        registry.upsert(node("busy", NodeStatus::Active, 0.9, 900, full_services())).await;
        registry.upsert(node("calm", NodeStatus::Active, 0.8, 10, full_services())).await;
        let picked = registry.select_decryption_node().await.unwrap();
        assert_eq!(picked.node_id, NodeId::new("calm"));
    }

    #[tokio::test]
    async fn selection_skips_inactive_and_partial_nodes() {
        let registry = NodeRegistry::new();
        registry.upsert(node("down", NodeStatus::Inactive, 1.0, 0, full_services())).await;
        registry.upsert(node("slashed", NodeStatus::Slashing, 1.0, 0, full_services())).await;
        registry
            .upsert(node(
                "seed-only",
                NodeStatus::Active,
                1.0,
                0,
                NodeServices {
                    seeding: true,
                    decryption: false,
                    tracking: false,
                },
            ))
            .await;
        assert!(registry.select_decryption_node().await.is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let registry = NodeRegistry::new();
        registry.upsert(node("n1", NodeStatus::Active, 0.5, 0, full_services())).await;
        registry.upsert(node("n1", NodeStatus::Inactive, 0.5, 0, full_services())).await;
        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].status, NodeStatus::Inactive);
    }
}
