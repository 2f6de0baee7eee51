//! The content-catalog seam.
//!
//! Catalog metadata (which album a track belongs to, where its
//! encrypted bytes live) is synced through a key-value overlay network
//! whose mechanics are out of scope. The gate consumes it through this
//! trait.

use crate::error::VaultResult;
use crate::node::NodeId;
use async_trait::async_trait;
use cadenza_types::{AlbumId, TrackId};
use serde::{Deserialize, Serialize};

/// Catalog record for one encrypted track.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedContentRecord {
    /// The track.
    pub track_id: TrackId,
    /// The owning album; license checks key off this.
    pub album_id: AlbumId,
    /// Public locator of the encrypted bytes.
    pub locator_url: String,
    /// SHA-256 of the original audio, hex.
    pub content_hash: String,
    /// Encrypted file size in bytes.
    pub file_size: u64,
    /// Upload time, unix seconds.
    pub uploaded_at: i64,
    /// Nodes known to seed this track.
    pub seeding_nodes: Vec<NodeId>,
    /// Swarm locator published for peer-to-peer fallback, if any.
    pub swarm_locator: Option<String>,
}

/// Read access to the catalog overlay.
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    /// Resolves the album a track belongs to.
    async fn track_album(&self, track: &TrackId) -> VaultResult<Option<AlbumId>>;

    /// Fetches the encrypted-content record for a track.
    async fn encrypted_record(&self, track: &TrackId)
        -> VaultResult<Option<EncryptedContentRecord>>;
}

/// In-memory catalog for tests.
pub mod mock {
    use super::*;
    use crate::error::VaultError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::RwLock;

    /// A [`ContentCatalog`] over plain maps. Album mappings and
    /// content records are stored separately, as they are in the
    /// overlay, so one can exist without the other.
    #[derive(Default)]
    pub struct MemoryCatalog {
        albums: RwLock<HashMap<TrackId, AlbumId>>,
        records: RwLock<HashMap<TrackId, EncryptedContentRecord>>,
        fail: AtomicBool,
    }

    impl MemoryCatalog {
        /// Creates an empty catalog.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts a record along with its album mapping.
        pub async fn insert(&self, record: EncryptedContentRecord) {
            self.albums
                .write()
                .await
                .insert(record.track_id.clone(), record.album_id.clone());
            self.records
                .write()
                .await
                .insert(record.track_id.clone(), record);
        }

        /// Maps a track to an album without publishing a content
        /// record.
        pub async fn insert_album_mapping(&self, track: TrackId, album: AlbumId) {
            self.albums.write().await.insert(track, album);
        }

        /// Makes every lookup fail until cleared.
        pub fn fail_lookups(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        fn check(&self) -> VaultResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(VaultError::Catalog("mock catalog failure".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ContentCatalog for MemoryCatalog {
        async fn track_album(&self, track: &TrackId) -> VaultResult<Option<AlbumId>> {
            self.check()?;
            Ok(self.albums.read().await.get(track).cloned())
        }

        async fn encrypted_record(
            &self,
            track: &TrackId,
        ) -> VaultResult<Option<EncryptedContentRecord>> {
            self.check()?;
            Ok(self.records.read().await.get(track).cloned())
        }
    }
}
