//! The ledger RPC surface consumed by the protocol core.

use crate::error::LedgerResult;
use crate::tx::{SignedTransaction, Transaction};
use async_trait::async_trait;
use cadenza_types::{Balance, LedgerAddress, TxHash};

/// What the core needs from an Ember ledger node. The transport behind
/// this trait (JSON-RPC, embedded node, …) is out of scope.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Returns the balance of both on-chain assets for an address.
    async fn balance(&self, address: &LedgerAddress) -> LedgerResult<Balance>;

    /// Returns the current chain height.
    async fn current_block_height(&self) -> LedgerResult<u64>;

    /// Returns all transactions carrying extra data under `tag`,
    /// optionally restricted to the block range `[from, to]`.
    async fn transactions_by_extra_tag(
        &self,
        tag: u8,
        from_block: Option<u64>,
        to_block: Option<u64>,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Broadcasts a signed transaction; returns its hash.
    ///
    /// This is the protocol's sole point of no return: once a
    /// broadcast succeeds, the payment cannot be cancelled.
    async fn broadcast_transaction(&self, tx: &SignedTransaction) -> LedgerResult<TxHash>;
}

/// In-memory ledger for tests.
pub mod mock {
    use super::*;
    use crate::error::LedgerError;
    use crate::tx::UnsignedTransaction;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use tokio::sync::RwLock;

    /// An in-memory [`LedgerRpc`] holding balances, a chain height and
    /// a transaction log. Broadcasts decode the mock wallet's signed
    /// form and land in the log at the current height, so purchase
    /// flows can be scanned back out.
    #[derive(Default)]
    pub struct MockLedger {
        balances: RwLock<HashMap<String, Balance>>,
        transactions: RwLock<Vec<Transaction>>,
        height: AtomicU64,
        fail_queries: AtomicBool,
        fail_broadcast: AtomicBool,
        tx_counter: AtomicU64,
        scan_counter: AtomicU64,
    }

    impl MockLedger {
        /// Creates an empty mock ledger at height 0.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Sets the balance of an address.
        pub async fn set_balance(&self, address: &LedgerAddress, balance: Balance) {
            self.balances
                .write()
                .await
                .insert(address.as_str().to_string(), balance);
        }

        /// Sets the chain height.
        pub fn set_height(&self, height: u64) {
            self.height.store(height, Ordering::SeqCst);
        }

        /// Inserts a confirmed transaction directly into the log.
        pub async fn insert_transaction(&self, tx: Transaction) {
            self.transactions.write().await.push(tx);
        }

        /// Makes every query method fail until cleared.
        pub fn fail_queries(&self, fail: bool) {
            self.fail_queries.store(fail, Ordering::SeqCst);
        }

        /// Makes broadcasts fail until cleared.
        pub fn fail_broadcast(&self, fail: bool) {
            self.fail_broadcast.store(fail, Ordering::SeqCst);
        }

        /// Number of transactions in the log.
        pub async fn transaction_count(&self) -> usize {
            self.transactions.read().await.len()
        }

        /// How many tagged-transaction scans have been served. Lets
        /// cache tests assert whether a call hit the ledger.
        pub fn scan_count(&self) -> u64 {
            self.scan_counter.load(Ordering::SeqCst)
        }

        fn check_queries(&self) -> LedgerResult<()> {
            if self.fail_queries.load(Ordering::SeqCst) {
                return Err(LedgerError::Rpc("mock query failure".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LedgerRpc for MockLedger {
        async fn balance(&self, address: &LedgerAddress) -> LedgerResult<Balance> {
            self.check_queries()?;
            Ok(self
                .balances
                .read()
                .await
                .get(address.as_str())
                .copied()
                .unwrap_or_default())
        }

        async fn current_block_height(&self) -> LedgerResult<u64> {
            self.check_queries()?;
            Ok(self.height.load(Ordering::SeqCst))
        }

        async fn transactions_by_extra_tag(
            &self,
            tag: u8,
            from_block: Option<u64>,
            to_block: Option<u64>,
        ) -> LedgerResult<Vec<Transaction>> {
            self.scan_counter.fetch_add(1, Ordering::SeqCst);
            self.check_queries()?;
            let from = from_block.unwrap_or(0);
            let to = to_block.unwrap_or(u64::MAX);
            Ok(self
                .transactions
                .read()
                .await
                .iter()
                .filter(|tx| tx.extra_tag == tag && tx.block_height >= from && tx.block_height <= to)
                .cloned()
                .collect())
        }

        async fn broadcast_transaction(&self, tx: &SignedTransaction) -> LedgerResult<TxHash> {
            if self.fail_broadcast.load(Ordering::SeqCst) {
                return Err(LedgerError::Broadcast("mock broadcast failure".into()));
            }
            let unsigned: UnsignedTransaction = serde_json::from_slice(&tx.bytes)
                .map_err(|e| LedgerError::Broadcast(format!("undecodable mock tx: {e}")))?;
            let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
            let hash = TxHash::new(format!("mocktx-{n:08}"));
            if let Some(tag) = unsigned.extra_tag {
                self.transactions.write().await.push(Transaction {
                    hash: hash.clone(),
                    block_height: self.height.load(Ordering::SeqCst),
                    extra_tag: tag,
                    extra_payload: unsigned.extra_payload,
                });
            }
            Ok(hash)
        }
    }
}
