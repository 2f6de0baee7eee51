//! The wallet capability consumed by the protocol core.
//!
//! Key storage, seed handling and the wallet's own signing scheme are
//! external; the core only needs the buyer's public identity, a secret
//! for payment-address derivation, and sign-this-transaction.

use crate::error::LedgerResult;
use crate::tx::{SignedTransaction, UnsignedTransaction};
use async_trait::async_trait;
use cadenza_types::{LedgerAddress, PublicKey, SecretKey};

/// The buyer wallet capability.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Whether the wallet is connected and able to sign.
    async fn is_connected(&self) -> bool;

    /// The wallet's spending address, used for balance checks.
    async fn address(&self) -> LedgerResult<LedgerAddress>;

    /// The buyer's public key, embedded in license records.
    async fn public_key(&self) -> LedgerResult<PublicKey>;

    /// The buyer-side secret fed into payment-address derivation.
    async fn derivation_secret(&self) -> LedgerResult<SecretKey>;

    /// Signs a payment transaction for broadcast.
    async fn sign_transaction(&self, tx: &UnsignedTransaction) -> LedgerResult<SignedTransaction>;
}

/// In-memory wallet for tests.
pub mod mock {
    use super::*;
    use crate::error::LedgerError;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// A [`WalletSigner`] over fixed key material. "Signing" is a
    /// JSON encoding of the unsigned transaction, which
    /// [`MockLedger`](crate::MockLedger) knows how to decode on
    /// broadcast.
    pub struct MemoryWallet {
        secret: SecretKey,
        public: PublicKey,
        connected: AtomicBool,
    }

    impl MemoryWallet {
        /// Creates a connected wallet from fixed key material.
        #[must_use]
        pub fn new(secret: SecretKey, public: PublicKey) -> Self {
            Self {
                secret,
                public,
                connected: AtomicBool::new(true),
            }
        }

        /// Connects or disconnects the wallet.
        pub fn set_connected(&self, connected: bool) {
            self.connected.store(connected, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl WalletSigner for MemoryWallet {
        async fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn address(&self) -> LedgerResult<LedgerAddress> {
            Ok(LedgerAddress::for_key(&self.public))
        }

        async fn public_key(&self) -> LedgerResult<PublicKey> {
            Ok(self.public)
        }

        async fn derivation_secret(&self) -> LedgerResult<SecretKey> {
            if !self.connected.load(Ordering::SeqCst) {
                return Err(LedgerError::Wallet("wallet disconnected".into()));
            }
            Ok(self.secret.clone())
        }

        async fn sign_transaction(
            &self,
            tx: &UnsignedTransaction,
        ) -> LedgerResult<SignedTransaction> {
            if !self.connected.load(Ordering::SeqCst) {
                return Err(LedgerError::Wallet("wallet disconnected".into()));
            }
            let bytes = serde_json::to_vec(tx)
                .map_err(|e| LedgerError::Wallet(format!("encode failed: {e}")))?;
            Ok(SignedTransaction { bytes })
        }
    }
}
