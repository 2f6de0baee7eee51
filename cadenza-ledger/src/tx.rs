//! Transaction model at the ledger boundary.

use cadenza_types::{LedgerAddress, TxHash};
use serde::{Deserialize, Serialize};

/// Extra-data tag carrying an album license record.
pub const LICENSE_EXTRA_TAG: u8 = 0x0B;

/// A confirmed transaction as returned by tagged lookup. Only the
/// fields the protocol reads are modeled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction hash.
    pub hash: TxHash,
    /// Height of the containing block.
    pub block_height: u64,
    /// Extra-data tag byte.
    pub extra_tag: u8,
    /// Raw extra-data payload under the tag.
    pub extra_payload: Vec<u8>,
}

/// A payment transaction assembled by the core, before wallet signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Destination address.
    pub to: LedgerAddress,
    /// Amount in atomic units.
    pub amount: u64,
    /// Extra-data tag byte, if any extra data is attached.
    pub extra_tag: Option<u8>,
    /// Raw extra-data payload.
    pub extra_payload: Vec<u8>,
}

impl UnsignedTransaction {
    /// A plain payment with no extra data.
    #[must_use]
    pub fn payment(to: LedgerAddress, amount: u64) -> Self {
        Self {
            to,
            amount,
            extra_tag: None,
            extra_payload: Vec::new(),
        }
    }

    /// Attaches tagged extra data to the transaction.
    #[must_use]
    pub fn with_extra(mut self, tag: u8, payload: Vec<u8>) -> Self {
        self.extra_tag = Some(tag);
        self.extra_payload = payload;
        self
    }
}

/// An opaque wallet-signed transaction ready for broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// Serialized signed transaction bytes, as the wallet produced
    /// them. The core never inspects these.
    pub bytes: Vec<u8>,
}
