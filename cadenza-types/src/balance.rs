//! Account balance as reported by the ledger.

use serde::{Deserialize, Serialize};

/// Balance of the two on-chain assets, both in atomic units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// EMB, the primary coin.
    pub coin: u64,
    /// CIN, the utility token.
    pub token: u64,
}

impl Balance {
    /// A balance holding only the primary coin.
    #[must_use]
    pub const fn coin_only(coin: u64) -> Self {
        Self { coin, token: 0 }
    }
}
