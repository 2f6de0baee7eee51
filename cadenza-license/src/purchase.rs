//! Purchase orchestration.
//!
//! A purchase walks a fixed pipeline: validate → derive the one-time
//! payment address → obtain the artist co-signature → broadcast the
//! payment with the signed record attached. Broadcast is the sole
//! point of no return; every earlier failure leaves nothing on-ledger,
//! and abandoning a pending purchase before broadcast has no on-ledger
//! effect. After broadcast, cancellation is impossible.
//!
//! Purchases are not idempotent: two calls produce two transactions.
//! [`LicenseManager::check_existing_ownership`] exists so UIs can warn
//! about duplicates, but nothing enforces it on-chain.

use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;
use crate::signing::{SignLicenseRequest, SigningClient};
use crate::verify::LicenseVerifier;
use cadenza_ledger::{LedgerRpc, UnsignedTransaction, WalletSigner, LICENSE_EXTRA_TAG};
use cadenza_paycode::{derive_payment_address, PaymentCode};
use cadenza_types::{AlbumId, LedgerAddress, PublicKey, TxHash, ATOMIC_PER_COIN};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fixed network fee per payment transaction, atomic units.
pub const NETWORK_FEE_ATOMIC: u64 = 8_000;

/// Sanity ceiling on album prices: 1000 EMB.
pub const MAX_PRICE_ATOMIC: u64 = 1_000 * ATOMIC_PER_COIN;

/// Display currency of the primary coin.
pub const CURRENCY: &str = "EMB";

/// Phase of the purchase pipeline, for logging and receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchasePhase {
    /// Input and balance validation.
    Validating,
    /// Deriving the one-time payment address.
    DerivingAddress,
    /// Waiting on the artist signing service.
    AwaitingArtistSignature,
    /// Signing and broadcasting the payment.
    Broadcasting,
    /// Broadcast succeeded.
    Completed,
    /// Pipeline aborted before broadcast.
    Failed,
}

impl fmt::Display for PurchasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validating => "validating",
            Self::DerivingAddress => "deriving-address",
            Self::AwaitingArtistSignature => "awaiting-artist-signature",
            Self::Broadcasting => "broadcasting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A buyer's request to purchase an album.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    /// The album to purchase.
    pub album_id: AlbumId,
    /// The artist's serialized payment code.
    pub artist_payment_code: String,
    /// Price in atomic units.
    pub price_atomic: u64,
    /// Per-purchase signing service override.
    pub signing_service: Option<String>,
    /// Address derivation index; 0 unless the caller tracks prior
    /// purchases from this artist.
    pub address_index: u32,
}

impl PurchaseRequest {
    /// Builds a request at derivation index 0.
    #[must_use]
    pub fn new(album_id: AlbumId, artist_payment_code: impl Into<String>, price_atomic: u64) -> Self {
        Self {
            album_id,
            artist_payment_code: artist_payment_code.into(),
            price_atomic,
            signing_service: None,
            address_index: 0,
        }
    }

    /// Overrides the signing service for this purchase.
    #[must_use]
    pub fn with_signing_service(mut self, url: impl Into<String>) -> Self {
        self.signing_service = Some(url.into());
        self
    }

    /// Uses a non-zero derivation index.
    #[must_use]
    pub fn with_address_index(mut self, index: u32) -> Self {
        self.address_index = index;
        self
    }
}

/// Successful validation outcome.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    /// Estimated network fee, atomic units.
    pub estimated_fee: u64,
}

/// A completed purchase.
#[derive(Debug, Clone)]
pub struct CompletedPurchase {
    /// Hash of the broadcast payment transaction.
    pub tx_hash: TxHash,
    /// The signed license record embedded in it.
    pub license: LicenseRecord,
    /// The derived one-time payment address.
    pub payment_address: LedgerAddress,
}

/// Cost breakdown for a quoted price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseQuote {
    /// Album price, atomic units.
    pub base_price: u64,
    /// Fixed network fee, atomic units.
    pub network_fee: u64,
    /// Price plus fee, atomic units.
    pub total_cost: u64,
    /// Display currency.
    pub currency: &'static str,
}

/// Advisory duplicate-purchase answer.
#[derive(Debug, Clone)]
pub struct OwnershipCheck {
    /// A verified license already exists.
    pub already_owned: bool,
    /// Purchase time of the existing license, unix seconds.
    pub purchase_date: Option<i64>,
    /// Transaction hash of the existing license.
    pub tx_hash: Option<TxHash>,
}

/// UI-facing purchase receipt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    /// The album purchased (or attempted).
    pub album_id: AlbumId,
    /// Price in atomic units.
    pub price_atomic: u64,
    /// Transaction hash, present on success.
    pub tx_hash: Option<TxHash>,
    /// License timestamp, present on success.
    pub timestamp: Option<i64>,
    /// Whether the purchase completed.
    pub success: bool,
    /// Failure reason, present on failure.
    pub error: Option<String>,
}

impl PurchaseReceipt {
    /// Builds a receipt from a purchase outcome.
    #[must_use]
    pub fn from_outcome(
        request: &PurchaseRequest,
        outcome: &Result<CompletedPurchase, LicenseError>,
    ) -> Self {
        match outcome {
            Ok(done) => Self {
                album_id: request.album_id.clone(),
                price_atomic: request.price_atomic,
                tx_hash: Some(done.tx_hash.clone()),
                timestamp: Some(done.license.timestamp),
                success: true,
                error: None,
            },
            Err(e) => Self {
                album_id: request.album_id.clone(),
                price_atomic: request.price_atomic,
                tx_hash: None,
                timestamp: None,
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Drives album purchases end to end.
pub struct LicenseManager {
    rpc: Arc<dyn LedgerRpc>,
    wallet: Arc<dyn WalletSigner>,
    signing: SigningClient,
    verifier: Arc<LicenseVerifier>,
}

impl LicenseManager {
    /// Wires a manager to its collaborators.
    #[must_use]
    pub fn new(
        rpc: Arc<dyn LedgerRpc>,
        wallet: Arc<dyn WalletSigner>,
        signing: SigningClient,
        verifier: Arc<LicenseVerifier>,
    ) -> Self {
        Self {
            rpc,
            wallet,
            signing,
            verifier,
        }
    }

    /// Checks a request without side effects, reporting the first
    /// failing precondition: payment code structure, price bounds,
    /// wallet connection, balance coverage, and a dry-run address
    /// derivation.
    pub async fn validate_purchase_request(
        &self,
        request: &PurchaseRequest,
    ) -> LicenseResult<ValidatedRequest> {
        PaymentCode::decode(&request.artist_payment_code)?;
        if request.price_atomic == 0 || request.price_atomic > MAX_PRICE_ATOMIC {
            return Err(LicenseError::InvalidRequest(format!(
                "price must be in (0, {MAX_PRICE_ATOMIC}] atomic units"
            )));
        }
        if !self.wallet.is_connected().await {
            return Err(LicenseError::InvalidRequest("wallet not connected".into()));
        }

        self.check_balance(request.price_atomic).await?;

        let secret = self.wallet.derivation_secret().await?;
        derive_payment_address(&request.artist_payment_code, &secret, request.address_index)?;

        Ok(ValidatedRequest {
            estimated_fee: NETWORK_FEE_ATOMIC,
        })
    }

    /// Purchases an album: derives the one-time address, obtains the
    /// artist co-signature, embeds the signed record under tag `0x0B`
    /// and broadcasts the payment.
    ///
    /// Exactly one on-ledger transaction per successful call. On any
    /// error nothing has been broadcast — broadcast is the last step.
    pub async fn purchase_album(
        &self,
        request: &PurchaseRequest,
    ) -> LicenseResult<CompletedPurchase> {
        let outcome = self.run_purchase(request).await;
        if let Err(e) = &outcome {
            warn!(album = %request.album_id, phase = %PurchasePhase::Failed, error = %e, "purchase failed");
        }
        outcome
    }

    async fn run_purchase(&self, request: &PurchaseRequest) -> LicenseResult<CompletedPurchase> {
        debug!(album = %request.album_id, phase = %PurchasePhase::Validating, "starting purchase");
        let code = PaymentCode::decode(&request.artist_payment_code)?;
        if request.price_atomic == 0 || request.price_atomic > MAX_PRICE_ATOMIC {
            return Err(LicenseError::InvalidRequest("price out of range".into()));
        }
        self.check_balance(request.price_atomic).await?;

        debug!(phase = %PurchasePhase::DerivingAddress, index = request.address_index);
        let secret = self.wallet.derivation_secret().await?;
        let payment_address = derive_payment_address(
            &request.artist_payment_code,
            &secret,
            request.address_index,
        )?;

        debug!(phase = %PurchasePhase::AwaitingArtistSignature);
        let buyer_key = self.wallet.public_key().await?;
        let timestamp = chrono::Utc::now().timestamp();
        let signing_request = SignLicenseRequest {
            album_id: request.album_id.clone(),
            buyer_key,
            purchase_amount: request.price_atomic,
            timestamp,
            version: crate::record::LICENSE_RECORD_VERSION,
        };
        let co_signature = self
            .signing
            .request_signature(&signing_request, request.signing_service.as_deref())
            .await?;

        let license = LicenseRecord::assemble(
            request.album_id.clone(),
            buyer_key,
            request.price_atomic,
            timestamp,
            *code.artist_key(),
            co_signature.signature,
        );

        debug!(phase = %PurchasePhase::Broadcasting, address = %payment_address);
        let extra = license.to_extra_payload()?;
        let unsigned = UnsignedTransaction::payment(payment_address.clone(), request.price_atomic)
            .with_extra(LICENSE_EXTRA_TAG, extra);
        let signed = self.wallet.sign_transaction(&unsigned).await?;
        let tx_hash = self.rpc.broadcast_transaction(&signed).await?;

        info!(album = %request.album_id, tx = %tx_hash, phase = %PurchasePhase::Completed, "album purchased");
        Ok(CompletedPurchase {
            tx_hash,
            license,
            payment_address,
        })
    }

    /// Advisory duplicate check for UIs. Verification errors degrade
    /// to "not owned"; this gate is not enforced on-chain.
    pub async fn check_existing_ownership(
        &self,
        album: &AlbumId,
        buyer: &PublicKey,
    ) -> OwnershipCheck {
        match self.verifier.get_license_details(buyer, album).await {
            Some(license) => OwnershipCheck {
                already_owned: true,
                purchase_date: Some(license.timestamp),
                tx_hash: Some(license.tx_hash),
            },
            None => OwnershipCheck {
                already_owned: false,
                purchase_date: None,
                tx_hash: None,
            },
        }
    }

    /// Pure cost breakdown for a price.
    #[must_use]
    pub fn get_purchase_quote(&self, price_atomic: u64) -> PurchaseQuote {
        PurchaseQuote {
            base_price: price_atomic,
            network_fee: NETWORK_FEE_ATOMIC,
            total_cost: price_atomic + NETWORK_FEE_ATOMIC,
            currency: CURRENCY,
        }
    }

    async fn check_balance(&self, price_atomic: u64) -> LicenseResult<()> {
        let address = self.wallet.address().await?;
        let balance = self.rpc.balance(&address).await?;
        let required = price_atomic + NETWORK_FEE_ATOMIC;
        if balance.coin < required {
            return Err(LicenseError::InsufficientBalance {
                required,
                available: balance.coin,
            });
        }
        Ok(())
    }
}
