//! HTTP client for artist-delegated license signing services.
//!
//! The buyer never sees artist key material; the service receives only
//! the fields needed to reconstruct the canonical signing payload and
//! answers with a signature plus the artist's public key.

use crate::error::{LicenseError, LicenseResult};
use cadenza_types::{AlbumId, PublicKey};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Hard deadline on a signing-service round trip.
pub const SIGNING_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `POST {service}/sign-license`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignLicenseRequest {
    /// The album being purchased.
    pub album_id: AlbumId,
    /// The buyer's public key.
    pub buyer_key: PublicKey,
    /// Purchase amount in atomic units.
    pub purchase_amount: u64,
    /// Purchase time, unix seconds.
    pub timestamp: i64,
    /// License record version.
    pub version: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignLicenseResponse {
    signature: Option<String>,
    artist_key: Option<PublicKey>,
    error: Option<String>,
}

/// A co-signature obtained from a signing service.
#[derive(Debug, Clone)]
pub struct ArtistSignature {
    /// Hex-encoded Ed25519 signature over the canonical payload.
    pub signature: String,
    /// The artist key the service signed with.
    pub artist_key: PublicKey,
}

/// Client for artist signing services, with an optional default
/// endpoint that per-purchase overrides take precedence over.
pub struct SigningClient {
    http: Client,
    default_service: Option<String>,
}

impl SigningClient {
    /// Builds a client with the 10-second signing deadline baked in.
    pub fn new(default_service: Option<String>) -> LicenseResult<Self> {
        let http = Client::builder()
            .timeout(SIGNING_TIMEOUT)
            .build()
            .map_err(|e| LicenseError::SigningService(e.to_string()))?;
        Ok(Self {
            http,
            default_service,
        })
    }

    /// Replaces the default signing service endpoint.
    pub fn set_default_service(&mut self, url: impl Into<String>) {
        self.default_service = Some(url.into());
    }

    /// Requests the artist co-signature for a license payload.
    ///
    /// # Errors
    ///
    /// [`LicenseError::Timeout`] if the deadline passes,
    /// [`LicenseError::SigningService`] for every other defect: no
    /// endpoint configured, transport failure, non-success status, or
    /// a response missing signature or artist key.
    pub async fn request_signature(
        &self,
        request: &SignLicenseRequest,
        override_url: Option<&str>,
    ) -> LicenseResult<ArtistSignature> {
        let service = override_url
            .or(self.default_service.as_deref())
            .ok_or_else(|| {
                LicenseError::SigningService("no artist signing service configured".into())
            })?;

        debug!(album = %request.album_id, service, "requesting artist co-signature");

        let response = self
            .http
            .post(format!("{service}/sign-license"))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LicenseError::Timeout("signing service did not answer within 10s".into())
                } else {
                    LicenseError::SigningService(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(LicenseError::SigningService(format!(
                "signing service answered {}",
                response.status()
            )));
        }

        let body: SignLicenseResponse = response
            .json()
            .await
            .map_err(|e| LicenseError::SigningService(format!("undecodable response: {e}")))?;

        if let Some(error) = body.error {
            return Err(LicenseError::SigningService(error));
        }
        match (body.signature, body.artist_key) {
            (Some(signature), Some(artist_key)) if !signature.is_empty() => Ok(ArtistSignature {
                signature,
                artist_key,
            }),
            _ => Err(LicenseError::SigningService(
                "response missing signature or artist key".into(),
            )),
        }
    }
}
