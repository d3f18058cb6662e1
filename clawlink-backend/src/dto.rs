//! Request and response bodies.

use clawlink_attestation::OwnershipAttestation;
use clawlink_registry::BotRecord;
use serde::{Deserialize, Serialize};

/// `POST /api/clawbots/register` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    /// `<algorithm>:<key>` public key
    #[serde(default)]
    pub public_key: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Where the bot's identity server listens
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// `POST /api/clawbots/claim` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimBody {
    /// The six-digit code shown by the bot
    #[serde(default)]
    pub claim_code: Option<String>,
}

/// Successful claim.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    /// The bot record after the claim
    pub bot_record: BotRecord,
    /// The attestation issued for the new owner
    pub attestation: OwnershipAttestation,
}

/// `GET /health` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
}
