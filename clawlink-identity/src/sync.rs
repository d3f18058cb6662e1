//! Pulling the attestation from the backend into the local cache.

use std::sync::Arc;

use clawlink::BotId;
use clawlink_attestation::{OwnershipAttestation, validate_public_key, validate_subject};
use tracing::{info, warn};

use crate::cache::{AttestationCache, with_cache};
use crate::client::LinkerClient;
use crate::error::IdentityError;
use crate::keypair::Keypair;

/// Fetches the attestation for `bot_id` and caches it if it names this bot
/// and this bot's public key.
///
/// Returns `None` when the bot is not claimed yet. A mismatched attestation
/// leaves the cache untouched.
///
/// # Errors
///
/// - `ForeignAttestation` - the attestation is for another bot id or key
/// - `Request`/`UnexpectedResponse` - the fetch failed
/// - `Io`/`Serialization` - the cache could not be written
pub async fn sync_attestation(
    client: &LinkerClient,
    bot_id: &BotId,
    keypair: &Keypair,
    cache: &Arc<dyn AttestationCache>,
) -> Result<Option<OwnershipAttestation>, IdentityError> {
    let Some(attestation) = client.fetch_attestation(bot_id).await? else {
        return Ok(None);
    };

    if let Err(err) = validate_subject(&attestation, bot_id)
        .and_then(|()| validate_public_key(&attestation, keypair.public_key()))
    {
        warn!(%bot_id, error = %err, "refusing to cache attestation");
        return Err(IdentityError::ForeignAttestation {
            bot_id: bot_id.to_string(),
            reason: err.to_string(),
        });
    }

    let attestation = with_cache(cache, move |cache| {
        cache.store(&attestation).map(|()| attestation)
    })
    .await?;
    info!(%bot_id, owner = %attestation.alien_id, "attestation cached");
    Ok(Some(attestation))
}
