use crate::{
    error::{StoreError, StoreResult},
    store::ProfileStore,
    types::{Profile, ProfileUpdate},
};
use nads_central_gate::WalletAddress;
use tracing::{debug, info};

/// Look up the profile for `address`, creating it on first sight
///
/// Safe to call concurrently: a creation race lost to another caller shows up
/// as a unique violation and resolves to the row the winner created.
pub async fn ensure_profile<S>(store: &S, address: &WalletAddress) -> StoreResult<Profile>
where
    S: ProfileStore + ?Sized,
{
    if let Some(existing) = store.find_profile_by_address(address).await? {
        debug!("Found profile {} for {}", existing.id, address);
        return Ok(existing);
    }

    match store.insert_profile(address).await {
        Ok(created) => {
            info!("Created profile {} for {}", created.id, created.wallet_address);
            Ok(created)
        }
        Err(StoreError::UniqueViolation(_)) => {
            debug!("Profile for {} was created concurrently, re-fetching", address);
            store
                .find_profile_by_address(address)
                .await?
                .ok_or_else(|| StoreError::NotFound(address.profile_key()))
        }
        Err(e) => Err(e),
    }
}

/// Apply a user edit to profile `id`
pub async fn update_profile<S>(store: &S, id: &str, update: ProfileUpdate) -> StoreResult<Profile>
where
    S: ProfileStore + ?Sized,
{
    let patch = update.into_patch()?;
    let updated = store
        .update_profile(id, &patch)
        .await?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    info!("Updated profile {}", updated.id);
    Ok(updated)
}
