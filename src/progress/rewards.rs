/// XP rewards for completing items

use crate::domain::XpChange;
use crate::storage::{OrganizerStorage, StorageError};

/// Add `delta` XP (negative to revoke) and persist the recomputed level
pub async fn award_xp<S>(storage: &S, delta: i64) -> Result<XpChange, StorageError>
where
    S: OrganizerStorage + ?Sized,
{
    let profile = storage.get_profile().await?;
    let change = profile.xp_change(delta);
    if change.new_xp != change.old_xp || change.new_level != profile.level {
        storage.update_profile(&change.patch()).await?;
    }

    if change.leveled_up() {
        tracing::info!("Level up: {} -> {}", change.old_level, change.new_level);
    }
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    #[tokio::test]
    async fn test_award_and_revoke() {
        let storage = SqliteStorage::in_memory().unwrap();

        let gained = award_xp(&storage, 120).await.unwrap();
        assert_eq!(gained.new_xp, 120);
        assert_eq!(gained.new_level, 2);
        assert!(gained.leveled_up());

        let lost = award_xp(&storage, -500).await.unwrap();
        assert_eq!(lost.new_xp, 0);
        assert_eq!(lost.new_level, 1);

        let profile = storage.get_profile().await.unwrap();
        assert_eq!((profile.xp, profile.level), (0, 1));
    }
}
