use chrono::NaiveDate;
use life_tracker_mcp::storage::streak_flag_key;
use life_tracker_mcp::*;
use tempfile::tempdir;

#[test]
fn test_flag_keys_differ_per_day() {
    let user = UserId::new();
    let monday = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2026, 6, 2).unwrap();

    assert_ne!(streak_flag_key(&user, monday), streak_flag_key(&user, tuesday));
    assert!(streak_flag_key(&user, monday).ends_with(":2026-06-01"));
}

#[test]
fn test_file_flags_survive_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flags.json");
    let key = streak_flag_key(&UserId::new(), NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());

    {
        let store = FileFlagStore::open(path.clone()).unwrap();
        store.set_flag(&key).unwrap();
    }

    let reopened = FileFlagStore::open(path).unwrap();
    assert!(reopened.get_flag(&key));
    assert!(!MemoryFlagStore::new().get_flag(&key));
}
