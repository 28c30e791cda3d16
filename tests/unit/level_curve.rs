use life_tracker_mcp::level::{cost_for_level, BASE_XP};
use life_tracker_mcp::*;

#[test]
fn test_first_thresholds() {
    assert_eq!(xp_threshold_for_level(1), 0);
    assert_eq!(xp_threshold_for_level(2), 100);
    assert_eq!(xp_threshold_for_level(3), 250);
    assert_eq!(xp_threshold_for_level(4), 475);
    assert_eq!(cost_for_level(1), BASE_XP);
}

#[test]
fn test_level_never_decreases_with_more_xp() {
    let mut previous = level_for_xp(0);
    for xp in (0..20_000).step_by(7) {
        let level = level_for_xp(xp);
        assert!(level >= previous, "level dropped at {} xp", xp);
        previous = level;
    }
}

#[test]
fn test_threshold_maps_back_to_its_level() {
    for level in 1..30 {
        let threshold = xp_threshold_for_level(level) as i64;
        assert_eq!(level_for_xp(threshold), level);
        if threshold > 0 {
            assert_eq!(level_for_xp(threshold - 1), level - 1);
        }
    }
}

#[test]
fn test_level_info_through_server() {
    let info = LifeTrackerServer::level_info(249);
    assert_eq!(info.level, 2);
    assert_eq!(info.current_in_level, 149);
    assert_eq!(info.needed_for_level, 150);

    let negative = LifeTrackerServer::level_info(-40);
    assert_eq!(negative.level, 1);
    assert_eq!(negative.current_in_level, 0);
}
