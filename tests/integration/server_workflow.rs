use chrono::{Duration, NaiveDate};
use life_tracker_mcp::*;
use tempfile::tempdir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 9).unwrap()
}

async fn open_server(dir: &std::path::Path) -> LifeTrackerServer {
    let config = Config::with_database(dir.join("organizer.db"));
    LifeTrackerServer::new(config)
        .await
        .expect("Failed to create server")
}

#[tokio::test]
async fn test_award_survives_restart_without_double_counting() {
    let dir = tempdir().unwrap();

    {
        let server = open_server(dir.path()).await;
        let task = Task::new("Submit form".to_string(), today().and_hms_opt(10, 0, 0)).unwrap();
        server.storage().create_task(&task).await.unwrap();
        server.storage().set_task_completed(&task.id, true).await.unwrap();

        let outcome = server.evaluate_streak(today()).await.unwrap();
        assert_eq!(outcome.action, StreakAction::AwardRestart);
    }

    let server = open_server(dir.path()).await;
    let again = server.evaluate_streak(today()).await.unwrap();
    assert_eq!(again.action, StreakAction::NoAction);
    assert_eq!(server.storage().get_profile().await.unwrap().streak_days, 1);
    assert!(dir.path().join("local_flags.json").exists());
}

#[tokio::test]
async fn test_consecutive_days_build_a_streak() {
    let dir = tempdir().unwrap();
    let server = open_server(dir.path()).await;
    let habit = Habit::new("Walk".to_string(), None).unwrap();
    server.storage().create_habit(&habit).await.unwrap();

    let start = today() - Duration::days(2);
    for offset in 0..3 {
        let day = start + Duration::days(offset);
        let completion = HabitCompletion::new(habit.id.clone(), day, day).unwrap();
        server.storage().insert_completion(&completion).await.unwrap();
        server.evaluate_streak(day).await.unwrap();
    }

    let profile = server.storage().get_profile().await.unwrap();
    assert_eq!(profile.streak_days, 3);
    assert_eq!(profile.last_active_date, Some(today()));
}

#[tokio::test]
async fn test_stale_streak_resets_on_next_check() {
    let dir = tempdir().unwrap();
    let server = open_server(dir.path()).await;
    server
        .storage()
        .update_profile(&ProfilePatch {
            streak_days: Some(9),
            last_active_date: Some(Some(today() - Duration::days(4))),
            ..Default::default()
        })
        .await
        .unwrap();

    let outcome = server.evaluate_streak(today()).await.unwrap();
    assert_eq!(outcome.action, StreakAction::ResetToZero);
    assert_eq!(server.storage().get_profile().await.unwrap().streak_days, 0);
}

#[tokio::test]
async fn test_habit_streak_and_xp_through_server() {
    let dir = tempdir().unwrap();
    let server = open_server(dir.path()).await;
    let habit = Habit::new("Floss".to_string(), None).unwrap();
    server.storage().create_habit(&habit).await.unwrap();

    let local = local_today();
    for back in 0..2 {
        let day = local - Duration::days(back);
        let completion = HabitCompletion::new(habit.id.clone(), day, local).unwrap();
        server.storage().insert_completion(&completion).await.unwrap();
    }
    assert_eq!(server.habit_streak(&habit.id).await.unwrap(), 2);

    let change = server.award_xp(260).await.unwrap();
    assert_eq!(change.new_level, 3);
    assert!(server.habit_streak(&HabitId::new()).await.is_err());
}
