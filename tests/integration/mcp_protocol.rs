use chrono::NaiveDate;
use life_tracker_mcp::mcp::McpServer;
use life_tracker_mcp::*;
use serde_json::{json, Value};

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn new_server() -> McpServer {
    let tracker = LifeTrackerServer::with_parts(
        SqliteStorage::in_memory().unwrap(),
        Box::new(MemoryFlagStore::new()),
        XpRewards::default(),
    );
    McpServer::with_clock(tracker, fixed_today)
}

async fn call(server: &mut McpServer, id: u64, name: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    });
    let response = server.process_line(&request.to_string()).await.unwrap();
    serde_json::to_value(&response).unwrap()
}

fn text(response: &Value) -> String {
    response["result"]["content"][0]["text"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let mut server = new_server();

    let init = server
        .process_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1"}}}"#)
        .await
        .unwrap();
    let init = serde_json::to_value(&init).unwrap();
    assert_eq!(init["result"]["protocolVersion"], json!("2024-11-05"));

    let notification = server
        .process_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;
    assert!(notification.is_none());
    assert!(server.is_initialized());

    let list = server
        .process_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
        .await
        .unwrap();
    let list = serde_json::to_value(&list).unwrap();
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"habit_toggle"));
    assert!(names.contains(&"streak_check"));
}

#[tokio::test]
async fn test_completing_the_day_appends_the_award() {
    let mut server = new_server();

    let created = call(&mut server, 1, "habit_create", json!({"name": "Stretch"})).await;
    let created_text = text(&created);
    let habit_id = created_text
        .split("Habit ID: ")
        .nth(1)
        .unwrap()
        .trim()
        .to_string();

    let toggled = call(&mut server, 2, "habit_toggle", json!({"habit_id": habit_id})).await;
    let toggled_text = text(&toggled);
    assert!(toggled_text.contains("Day 1"), "{}", toggled_text);

    let status = call(&mut server, 3, "profile_status", json!({})).await;
    assert!(text(&status).contains("Streak: 1 day"));

    // a second check on the same day changes nothing
    let check = call(&mut server, 4, "streak_check", json!({})).await;
    assert!(text(&check).contains("Current streak: 1 day"));
    let profile = server.tracker().storage().get_profile().await.unwrap();
    assert_eq!(profile.streak_days, 1);
    assert_eq!(profile.xp, 5);
}

#[tokio::test]
async fn test_protocol_errors() {
    let mut server = new_server();

    let parse = server.process_line("{not json").await.unwrap();
    assert_eq!(serde_json::to_value(&parse).unwrap()["error"]["code"], json!(-32700));

    let unknown = server
        .process_line(r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#)
        .await
        .unwrap();
    assert_eq!(serde_json::to_value(&unknown).unwrap()["error"]["code"], json!(-32601));

    let bad_args = call(&mut server, 6, "task_create", json!({"due_at": "2026-03-02"})).await;
    assert_eq!(bad_args["error"]["code"], json!(-32602));

    let missing = call(&mut server, 7, "task_complete", json!({"task_id": TaskId::new().to_string()})).await;
    assert_eq!(missing["result"]["isError"], json!(true));

    let unknown_tool = call(&mut server, 8, "habit_delete", json!({})).await;
    assert!(text(&unknown_tool).contains("Unknown tool"));
}
