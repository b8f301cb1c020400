//! Tests for project plan parsing and per-week task views.

use availability_engine::error::{AvailabilityError, ErrorCode};
use availability_engine::plan::{
    group_by_week, ProjectPlan, ProjectTasks, StoredTask, WeeklyGoal, WeeklyTasks,
};
use serde_json::json;

const PLAN: &str = r#"{
    "project_name": "Health Trend Tracker",
    "description": "Upload lab reports and track trends.",
    "category": "health",
    "product_type": "app",
    "timeline": "2 weeks",
    "tasks": [
        {"week_no": 1, "weekly_goal": "Setup", "task_no": 1, "task": "Define personas"},
        {"week_no": 1, "weekly_goal": "Setup", "task_no": 2, "task": "Pick the stack"},
        {"week_no": 2, "weekly_goal": "Data input", "task_no": 1, "task": "Build uploads"}
    ]
}"#;

fn row(task_id: i64, week_no: u32, task_no: u32, task: &str, goal: Option<&str>) -> StoredTask {
    StoredTask {
        task_id,
        week_no,
        task_no,
        task: task.to_string(),
        weekly_goal: goal.map(str::to_string),
    }
}

// ── Parsing ─────────────────────────────────────────────────────────────────

#[test]
fn parses_generated_plan() {
    let plan = ProjectPlan::from_json(PLAN).unwrap();
    assert_eq!(plan.project_name, "Health Trend Tracker");
    assert_eq!(plan.timeline, "2 weeks");
    assert_eq!(plan.tasks.len(), 3);
    assert_eq!(plan.tasks[2].week_no, 2);
    assert_eq!(plan.tasks[2].weekly_goal, "Data input");
}

#[test]
fn missing_project_field_is_invalid_payload() {
    let json = r#"{"project_name": "x", "description": "y", "category": "z",
                   "product_type": "app", "tasks": []}"#;
    let err = ProjectPlan::from_json(json).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPayload);
    assert!(err.to_string().contains("timeline"), "{}", err);
}

#[test]
fn missing_task_field_is_invalid_payload() {
    let json = r#"{"project_name": "x", "description": "y", "category": "z",
                   "product_type": "app", "timeline": "1 week",
                   "tasks": [{"week_no": 1, "task_no": 1, "task": "no goal"}]}"#;
    let err = ProjectPlan::from_json(json).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPayload);
    assert!(err.to_string().contains("weekly_goal"), "{}", err);
}

#[test]
fn non_json_plan_is_invalid_payload() {
    let err = ProjectPlan::from_json("Sure! Here is your plan:").unwrap_err();
    assert!(matches!(err, AvailabilityError::InvalidPayload(_)));
}

#[test]
fn response_flattens_plan_next_to_project_id() {
    let response = ProjectPlan::from_json(PLAN).unwrap().into_response(42);
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["project_id"], 42);
    assert_eq!(value["project_name"], "Health Trend Tracker");
    assert_eq!(value["tasks"][0]["task"], "Define personas");
}

#[test]
fn weekly_goals_follow_first_seen_week_order() {
    let json = r#"{"project_name": "x", "description": "y", "category": "z",
                   "product_type": "film", "timeline": "3 weeks",
                   "tasks": [
                       {"week_no": 2, "weekly_goal": "Shoot", "task_no": 1, "task": "a"},
                       {"week_no": 1, "weekly_goal": "Script", "task_no": 1, "task": "b"},
                       {"week_no": 2, "weekly_goal": "Shoot", "task_no": 2, "task": "c"}
                   ]}"#;
    let goals = ProjectPlan::from_json(json).unwrap().weekly_goals();
    assert_eq!(
        goals,
        vec![
            WeeklyGoal { week_no: 2, weekly_goal: "Shoot".to_string() },
            WeeklyGoal { week_no: 1, weekly_goal: "Script".to_string() },
        ]
    );
}

// ── Grouping stored rows ────────────────────────────────────────────────────

#[test]
fn rows_are_grouped_by_week_in_input_order() {
    let rows = vec![
        row(10, 1, 1, "first", None),
        row(11, 2, 1, "second", None),
        row(12, 1, 2, "third", None),
    ];
    let weeks = group_by_week(&rows);

    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0].week_no, 1);
    let ids: Vec<i64> = weeks[0].tasks.iter().map(|t| t.task_id).collect();
    assert_eq!(ids, vec![10, 12]);
    assert_eq!(weeks[1].week_no, 2);
    assert_eq!(weeks[1].tasks[0].task, "second");
}

#[test]
fn no_rows_means_no_weeks() {
    assert!(group_by_week(&[]).is_empty());
}

#[test]
fn project_tasks_view_from_project_row() {
    let json = r#"{
        "project_id": 7,
        "project_name": "Short film",
        "description": "Ten minutes.",
        "category": "film",
        "tasks": [
            {"task_id": 3, "week_no": 2, "task_no": 1, "task": "Shoot"},
            {"task_id": 1, "week_no": 1, "task_no": 1, "task": "Write"},
            {"task_id": 2, "week_no": 1, "task_no": 2, "task": "Cast"}
        ]
    }"#;
    let view = ProjectTasks::from_json(json).unwrap();

    assert_eq!(
        serde_json::to_value(&view).unwrap(),
        json!({
            "project_id": 7,
            "project_name": "Short film",
            "description": "Ten minutes.",
            "category": "film",
            "weeks": [
                {"week_no": 2, "tasks": [{"task_id": 3, "task_no": 1, "task": "Shoot"}]},
                {"week_no": 1, "tasks": [
                    {"task_id": 1, "task_no": 1, "task": "Write"},
                    {"task_id": 2, "task_no": 2, "task": "Cast"}
                ]}
            ]
        })
    );
}

#[test]
fn project_row_without_name_is_invalid_payload() {
    let err = ProjectTasks::from_json(r#"{"project_id": 7, "tasks": []}"#).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPayload);
}

// ── Weekly view ─────────────────────────────────────────────────────────────

#[test]
fn weekly_view_selects_one_week() {
    let rows = vec![
        row(1, 1, 1, "Write", Some("Script")),
        row(2, 2, 1, "Shoot", Some("Production")),
        row(3, 2, 2, "Review dailies", Some("Production")),
    ];
    let view = WeeklyTasks::from_rows(7, 2, &rows).unwrap();

    assert_eq!(view.project_id, 7);
    assert_eq!(view.week_no, 2);
    assert_eq!(view.weekly_goal, "Production");
    let ids: Vec<i64> = view.tasks.iter().map(|t| t.task_id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(view.tasks.iter().all(|t| t.week_no == 2));
}

#[test]
fn weekly_view_of_missing_week_is_invalid_payload() {
    let rows = vec![row(1, 1, 1, "Write", Some("Script"))];
    let err = WeeklyTasks::from_rows(7, 5, &rows).unwrap_err();
    assert_eq!(err, AvailabilityError::InvalidPayload("no tasks for week 5".to_string()));
}

#[test]
fn weekly_view_needs_a_goal() {
    let rows = vec![row(9, 1, 1, "Write", None)];
    let err = WeeklyTasks::from_rows(7, 1, &rows).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPayload);
    assert!(err.to_string().contains("task 9 of week 1"));
}

#[test]
fn weekly_view_from_project_row() {
    let json = r#"{
        "project_id": 7,
        "project_name": "Short film",
        "description": "Ten minutes.",
        "category": "film",
        "tasks": [
            {"task_id": 1, "week_no": 1, "task_no": 1, "task": "Write", "weekly_goal": "Script"},
            {"task_id": 2, "week_no": 2, "task_no": 1, "task": "Shoot", "weekly_goal": "Production"}
        ]
    }"#;
    let view = WeeklyTasks::from_json(json, 1).unwrap();

    assert_eq!(
        serde_json::to_value(&view).unwrap(),
        json!({
            "project_id": 7,
            "week_no": 1,
            "weekly_goal": "Script",
            "tasks": [{"task_id": 1, "week_no": 1, "task_no": 1, "task": "Write"}]
        })
    );
}
