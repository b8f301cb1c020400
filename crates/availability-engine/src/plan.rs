//! Week-by-week project plans.
//!
//! A plan arrives as a flat task list where every task carries its week
//! number and that week's goal. This module parses it and reshapes flat task
//! rows into per-week views. Weeks always come out in the order they are
//! first seen in the input, and tasks keep their input order within a week.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AvailabilityError, Result};

/// One task of a generated plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTask {
    pub week_no: u32,
    pub task_no: u32,
    pub weekly_goal: String,
    pub task: String,
}

/// A generated project plan: project fields plus a flat task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPlan {
    pub project_name: String,
    pub description: String,
    pub category: String,
    pub product_type: String,
    pub timeline: String,
    pub tasks: Vec<PlanTask>,
}

/// A plan once its project has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub project_id: i64,
    #[serde(flatten)]
    pub plan: ProjectPlan,
}

/// The goal of one week of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGoal {
    pub week_no: u32,
    pub weekly_goal: String,
}

/// A task row as stored for a project, optionally carrying its week's goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTask {
    pub task_id: i64,
    pub week_no: u32,
    pub task_no: u32,
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_goal: Option<String>,
}

/// A task inside a [`Week`]; the week number lives on the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTask {
    pub task_id: i64,
    pub task_no: u32,
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub week_no: u32,
    pub tasks: Vec<WeekTask>,
}

/// A project with its stored tasks grouped by week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTasks {
    pub project_id: i64,
    pub project_name: String,
    pub description: String,
    pub category: String,
    pub weeks: Vec<Week>,
}

/// A task inside a [`WeeklyTasks`] view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTask {
    pub task_id: i64,
    pub week_no: u32,
    pub task_no: u32,
    pub task: String,
}

/// One week of a project: its goal and its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTasks {
    pub project_id: i64,
    pub week_no: u32,
    pub weekly_goal: String,
    pub tasks: Vec<WeeklyTask>,
}

impl ProjectPlan {
    /// Parse a generated plan. Missing or mistyped fields are an
    /// [`AvailabilityError::InvalidPayload`].
    pub fn from_json(json: &str) -> Result<Self> {
        let plan: ProjectPlan = serde_json::from_str(json)
            .map_err(|e| AvailabilityError::InvalidPayload(format!("project plan: {}", e)))?;
        debug!(
            project = %plan.project_name,
            tasks = plan.tasks.len(),
            "parsed project plan"
        );
        Ok(plan)
    }

    /// One entry per week, in first-seen order. The goal is taken from the
    /// first task of the week.
    pub fn weekly_goals(&self) -> Vec<WeeklyGoal> {
        group_first_seen(&self.tasks, |task| task.week_no)
            .into_iter()
            .map(|(week_no, tasks)| WeeklyGoal {
                week_no,
                weekly_goal: tasks[0].weekly_goal.clone(),
            })
            .collect()
    }

    pub fn into_response(self, project_id: i64) -> ProjectResponse {
        ProjectResponse {
            project_id,
            plan: self,
        }
    }
}

/// Group stored task rows into weeks, in first-seen week order.
pub fn group_by_week(tasks: &[StoredTask]) -> Vec<Week> {
    group_first_seen(tasks, |task| task.week_no)
        .into_iter()
        .map(|(week_no, tasks)| Week {
            week_no,
            tasks: tasks
                .into_iter()
                .map(|task| WeekTask {
                    task_id: task.task_id,
                    task_no: task.task_no,
                    task: task.task.clone(),
                })
                .collect(),
        })
        .collect()
}

#[derive(Deserialize)]
struct ProjectRow {
    project_id: i64,
    project_name: String,
    description: String,
    category: String,
    #[serde(default)]
    tasks: Vec<StoredTask>,
}

impl ProjectRow {
    fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AvailabilityError::InvalidPayload(format!("project tasks: {}", e)))
    }
}

impl ProjectTasks {
    /// Build the grouped view from a project row with its task rows nested
    /// under `tasks`.
    pub fn from_json(json: &str) -> Result<Self> {
        let row = ProjectRow::from_json(json)?;
        let weeks = group_by_week(&row.tasks);
        debug!(
            project_id = row.project_id,
            weeks = weeks.len(),
            "grouped project tasks"
        );
        Ok(ProjectTasks {
            project_id: row.project_id,
            project_name: row.project_name,
            description: row.description,
            category: row.category,
            weeks,
        })
    }
}

impl WeeklyTasks {
    /// Like [`WeeklyTasks::from_rows`], reading the same project row shape as
    /// [`ProjectTasks::from_json`].
    pub fn from_json(json: &str, week_no: u32) -> Result<Self> {
        let row = ProjectRow::from_json(json)?;
        Self::from_rows(row.project_id, week_no, &row.tasks)
    }

    /// Build the view of `week_no` from a project's task rows. Rows of other
    /// weeks are ignored; the goal comes from the first row of the week.
    pub fn from_rows(project_id: i64, week_no: u32, rows: &[StoredTask]) -> Result<Self> {
        let week: Vec<&StoredTask> = rows.iter().filter(|row| row.week_no == week_no).collect();
        let first = week.first().ok_or_else(|| {
            AvailabilityError::InvalidPayload(format!("no tasks for week {}", week_no))
        })?;
        let weekly_goal = first.weekly_goal.clone().ok_or_else(|| {
            AvailabilityError::InvalidPayload(format!(
                "task {} of week {} has no weekly_goal",
                first.task_id, week_no
            ))
        })?;

        Ok(WeeklyTasks {
            project_id,
            week_no,
            weekly_goal,
            tasks: week
                .into_iter()
                .map(|row| WeeklyTask {
                    task_id: row.task_id,
                    week_no: row.week_no,
                    task_no: row.task_no,
                    task: row.task.clone(),
                })
                .collect(),
        })
    }
}

/// Group items by key, keeping keys in first-seen order and items in input
/// order within each group.
fn group_first_seen<T, K, F>(items: &[T], key: F) -> Vec<(K, Vec<&T>)>
where
    K: PartialEq + Copy,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<(K, Vec<&T>)> = Vec::new();
    for item in items {
        let k = key(item);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}
