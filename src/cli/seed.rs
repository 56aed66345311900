//! Demo data for local development.

use crate::db::Database;
use crate::types::{CreateTaskInput, Priority, TaskStatus};
use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::info;

pub const DEMO_EMAIL: &str = "demo@devboard.dev";
pub const CONTRIBUTOR_EMAIL: &str = "contributor@devboard.dev";

const LABELS: &[(&str, &str)] = &[
    ("bug", "#EF4444"),
    ("feature", "#10B981"),
    ("documentation", "#3B82F6"),
    ("enhancement", "#8B5CF6"),
    ("help wanted", "#F59E0B"),
    ("urgent", "#DC2626"),
];

struct SeedTask {
    owner: &'static str,
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    priority: Priority,
    labels: &'static [&'static str],
}

const TASKS: &[SeedTask] = &[
    SeedTask {
        owner: DEMO_EMAIL,
        title: "Set up project repository",
        description: "Initialize the repository, CI and code formatting.",
        status: TaskStatus::Done,
        priority: Priority::High,
        labels: &["feature"],
    },
    SeedTask {
        owner: DEMO_EMAIL,
        title: "Design database schema",
        description: "Users, sessions, tasks, labels and the task/label join table.",
        status: TaskStatus::Done,
        priority: Priority::High,
        labels: &["feature", "documentation"],
    },
    SeedTask {
        owner: DEMO_EMAIL,
        title: "Implement task CRUD operations",
        description: "Create, read, update and delete tasks with validation.",
        status: TaskStatus::InProgress,
        priority: Priority::High,
        labels: &["feature"],
    },
    SeedTask {
        owner: DEMO_EMAIL,
        title: "Add keyboard shortcuts",
        description: "Shortcuts for creating tasks and switching filters.",
        status: TaskStatus::Todo,
        priority: Priority::Medium,
        labels: &["enhancement"],
    },
    SeedTask {
        owner: DEMO_EMAIL,
        title: "Fix label color picker",
        description: "The picker resets to the default color after saving.",
        status: TaskStatus::Todo,
        priority: Priority::Low,
        labels: &["bug"],
    },
    SeedTask {
        owner: CONTRIBUTOR_EMAIL,
        title: "Improve onboarding docs",
        description: "Walk through seeding and signing in locally.",
        status: TaskStatus::InReview,
        priority: Priority::Medium,
        labels: &["documentation", "help wanted"],
    },
    SeedTask {
        owner: CONTRIBUTOR_EMAIL,
        title: "Stabilize auth callbacks",
        description: "Sessions occasionally fail to resolve after sign-in.",
        status: TaskStatus::InProgress,
        priority: Priority::Urgent,
        labels: &["bug", "urgent"],
    },
];

/// What `seed` created.
#[derive(Debug)]
pub struct SeedReport {
    pub users: usize,
    pub labels: usize,
    pub tasks: usize,
    /// Session token for the demo user.
    pub demo_token: String,
}

/// Wipe the database and insert the demo data set.
pub fn seed(db: &Database, session_ttl_ms: i64) -> Result<SeedReport> {
    db.reset()?;

    let demo = db.create_user(Some("Demo User"), DEMO_EMAIL, None)?;
    let contributor = db.create_user(Some("Contributor"), CONTRIBUTOR_EMAIL, None)?;
    let users: HashMap<&str, &str> = HashMap::from([
        (DEMO_EMAIL, demo.id.as_str()),
        (CONTRIBUTOR_EMAIL, contributor.id.as_str()),
    ]);

    let mut label_ids = HashMap::new();
    for (name, color) in LABELS {
        let label = db.create_label(name, color)?;
        label_ids.insert(*name, label.id);
    }

    for task in TASKS {
        let user_id = users
            .get(task.owner)
            .with_context(|| format!("unknown seed owner {}", task.owner))?;
        let input = CreateTaskInput {
            title: task.title.to_string(),
            description: Some(task.description.to_string()),
            status: Some(task.status),
            priority: Some(task.priority),
            due_date: None,
            label_ids: task
                .labels
                .iter()
                .filter_map(|name| label_ids.get(name).cloned())
                .collect(),
        };
        db.create_task(user_id, &input)?;
    }

    let session = db.create_session(&demo.id, session_ttl_ms)?;
    info!(
        users = users.len(),
        labels = LABELS.len(),
        tasks = TASKS.len(),
        "Database seeded"
    );

    Ok(SeedReport {
        users: users.len(),
        labels: LABELS.len(),
        tasks: TASKS.len(),
        demo_token: session.token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::now_ms;
    use crate::types::TaskFilter;

    #[test]
    fn test_seed_populates_demo_data() {
        let db = Database::open_in_memory().unwrap();
        let report = seed(&db, 60_000).unwrap();
        assert_eq!(report.users, 2);
        assert_eq!(report.labels, 6);
        assert_eq!(report.tasks, 7);

        let session = db.find_session(&report.demo_token, now_ms()).unwrap().unwrap();
        assert_eq!(session.user.email, DEMO_EMAIL);

        let demo_tasks = db.list_tasks(session.user_id(), &TaskFilter::default()).unwrap();
        assert_eq!(demo_tasks.len(), 5);
        let done = db
            .list_tasks(session.user_id(), &TaskFilter::status(TaskStatus::Done))
            .unwrap();
        assert_eq!(done.len(), 2);

        let labels = db.list_labels().unwrap();
        let feature = labels.iter().find(|l| l.label.name == "feature").unwrap();
        assert_eq!(feature.task_count, 3);
    }

    #[test]
    fn test_seed_is_repeatable() {
        let db = Database::open_in_memory().unwrap();
        seed(&db, 60_000).unwrap();
        let report = seed(&db, 60_000).unwrap();
        assert_eq!(report.tasks, 7);
        assert_eq!(db.list_labels().unwrap().len(), 6);
    }
}
