//! Facet extraction and grouping over a task corpus

use crate::model::{Container, FilterMetadata, GroupedData, Task};
use std::collections::BTreeMap;

/// Collect the distinct filter values across `tasks`
#[must_use]
pub fn extract_filter_metadata(tasks: &[Task]) -> FilterMetadata {
    let mut facets = FilterMetadata::default();

    for task in tasks {
        facets.tags.extend(
            task.tags
                .iter()
                .filter(|t| !t.name.is_empty())
                .map(|t| t.name.clone()),
        );

        if let Some(status) = task.status_name().filter(|s| !s.is_empty()) {
            facets.statuses.insert(status.to_string());
        }

        facets.assignees.extend(task.assignees.iter().filter_map(|a| {
            a.email
                .as_deref()
                .or(a.username.as_deref())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }));

        if let Some(project) = project_name(task) {
            facets.projects.insert(project.to_string());
        }

        if let Some(priority) = task.priority.as_ref().filter(|p| !p.priority.is_empty()) {
            facets.priorities.insert(priority.priority.clone());
        }
    }

    facets
}

/// Project name, falling back to the list name for tasks outside a project
fn project_name(task: &Task) -> Option<&str> {
    task.project
        .as_ref()
        .map(|p| p.name.as_str())
        .filter(|n| !n.is_empty())
        .or_else(|| {
            task.list
                .as_ref()
                .map(|l| l.name.as_str())
                .filter(|n| !n.is_empty())
        })
}

/// Bucket tasks by project and list, ordered by project name then list name.
///
/// Tasks keep their relative order inside a bucket.
#[must_use]
pub fn group_tasks(tasks: &[Task]) -> Vec<GroupedData> {
    let empty = Container::default();
    let mut groups: BTreeMap<(String, String, String, String), Vec<Task>> = BTreeMap::new();

    for task in tasks {
        let project = task.project.as_ref().unwrap_or(&empty);
        let list = task.list.as_ref().unwrap_or(&empty);
        groups
            .entry((
                project.name.clone(),
                list.name.clone(),
                project.id.clone(),
                list.id.clone(),
            ))
            .or_default()
            .push(task.clone());
    }

    groups
        .into_iter()
        .map(|((project_name, list_name, project_id, list_id), tasks)| GroupedData {
            project_id,
            project_name,
            list_id,
            list_name,
            tasks,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignee, Priority, Tag, TaskStatus};

    fn task(id: &str, project: &str, list: &str) -> Task {
        Task {
            project: (!project.is_empty()).then(|| Container {
                id: format!("p-{project}"),
                name: project.into(),
                ..Default::default()
            }),
            list: Some(Container {
                id: format!("l-{list}"),
                name: list.into(),
                ..Default::default()
            }),
            ..Task::new(id, format!("Task {id}"))
        }
    }

    #[test]
    fn test_extracts_all_facets() {
        let mut a = task("1", "Ops", "Backlog");
        a.tags = vec![Tag {
            name: "infra".into(),
            ..Default::default()
        }];
        a.status = Some(TaskStatus {
            status: "open".into(),
            ..Default::default()
        });
        a.assignees = vec![
            Assignee {
                email: Some("sam@example.com".into()),
                ..Default::default()
            },
            Assignee {
                username: Some("robin".into()),
                ..Default::default()
            },
        ];
        a.priority = Some(Priority {
            priority: "high".into(),
            ..Default::default()
        });

        let mut b = task("2", "", "Inbox");
        b.tags = vec![Tag {
            name: "infra".into(),
            ..Default::default()
        }];

        let facets = extract_filter_metadata(&[a, b]);
        assert_eq!(facets.tags.len(), 1);
        assert!(facets.statuses.contains("open"));
        assert!(facets.assignees.contains("sam@example.com"));
        assert!(facets.assignees.contains("robin"));
        assert_eq!(
            facets.projects.iter().collect::<Vec<_>>(),
            vec!["Inbox", "Ops"]
        );
        assert!(facets.priorities.contains("high"));
    }

    #[test]
    fn test_empty_corpus_has_empty_facets() {
        assert_eq!(extract_filter_metadata(&[]), FilterMetadata::default());
    }

    #[test]
    fn test_groups_are_ordered_and_stable() {
        let tasks = vec![
            task("1", "Zeta", "Todo"),
            task("2", "Alpha", "Doing"),
            task("3", "Zeta", "Todo"),
            task("4", "Alpha", "Backlog"),
        ];

        let groups = group_tasks(&tasks);
        let keys: Vec<(&str, &str)> = groups
            .iter()
            .map(|g| (g.project_name.as_str(), g.list_name.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("Alpha", "Backlog"), ("Alpha", "Doing"), ("Zeta", "Todo")]
        );

        let zeta = &groups[2];
        assert_eq!(zeta.project_id, "p-Zeta");
        assert_eq!(
            zeta.tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "3"]
        );
    }
}
