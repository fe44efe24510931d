use chrono::NaiveDate;
use rusqlite::{params, Connection};
use taskdesk_core::db::open_db_in_memory;
use taskdesk_core::{
    sqlite_task_service, LabelId, LabelRepository, NewLabel, NewTask, PageRequest,
    SortDirection, SortField, SqliteLabelRepository, SqliteTaskService, Task, TaskFilter,
    MAX_PAGE_SIZE,
};

const MAR_10_2025_NOON_MS: i64 = 1_741_608_000_000;
const MAR_31_2025_LAST_MS: i64 = 1_743_465_599_999;
const APR_01_2025_START_MS: i64 = 1_743_465_600_000;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_label(conn: &Connection, name: &str) -> LabelId {
    SqliteLabelRepository::try_new(conn)
        .unwrap()
        .create_label(&NewLabel::new(name, "blue"))
        .unwrap()
        .id
}

fn create(service: &SqliteTaskService<'_>, input: NewTask) -> Task {
    service.create_task(input).unwrap()
}

fn set_created_at(conn: &Connection, task: &Task, created_at: i64) {
    conn.execute(
        "UPDATE tasks SET created_at = ?2 WHERE uuid = ?1;",
        params![task.id.to_string(), created_at],
    )
    .unwrap();
}

fn titles(page: &taskdesk_core::Page<Task>) -> Vec<&str> {
    page.content.iter().map(|task| task.title.as_str()).collect()
}

fn list(service: &SqliteTaskService<'_>, filter: TaskFilter) -> taskdesk_core::Page<Task> {
    service
        .find_tasks(&filter, &PageRequest::new(0, MAX_PAGE_SIZE))
        .unwrap()
}

#[test]
fn status_filter_wins_over_every_other_criterion() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    create(
        &service,
        NewTask {
            completed: Some(true),
            priority: Some("low".to_string()),
            ..NewTask::new("done low")
        },
    );
    create(
        &service,
        NewTask {
            priority: Some("high".to_string()),
            ..NewTask::new("open high")
        },
    );

    let page = list(
        &service,
        TaskFilter {
            status: Some("completed".to_string()),
            priority: Some("high".to_string()),
            search: Some("open".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(titles(&page), vec!["done low"]);

    let page = list(
        &service,
        TaskFilter {
            status: Some("active".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(titles(&page), vec!["open high"]);
}

#[test]
fn status_all_falls_through_to_priority() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    create(
        &service,
        NewTask {
            priority: Some("low".to_string()),
            ..NewTask::new("low one")
        },
    );
    create(
        &service,
        NewTask {
            priority: Some("high".to_string()),
            completed: Some(true),
            ..NewTask::new("high one")
        },
    );

    let page = list(
        &service,
        TaskFilter {
            status: Some("all".to_string()),
            priority: Some("high".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(titles(&page), vec!["high one"]);
}

#[test]
fn unrecognized_priority_lists_everything_and_ignores_later_criteria() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    create(&service, NewTask::new("alpha"));
    create(&service, NewTask::new("beta"));

    let page = list(
        &service,
        TaskFilter {
            priority: Some("critical".to_string()),
            search: Some("alpha".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(page.total_elements, 2);
}

#[test]
fn label_filter_requires_every_requested_label() {
    let conn = open_db_in_memory().unwrap();
    let work = seed_label(&conn, "work");
    let urgent = seed_label(&conn, "urgent");
    let home = seed_label(&conn, "home");
    let service = sqlite_task_service(&conn).unwrap();

    create(
        &service,
        NewTask {
            label_ids: Some(vec![work]),
            ..NewTask::new("work only")
        },
    );
    create(
        &service,
        NewTask {
            label_ids: Some(vec![work, urgent]),
            ..NewTask::new("work urgent")
        },
    );
    create(
        &service,
        NewTask {
            label_ids: Some(vec![work, urgent, home]),
            ..NewTask::new("everything")
        },
    );

    let mut page = list(
        &service,
        TaskFilter {
            label_ids: Some(vec![urgent, work, urgent]),
            ..TaskFilter::default()
        },
    );
    page.content.sort_by(|a, b| a.title.cmp(&b.title));
    assert_eq!(titles(&page), vec!["everything", "work urgent"]);
    assert_eq!(page.total_elements, 2);

    let page = list(
        &service,
        TaskFilter {
            label_ids: Some(vec![home, 4_242]),
            ..TaskFilter::default()
        },
    );
    assert!(page.is_empty());
}

#[test]
fn due_date_range_includes_whole_end_day() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    create(
        &service,
        NewTask {
            due_date: Some(MAR_10_2025_NOON_MS),
            ..NewTask::new("mid march")
        },
    );
    create(
        &service,
        NewTask {
            due_date: Some(MAR_31_2025_LAST_MS),
            ..NewTask::new("end of march")
        },
    );
    create(
        &service,
        NewTask {
            due_date: Some(APR_01_2025_START_MS),
            ..NewTask::new("april")
        },
    );
    create(&service, NewTask::new("no due date"));

    let filter = TaskFilter {
        start_date: Some(date(2025, 3, 1)),
        end_date: Some(date(2025, 3, 31)),
        ..TaskFilter::default()
    };
    let page = service
        .find_tasks(
            &filter,
            &PageRequest::default().with_sort(SortField::DueDate, SortDirection::Asc),
        )
        .unwrap();
    assert_eq!(titles(&page), vec!["mid march", "end of march"]);
}

#[test]
fn range_needs_both_bounds_before_it_applies() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    create(&service, NewTask::new("weekly review"));
    create(&service, NewTask::new("groceries"));

    let page = list(
        &service,
        TaskFilter {
            end_date: Some(date(2000, 1, 1)),
            search: Some("REVIEW".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(titles(&page), vec!["weekly review"]);
}

#[test]
fn search_matches_title_or_description_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    create(&service, NewTask::new("Budget Meeting"));
    create(
        &service,
        NewTask {
            description: Some("prepare the BUDGET slides".to_string()),
            ..NewTask::new("slides")
        },
    );
    create(&service, NewTask::new("unrelated"));

    let page = list(
        &service,
        TaskFilter {
            search: Some("budget".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(page.total_elements, 2);
    assert!(!titles(&page).contains(&"unrelated"));
}

#[test]
fn search_ignores_case_beyond_ascii() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    create(&service, NewTask::new("Über review"));
    create(
        &service,
        NewTask {
            description: Some("ÉCOLE forms".to_string()),
            ..NewTask::new("paperwork")
        },
    );
    create(&service, NewTask::new("uber eats receipt"));

    for term in ["über", "ÜBER", "Über"] {
        let page = list(
            &service,
            TaskFilter {
                search: Some(term.to_string()),
                ..TaskFilter::default()
            },
        );
        assert_eq!(titles(&page), vec!["Über review"], "term {term}");
    }

    let page = list(
        &service,
        TaskFilter {
            search: Some("école".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(titles(&page), vec!["paperwork"]);
}

#[test]
fn search_works_on_connection_migrated_outside_open_db() {
    let mut conn = Connection::open_in_memory().unwrap();
    taskdesk_core::db::migrations::apply_migrations(&mut conn).unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    create(&service, NewTask::new("Ärger melden"));

    let page = list(
        &service,
        TaskFilter {
            search: Some("ärger".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(page.total_elements, 1);
}

#[test]
fn search_treats_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    create(&service, NewTask::new("raise price 10%"));
    create(&service, NewTask::new("raise price 100"));
    create(&service, NewTask::new("snake_case rename"));
    create(&service, NewTask::new("snakeXcase rename"));

    let page = list(
        &service,
        TaskFilter {
            search: Some("10%".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(titles(&page), vec!["raise price 10%"]);

    let page = list(
        &service,
        TaskFilter {
            search: Some("snake_case".to_string()),
            ..TaskFilter::default()
        },
    );
    assert_eq!(titles(&page), vec!["snake_case rename"]);
}

#[test]
fn paging_slices_results_and_reports_totals() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    for (index, title) in ["t1", "t2", "t3", "t4", "t5"].iter().enumerate() {
        let task = create(&service, NewTask::new(*title));
        set_created_at(&conn, &task, 1_000 + i64::try_from(index).unwrap());
    }

    let request = PageRequest::from_client(2, 2, None, None);
    let page = service
        .find_tasks(&TaskFilter::default(), &request)
        .unwrap();
    assert_eq!(titles(&page), vec!["t3", "t2"]);
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages(), 3);

    let request = PageRequest::from_client(-7, 0, None, None);
    let page = service
        .find_tasks(&TaskFilter::default(), &request)
        .unwrap();
    assert_eq!(titles(&page), vec!["t5"]);

    let request = PageRequest::from_client(9, 2, None, None);
    let page = service
        .find_tasks(&TaskFilter::default(), &request)
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.total_elements, 5);
}

#[test]
fn priority_sort_uses_rank_not_name() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    for (title, priority) in [("m", "medium"), ("l", "low"), ("h", "high")] {
        create(
            &service,
            NewTask {
                priority: Some(priority.to_string()),
                ..NewTask::new(title)
            },
        );
    }

    let desc = service
        .find_tasks(
            &TaskFilter::default(),
            &PageRequest::from_client(1, 10, Some("priority"), Some("desc")),
        )
        .unwrap();
    assert_eq!(titles(&desc), vec!["h", "m", "l"]);

    let asc = service
        .find_tasks(
            &TaskFilter::default(),
            &PageRequest::from_client(1, 10, Some("priority"), Some("asc")),
        )
        .unwrap();
    assert_eq!(titles(&asc), vec!["l", "m", "h"]);
}

#[test]
fn unknown_sort_field_falls_back_to_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let service = sqlite_task_service(&conn).unwrap();
    let older = create(&service, NewTask::new("older"));
    let newer = create(&service, NewTask::new("newer"));
    set_created_at(&conn, &older, 10);
    set_created_at(&conn, &newer, 20);

    let page = service
        .find_tasks(
            &TaskFilter::default(),
            &PageRequest::from_client(1, 10, Some("title; DROP TABLE tasks"), None),
        )
        .unwrap();
    assert_eq!(titles(&page), vec!["newer", "older"]);
}

#[test]
fn listed_tasks_carry_their_labels() {
    let conn = open_db_in_memory().unwrap();
    let work = seed_label(&conn, "work");
    let service = sqlite_task_service(&conn).unwrap();
    create(
        &service,
        NewTask {
            label_ids: Some(vec![work]),
            ..NewTask::new("tagged")
        },
    );

    let page = list(&service, TaskFilter::default());
    assert_eq!(page.content[0].labels.len(), 1);
    assert_eq!(page.content[0].labels[0].name, "work");
}
