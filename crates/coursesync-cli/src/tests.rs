use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use clap::Parser;
use coursesync_core::config::SyncSettings;
use coursesync_core::{Assignment, DueDateOverride, LockStatus, ModuleItem, Page, SyncReport};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::cli::{Cli, Commands, EntityKind};
use crate::commands::common::{
    format_record_fields, format_report_lines, format_timestamp, open_database, resolve_db_path,
    truncate_chars, RecordView,
};
use crate::commands::fetch::{fetch_cache_key, run_fetch};
use crate::commands::import::run_import;
use crate::commands::list::list_lines;
use crate::commands::show::show_lines;
use crate::commands::status::record_counts;
use crate::error::CliError;

fn assignment(id: &str, name: &str) -> Assignment {
    Assignment {
        id: id.to_string(),
        course_id: Some("1".to_string()),
        name: name.to_string(),
        details: None,
        due_at: None,
        unlock_at: None,
        lock_at: None,
        points_possible: Some(10.0),
        html_url: None,
        published: true,
        lock: LockStatus::default(),
    }
}

fn write_json(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("store").join("coursesync.db")
}

async fn import(entity: EntityKind, file: &Path, db_path: &Path) -> SyncReport {
    run_import(entity, file, None, &SyncSettings::default(), db_path)
        .await
        .unwrap()
}

#[test]
fn cli_parses_entity_names() {
    let cli = Cli::try_parse_from(["coursesync", "list", "module-items", "-l", "5", "--json"])
        .unwrap();
    match cli.command {
        Commands::List {
            entity,
            limit,
            json,
        } => {
            assert_eq!(entity, EntityKind::ModuleItems);
            assert_eq!(limit, 5);
            assert!(json);
        }
        _ => panic!("expected list command"),
    }

    assert!(Cli::try_parse_from(["coursesync", "list", "notes"]).is_err());
}

#[test]
fn cli_accepts_db_path_after_subcommand() {
    let cli = Cli::try_parse_from(["coursesync", "status", "--db-path", "/tmp/x.db"]).unwrap();
    assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/x.db")));
}

#[test]
fn entity_labels_match_value_names() {
    for entity in EntityKind::ALL {
        let cli = Cli::try_parse_from(["coursesync", "list", entity.label()]).unwrap();
        assert!(matches!(cli.command, Commands::List { entity: parsed, .. } if parsed == entity));
    }
}

#[test]
fn resolve_db_path_prefers_cli_then_settings() {
    let settings = SyncSettings {
        db_path: Some(PathBuf::from("/from/settings.db")),
        ..SyncSettings::default()
    };

    assert_eq!(
        resolve_db_path(Some(PathBuf::from("/from/cli.db")), &settings).unwrap(),
        PathBuf::from("/from/cli.db")
    );
    assert_eq!(
        resolve_db_path(None, &settings).unwrap(),
        PathBuf::from("/from/settings.db")
    );
}

#[test]
fn truncate_chars_collapses_and_shortens() {
    assert_eq!(truncate_chars("  Week   1\nreading ", 40), "Week 1 reading");
    assert_eq!(
        truncate_chars("This is a very long sentence that should be shortened", 20),
        "This is a very lo..."
    );
}

#[test]
fn format_timestamp_renders_utc_or_dash() {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(format_timestamp(Some(at)), "2024-01-01 00:00 UTC");
    assert_eq!(format_timestamp(None), "-");
}

#[test]
fn assignment_summary_marks_locked_records() {
    let mut essay = assignment("55", "Essay");
    assert!(!essay.summary_line().contains("[locked]"));

    essay.lock = LockStatus {
        locked_for_user: true,
        lock_explanation: Some("Finish the quiz first".to_string()),
        can_view: false,
    };
    let line = essay.summary_line();
    assert!(line.starts_with("55"));
    assert!(line.contains("Essay"));
    assert!(line.contains("[locked]"));
}

#[test]
fn page_and_module_item_summaries() {
    let page = Page {
        id: "9".to_string(),
        url: "week-1".to_string(),
        title: "Week 1".to_string(),
        body: None,
        updated_at: None,
        published: false,
        lock: LockStatus::default(),
    };
    let line = page.summary_line();
    assert!(line.contains("week-1"));
    assert!(line.contains("(draft)"));

    let item = ModuleItem {
        id: "3".to_string(),
        module_id: Some("1".to_string()),
        title: "Intro".to_string(),
        item_type: "Page".to_string(),
        position: Some(2),
        content_id: None,
        html_url: None,
        lock: LockStatus::default(),
    };
    let line = item.summary_line();
    assert!(line.contains("  2  Page"));
    assert!(line.ends_with("Intro"));
}

#[test]
fn override_summary_shows_link_state() {
    let mut syllabus = DueDateOverride {
        id: "77".to_string(),
        title: "Syllabus".to_string(),
        due_at: None,
        unlock_at: None,
        lock_at: None,
        assignment_id: Some("55".to_string()),
        assignment: None,
        course_section_id: None,
        group_id: None,
        student_ids: None,
    };
    assert!(syllabus
        .summary_line()
        .ends_with("assignment=55 (not synced)"));
    assert!(!syllabus.summary_line().contains(" for "));

    syllabus.assignment = Some("55".to_string());
    assert!(syllabus.summary_line().ends_with("assignment=55"));

    syllabus.assignment = None;
    syllabus.assignment_id = None;
    assert!(syllabus.summary_line().ends_with("no assignment"));

    syllabus.student_ids = Some(vec!["3".to_string()]);
    assert!(syllabus
        .summary_line()
        .ends_with("for 1 student  no assignment"));
}

#[test]
fn format_record_fields_flattens_lock_status() {
    let lines = format_record_fields(&assignment("55", "Essay")).unwrap();
    assert!(lines.iter().any(|line| line.starts_with("name") && line.ends_with("Essay")));
    assert!(lines
        .iter()
        .any(|line| line.starts_with("lock.can_view") && line.ends_with("true")));
    assert!(lines
        .iter()
        .any(|line| line.starts_with("due_at") && line.ends_with('-')));
}

#[test]
fn format_report_lines_lists_failures() {
    let report = SyncReport {
        created: 2,
        updated: 1,
        failures: vec![coursesync_core::sync::RecordFailure {
            index: 3,
            id: None,
            error: "missing field `id`".to_string(),
        }],
    };
    let lines = format_report_lines("assignments", &report);
    assert_eq!(
        lines,
        vec![
            "assignments: 2 created, 1 updated, 1 failed".to_string(),
            "  #3 id=?: missing field `id`".to_string(),
        ]
    );
}

#[test]
fn fetch_cache_key_is_scoped_by_entity() {
    assert_eq!(
        fetch_cache_key(EntityKind::Pages, " /api/v1/courses/1/pages "),
        "pages:/api/v1/courses/1/pages"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn import_then_list_and_show() {
    let dir = TempDir::new().unwrap();
    let db_path = db_path(&dir);
    let file = write_json(
        &dir,
        "assignments.json",
        r#"[{"id": 55, "name": "Essay", "points_possible": 10},
            {"id": "56", "name": "Quiz", "published": false},
            {"name": "No id"}]"#,
    );

    let report = import(EntityKind::Assignments, &file, &db_path).await;
    assert_eq!(report.created, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 2);

    let lines = list_lines::<Assignment>(10, false, &db_path).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("55"));

    let limited = list_lines::<Assignment>(1, false, &db_path).await.unwrap();
    assert_eq!(limited.len(), 1);

    let json = list_lines::<Assignment>(10, true, &db_path).await.unwrap();
    let parsed: Vec<Assignment> = serde_json::from_str(&json[0]).unwrap();
    assert_eq!(parsed[1].name, "Quiz");
    assert!(!parsed[1].published);

    let shown = show_lines::<Assignment>(EntityKind::Assignments, " 56 ", true, &db_path)
        .await
        .unwrap();
    let quiz: Assignment = serde_json::from_str(&shown[0]).unwrap();
    assert_eq!(quiz.id, "56");
}

#[tokio::test(flavor = "current_thread")]
async fn reimport_updates_instead_of_duplicating() {
    let dir = TempDir::new().unwrap();
    let db_path = db_path(&dir);
    let first = write_json(&dir, "v1.json", r#"[{"id": "1", "url": "intro", "title": "Intro"}]"#);
    let second = write_json(
        &dir,
        "v2.json",
        r#"[{"page_id": "1", "url": "intro", "title": "Introduction"}]"#,
    );

    assert_eq!(import(EntityKind::Pages, &first, &db_path).await.created, 1);
    assert_eq!(import(EntityKind::Pages, &second, &db_path).await.updated, 1);

    let db = open_database(&db_path).unwrap();
    let page: Page = db.get("1").await.unwrap().unwrap();
    assert_eq!(page.title, "Introduction");
    assert_eq!(db.count::<Page>().await.unwrap(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn overrides_link_once_assignment_is_imported() {
    let dir = TempDir::new().unwrap();
    let db_path = db_path(&dir);
    let overrides = write_json(
        &dir,
        "overrides.json",
        concat!(
            r#"{"id": "77", "title": "Syllabus", "#,
            r#""due_at": "2024-01-01T00:00:00Z", "assignment_id": "55"}"#,
        ),
    );
    let assignments = write_json(&dir, "assignments.json", r#"[{"id": "55", "name": "Essay"}]"#);

    import(EntityKind::DueDateOverrides, &overrides, &db_path).await;
    import(EntityKind::Assignments, &assignments, &db_path).await;
    import(EntityKind::DueDateOverrides, &overrides, &db_path).await;

    let lines = show_lines::<DueDateOverride>(EntityKind::DueDateOverrides, "77", false, &db_path)
        .await
        .unwrap();
    assert!(lines
        .iter()
        .any(|line| line.starts_with("assignment ") && line.ends_with("55")));

    let db = open_database(&db_path).unwrap();
    let counts = record_counts(&db).await.unwrap();
    assert_eq!(
        counts,
        vec![
            (EntityKind::Assignments, 1),
            (EntityKind::Pages, 0),
            (EntityKind::ModuleItems, 0),
            (EntityKind::DueDateOverrides, 1),
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn import_rejects_malformed_file() {
    let dir = TempDir::new().unwrap();
    let file = write_json(&dir, "bad.json", r#"[{"id": "1"}, "oops"]"#);

    let result = run_import(
        EntityKind::Assignments,
        &file,
        None,
        &SyncSettings::default(),
        &db_path(&dir),
    )
    .await;
    assert!(matches!(result, Err(CliError::Core(_))));
}

#[tokio::test(flavor = "current_thread")]
async fn import_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = run_import(
        EntityKind::Pages,
        &dir.path().join("missing.json"),
        None,
        &SyncSettings::default(),
        &db_path(&dir),
    )
    .await;
    assert!(matches!(result, Err(CliError::Io(_))));
}

#[tokio::test(flavor = "current_thread")]
async fn show_reports_missing_record() {
    let dir = TempDir::new().unwrap();
    let result =
        show_lines::<ModuleItem>(EntityKind::ModuleItems, "404", false, &db_path(&dir)).await;

    match result {
        Err(CliError::RecordNotFound { entity, id }) => {
            assert_eq!(entity, "module-items");
            assert_eq!(id, "404");
        }
        other => panic!("expected RecordNotFound, got {other:?}"),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn fetch_requires_api_configuration() {
    let dir = TempDir::new().unwrap();
    let result = run_fetch(
        EntityKind::Assignments,
        "/api/v1/courses/1/assignments",
        false,
        None,
        &SyncSettings::default(),
        &db_path(&dir),
    )
    .await;
    assert!(matches!(result, Err(CliError::ApiNotConfigured)));
}
