use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use docket_core::db::establish_connection;
use docket_core::error::CoreError;
use docket_core::models::*;
use docket_core::recurrence::*;
use docket_core::repository::{
    DashboardRepository, InstanceRepository, MaterializationRepository, SqliteRepository,
    TemplateRepository, UserRepository,
};
use tempfile::TempDir;
use uuid::Uuid;

/// Helper function to create a test database
async fn setup_test_db() -> (SqliteRepository, TempDir) {
    setup_test_db_with(MaterializationConfig::default()).await
}

async fn setup_test_db_with(config: MaterializationConfig) -> (SqliteRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    let repository = SqliteRepository::new(pool, MaterializationManager::new(config));

    (repository, temp_dir)
}

/// Helper function to create a test user
async fn create_test_user(repo: &SqliteRepository, name: &str) -> User {
    repo.add_user(name).await.expect("Failed to create test user")
}

/// Helper function to create a test template
async fn create_test_template(
    repo: &SqliteRepository,
    owner: Uuid,
    name: &str,
    rule: RecurrenceRule,
) -> TaskTemplate {
    repo.add_template(
        owner,
        NewTemplateData {
            name: name.to_string(),
            description: Some(format!("Test template: {}", name)),
            rule,
        },
    )
    .await
    .expect("Failed to create test template")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// 2024-03-05 is a Tuesday.
fn tuesday() -> NaiveDate {
    date(2024, 3, 5)
}

#[tokio::test]
async fn test_weekly_template_on_tuesday_creates_one_instance() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    let template = create_test_template(
        &repo,
        user.id,
        "Gym",
        RecurrenceRule::Weekly(vec![Weekday::Tue, Weekday::Thu]),
    )
    .await;

    let today = tuesday();
    assert_eq!(today.weekday(), Weekday::Tue);

    let summary = repo.materialize_today(user.id, today).await.unwrap();
    assert!(!summary.already_materialized);
    assert_eq!(summary.templates_evaluated, 1);
    assert_eq!(summary.instances_created(), 1);

    let instances = repo.find_instances_by_owner_and_date(user.id, today).await.unwrap();
    assert_eq!(instances.len(), 1);
    let instance = &instances[0];
    assert_eq!(instance.template_id, Some(template.id));
    assert_eq!(instance.user_id, user.id);
    assert_eq!(instance.name, "Gym");
    assert_eq!(instance.description.as_deref(), Some("Test template: Gym"));
    assert!(!instance.done);
    assert!(instance.completed_at.is_none());
    assert_eq!(instance.date, today);
}

#[tokio::test]
async fn test_materialize_today_is_idempotent() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Standup", RecurrenceRule::Daily).await;
    create_test_template(&repo, user.id, "Rent", RecurrenceRule::Monthly(Some(5))).await;

    let today = tuesday();
    let first = repo.materialize_today(user.id, today).await.unwrap();
    assert_eq!(first.instances_created(), 2);
    let after_first = repo.find_instances_by_owner(user.id).await.unwrap();

    let second = repo.materialize_today(user.id, today).await.unwrap();
    assert!(second.already_materialized);
    assert_eq!(second.instances_created(), 0);
    let after_second = repo.find_instances_by_owner(user.id).await.unwrap();

    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn test_materialize_today_only_creates_due_templates() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Daily", RecurrenceRule::Daily).await;
    create_test_template(&repo, user.id, "One-off", RecurrenceRule::Once).await;
    create_test_template(&repo, user.id, "Weekend", RecurrenceRule::Weekly(vec![Weekday::Sat, Weekday::Sun])).await;
    create_test_template(&repo, user.id, "Fifth", RecurrenceRule::Monthly(Some(5))).await;
    create_test_template(&repo, user.id, "Tax day", RecurrenceRule::OnDate(Some(date(2024, 4, 15)))).await;
    create_test_template(&repo, user.id, "Today only", RecurrenceRule::OnDate(Some(tuesday()))).await;

    let summary = repo.materialize_today(user.id, tuesday()).await.unwrap();
    assert_eq!(summary.templates_evaluated, 6);

    let names: Vec<String> = summary.instances.iter().map(|i| i.name.clone()).collect();
    assert_eq!(names, ["Daily", "Fifth", "Today only"]);
}

#[tokio::test]
async fn test_materialize_today_next_day_runs_again() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Standup", RecurrenceRule::Daily).await;

    repo.materialize_today(user.id, tuesday()).await.unwrap();
    let wednesday = tuesday() + Duration::days(1);
    let summary = repo.materialize_today(user.id, wednesday).await.unwrap();
    assert_eq!(summary.instances_created(), 1);

    let all = repo.find_instances_by_owner(user.id).await.unwrap();
    assert_eq!(all.len(), 2);
    // Newest date first.
    assert_eq!(all[0].date, wednesday);
    assert_eq!(all[1].date, tuesday());
}

#[tokio::test]
async fn test_missed_days_are_not_backfilled() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Standup", RecurrenceRule::Daily).await;

    repo.materialize_today(user.id, tuesday()).await.unwrap();
    repo.materialize_today(user.id, tuesday() + Duration::days(3)).await.unwrap();

    let dates: Vec<NaiveDate> = repo
        .find_instances_by_owner(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.date)
        .collect();
    assert_eq!(dates, [tuesday() + Duration::days(3), tuesday()]);
}

#[tokio::test]
async fn test_manual_task_suppresses_daily_expansion() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Standup", RecurrenceRule::Daily).await;

    let manual = repo
        .add_instance(
            user.id,
            NewInstanceData {
                name: "Buy milk".to_string(),
                description: None,
                date: tuesday(),
                template_id: None,
            },
        )
        .await
        .unwrap();
    assert!(manual.template_id.is_none());

    let summary = repo.materialize_today(user.id, tuesday()).await.unwrap();
    assert!(summary.already_materialized);

    let today = repo.find_instances_by_owner_and_date(user.id, tuesday()).await.unwrap();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].id, manual.id);
}

#[tokio::test]
async fn test_generated_only_guard_ignores_manual_tasks() {
    let (repo, _temp_dir) = setup_test_db_with(MaterializationConfig {
        today_guard: TodayGuard::GeneratedOnly,
        ..Default::default()
    })
    .await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Standup", RecurrenceRule::Daily).await;

    repo.add_instance(
        user.id,
        NewInstanceData {
            name: "Buy milk".to_string(),
            description: None,
            date: tuesday(),
            template_id: None,
        },
    )
    .await
    .unwrap();

    let summary = repo.materialize_today(user.id, tuesday()).await.unwrap();
    assert_eq!(summary.instances_created(), 1);

    // Still idempotent once a generated instance exists.
    let again = repo.materialize_today(user.id, tuesday()).await.unwrap();
    assert!(again.already_materialized);
    assert_eq!(repo.find_instances_by_owner_and_date(user.id, tuesday()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_materialization_is_scoped_to_owner() {
    let (repo, _temp_dir) = setup_test_db().await;
    let ada = create_test_user(&repo, "ada").await;
    let grace = create_test_user(&repo, "grace").await;
    create_test_template(&repo, ada.id, "Ada daily", RecurrenceRule::Daily).await;
    create_test_template(&repo, grace.id, "Grace daily", RecurrenceRule::Daily).await;

    // Grace's tasks for today must not block Ada's expansion.
    repo.materialize_today(grace.id, tuesday()).await.unwrap();
    let summary = repo.materialize_today(ada.id, tuesday()).await.unwrap();
    assert_eq!(summary.instances_created(), 1);
    assert_eq!(summary.instances[0].name, "Ada daily");

    let grace_tasks = repo.find_instances_by_owner(grace.id).await.unwrap();
    assert_eq!(grace_tasks.len(), 1);
    assert_eq!(grace_tasks[0].name, "Grace daily");

    // Foreign ids are invisible.
    let ada_task = summary.instances[0].id;
    assert!(repo.find_instance_by_id(grace.id, ada_task).await.unwrap().is_none());
    assert!(matches!(
        repo.complete_instance(grace.id, ada_task, Utc::now()).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_upcoming_forecast() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Gym", RecurrenceRule::Weekly(vec![Weekday::Tue, Weekday::Thu])).await;
    create_test_template(&repo, user.id, "Rent", RecurrenceRule::Monthly(Some(10))).await;
    create_test_template(&repo, user.id, "One-off", RecurrenceRule::Once).await;

    let upcoming = repo.upcoming(user.id, tuesday(), 7).await.unwrap();
    let entries: Vec<(NaiveDate, &str)> = upcoming
        .iter()
        .map(|o| (o.date, o.template.name.as_str()))
        .collect();
    assert_eq!(
        entries,
        [
            (date(2024, 3, 7), "Gym"),
            (date(2024, 3, 10), "Rent"),
            (date(2024, 3, 12), "Gym"),
        ]
    );

    // Deterministic and read-only.
    assert_eq!(repo.upcoming(user.id, tuesday(), 7).await.unwrap(), upcoming);
    assert!(repo.find_instances_by_owner(user.id).await.unwrap().is_empty());

    assert!(repo.upcoming(user.id, tuesday(), 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upcoming_large_horizon() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Daily", RecurrenceRule::Daily).await;
    create_test_template(&repo, user.id, "Leap day", RecurrenceRule::Monthly(Some(29))).await;

    let upcoming = repo.upcoming(user.id, date(2024, 1, 1), 366).await.unwrap();
    let daily = upcoming.iter().filter(|o| o.template.name == "Daily").count();
    let leap = upcoming.iter().filter(|o| o.template.name == "Leap day").count();
    assert_eq!(daily, 366);
    // 29th of every month from 2024-01-02 through 2025-01-01, February included in a leap year.
    assert_eq!(leap, 12);
}

#[tokio::test]
async fn test_complete_instance_keeps_first_timestamp() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Standup", RecurrenceRule::Daily).await;
    let summary = repo.materialize_today(user.id, tuesday()).await.unwrap();
    let id = summary.instances[0].id;

    let first_time = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
    let completed = repo.complete_instance(user.id, id, first_time).await.unwrap();
    assert!(completed.done);
    assert_eq!(completed.completed_at, Some(first_time));

    let later = first_time + Duration::hours(2);
    let again = repo.complete_instance(user.id, id, later).await.unwrap();
    assert!(again.done);
    assert_eq!(again.completed_at, Some(first_time));
}

#[tokio::test]
async fn test_update_instance_description() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    let task = repo
        .add_instance(
            user.id,
            NewInstanceData {
                name: "Write report".to_string(),
                description: Some("draft".to_string()),
                date: tuesday(),
                template_id: None,
            },
        )
        .await
        .unwrap();

    let updated = repo
        .update_instance_description(user.id, task.id, Some("final".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("final"));
    assert_eq!(updated.name, "Write report");
    assert_eq!(updated.date, tuesday());

    let cleared = repo.update_instance_description(user.id, task.id, None).await.unwrap();
    assert!(cleared.description.is_none());

    let missing = repo.update_instance_description(user.id, Uuid::now_v7(), None).await;
    assert!(matches!(missing, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_add_instance_from_once_template() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    let template = create_test_template(&repo, user.id, "Renew passport", RecurrenceRule::Once).await;

    // Never materialized on its own...
    let summary = repo.materialize_today(user.id, tuesday()).await.unwrap();
    assert_eq!(summary.instances_created(), 0);

    // ...but can be added by hand.
    let task = repo
        .add_instance(
            user.id,
            NewInstanceData {
                name: String::new(),
                description: None,
                date: tuesday(),
                template_id: Some(template.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(task.name, "Renew passport");
    assert_eq!(task.description.as_deref(), Some("Test template: Renew passport"));
    assert_eq!(task.template_id, Some(template.id));
}

#[tokio::test]
async fn test_add_instance_validation() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;

    let empty = repo
        .add_instance(user.id, NewInstanceData { name: "  ".to_string(), description: None, date: tuesday(), template_id: None })
        .await;
    assert!(matches!(empty, Err(CoreError::InvalidInput(_))));

    let unknown_template = repo
        .add_instance(
            user.id,
            NewInstanceData { name: String::new(), description: None, date: tuesday(), template_id: Some(Uuid::now_v7()) },
        )
        .await;
    assert!(matches!(unknown_template, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_add_template_validation() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;

    let cases = vec![
        ("Weekly", RecurrenceRule::Weekly(vec![])),
        ("Monthly", RecurrenceRule::Monthly(None)),
        ("Monthly", RecurrenceRule::Monthly(Some(32))),
        ("Dated", RecurrenceRule::OnDate(None)),
        ("Hourly", RecurrenceRule::Unrecognized("hourly".to_string())),
        ("", RecurrenceRule::Daily),
    ];

    for (name, rule) in cases {
        let result = repo
            .add_template(user.id, NewTemplateData { name: name.to_string(), description: None, rule: rule.clone() })
            .await;
        assert!(matches!(result, Err(CoreError::InvalidInput(_))), "{:?} should be rejected", rule);
    }

    assert!(repo.find_templates_by_owner(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_templates_round_trip_and_order() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    let weekly = create_test_template(&repo, user.id, "Gym", RecurrenceRule::Weekly(vec![Weekday::Mon, Weekday::Fri])).await;
    let dated = create_test_template(&repo, user.id, "Tax day", RecurrenceRule::OnDate(Some(date(2024, 4, 15)))).await;
    let monthly = create_test_template(&repo, user.id, "Rent", RecurrenceRule::Monthly(Some(1))).await;

    let templates = repo.find_templates_by_owner(user.id).await.unwrap();
    let ids: Vec<Uuid> = templates.iter().map(|t| t.id).collect();
    assert_eq!(ids, [weekly.id, dated.id, monthly.id]);

    assert_eq!(templates[0].rule(), RecurrenceRule::Weekly(vec![Weekday::Mon, Weekday::Fri]));
    assert_eq!(templates[1].rule(), RecurrenceRule::OnDate(Some(date(2024, 4, 15))));
    assert_eq!(templates[2].rule(), RecurrenceRule::Monthly(Some(1)));
    assert_eq!(templates[0].weekdays.as_deref(), Some("mon,fri"));
    assert!(templates[0].day_of_month.is_none());

    let found = repo.find_template_by_id(user.id, dated.id).await.unwrap();
    assert_eq!(found, Some(dated));
}

#[tokio::test]
async fn test_stored_malformed_templates_are_never_due() {
    let (repo, temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    let pool = establish_connection(&temp_dir.path().join("test.db").to_string_lossy())
        .await
        .unwrap();

    // Rows written by something other than add_template.
    for (name, frequency, weekdays, day) in [
        ("Unknown", "hourly", None, None),
        ("Weekly without days", "weekly", Some(""), None),
        ("Monthly without day", "monthly", None, None),
        ("Date without date", "date", None, None),
        ("Daily with stale fields", "daily", Some("sat"), Some(31i64)),
    ] {
        sqlx::query(
            "INSERT INTO task_templates (id, user_id, name, frequency, weekdays, day_of_month, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::now_v7())
        .bind(user.id)
        .bind(name)
        .bind(frequency)
        .bind(weekdays)
        .bind(day)
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();
    }

    let summary = repo.materialize_today(user.id, tuesday()).await.unwrap();
    assert_eq!(summary.templates_evaluated, 5);
    let names: Vec<&str> = summary.instances.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Daily with stale fields"]);

    let upcoming = repo.upcoming(user.id, tuesday(), 7).await.unwrap();
    assert_eq!(upcoming.len(), 7);
    assert!(upcoming.iter().all(|o| o.template.name == "Daily with stale fields"));
}

#[tokio::test]
async fn test_failed_batch_rolls_back_and_retry_succeeds() {
    let (repo, temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    for name in ["A", "B", "C"] {
        create_test_template(&repo, user.id, name, RecurrenceRule::Daily).await;
    }
    let pool = establish_connection(&temp_dir.path().join("test.db").to_string_lossy())
        .await
        .unwrap();

    // The third insert of the batch fails after the first two succeeded.
    sqlx::query(
        "CREATE TRIGGER fail_on_c BEFORE INSERT ON task_instances
         WHEN NEW.name = 'C'
         BEGIN SELECT RAISE(ABORT, 'write failed'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = repo.materialize_today(user.id, tuesday()).await;
    assert!(matches!(result, Err(CoreError::Database(_))));
    assert!(repo.find_instances_by_owner(user.id).await.unwrap().is_empty());

    sqlx::query("DROP TRIGGER fail_on_c").execute(&pool).await.unwrap();

    let summary = repo.materialize_today(user.id, tuesday()).await.unwrap();
    assert!(!summary.already_materialized);
    assert_eq!(summary.instances_created(), 3);
    let names: Vec<String> = repo
        .find_instances_by_owner_and_date(user.id, tuesday())
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names.len(), 3);
    for name in ["A", "B", "C"] {
        assert!(names.iter().any(|n| n == name), "{:?}", names);
    }
}

#[tokio::test]
async fn test_default_upcoming_days_comes_from_config() {
    let (repo, _temp_dir) = setup_test_db().await;
    assert_eq!(repo.default_upcoming_days(), 7);

    let (repo, _temp_dir) = setup_test_db_with(MaterializationConfig {
        upcoming_days: 14,
        ..Default::default()
    })
    .await;
    assert_eq!(repo.default_upcoming_days(), 14);
}

#[tokio::test]
async fn test_users() {
    let (repo, _temp_dir) = setup_test_db().await;
    let ada = create_test_user(&repo, "  ada ").await;
    assert_eq!(ada.username, "ada");

    let duplicate = repo.add_user("ada").await;
    assert!(matches!(duplicate, Err(CoreError::AlreadyExists(_))));
    assert!(matches!(repo.add_user(" ").await, Err(CoreError::InvalidInput(_))));

    let found = repo.find_user_by_name("ada").await.unwrap().unwrap();
    assert_eq!(found.id, ada.id);
    assert!(repo.find_user_by_id(ada.id).await.unwrap().is_some());
    assert!(repo.find_user_by_name("nobody").await.unwrap().is_none());

    create_test_user(&repo, "grace").await;
    let names: Vec<String> = repo.find_users().await.unwrap().into_iter().map(|u| u.username).collect();
    assert_eq!(names, ["ada", "grace"]);
}

#[tokio::test]
async fn test_short_id_lookup() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    let template = create_test_template(&repo, user.id, "Standup", RecurrenceRule::Daily).await;
    let summary = repo.materialize_today(user.id, tuesday()).await.unwrap();
    let instance = &summary.instances[0];

    let prefix = &instance.id.to_string()[..8];
    let found = repo.find_instances_by_short_id_prefix(user.id, prefix).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, instance.id);

    let upper = template.id.to_string()[..8].to_uppercase();
    let found = repo.find_templates_by_short_id_prefix(user.id, &upper).await.unwrap();
    assert_eq!(found.len(), 1);

    let other = create_test_user(&repo, "grace").await;
    assert!(repo.find_instances_by_short_id_prefix(other.id, prefix).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_dashboard_materializes_then_reads() {
    let (repo, _temp_dir) = setup_test_db().await;
    let user = create_test_user(&repo, "ada").await;
    create_test_template(&repo, user.id, "Standup", RecurrenceRule::Daily).await;
    create_test_template(&repo, user.id, "Gym", RecurrenceRule::Weekly(vec![Weekday::Thu])).await;

    let monday = tuesday() - Duration::days(1);
    repo.materialize_today(user.id, monday).await.unwrap();

    let dashboard = repo.load_dashboard(user.id, tuesday(), 3).await.unwrap();
    assert_eq!(dashboard.today, tuesday());
    assert_eq!(dashboard.summary.instances_created(), 1);
    assert_eq!(dashboard.today_tasks.len(), 1);
    assert_eq!(dashboard.today_tasks[0].name, "Standup");
    assert_eq!(dashboard.templates.len(), 2);

    let history_dates: Vec<NaiveDate> = dashboard.history.iter().map(|g| g.date).collect();
    assert_eq!(history_dates, [tuesday(), monday]);

    // Wed, Thu (x2), Fri.
    assert_eq!(dashboard.upcoming.len(), 4);

    // A second render changes nothing.
    let again = repo.load_dashboard(user.id, tuesday(), 3).await.unwrap();
    assert!(again.summary.already_materialized);
    assert_eq!(again.today_tasks, dashboard.today_tasks);
}

#[tokio::test]
async fn test_in_memory_database() {
    let pool = establish_connection("sqlite::memory:").await.unwrap();
    let repo = SqliteRepository::new(pool, MaterializationManager::with_defaults());
    let user = repo.add_user("ada").await.unwrap();
    create_test_template(&repo, user.id, "Standup", RecurrenceRule::Daily).await;
    let summary = repo.materialize_today(user.id, tuesday()).await.unwrap();
    assert_eq!(summary.instances_created(), 1);
}
