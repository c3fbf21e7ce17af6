//! # Docket Core Library
//!
//! Day-granular recurring task tracking: users keep *templates* with a single
//! recurrence rule each, and Docket materializes dated *task instances* from
//! them.
//!
//! ## Features
//!
//! - **Recurrence Evaluator**: one pure function, [`recurrence::is_due`],
//!   deciding whether a rule (daily, once, weekly, monthly or a fixed date)
//!   fires on a given calendar date. Malformed rules fail closed.
//! - **Idempotent Daily Materialization**: today's instances are created at
//!   most once per day, in a single transaction.
//! - **Forecasting**: a read-only projection of upcoming occurrences over a
//!   caller-bounded horizon.
//! - **Explicit Dependencies**: the repository, the owner and the current
//!   date are always passed in, never read from ambient state.
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`recurrence`]: Rule evaluation and materialization planning
//! - [`repository`]: Data access layer with Repository pattern
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::{Utc, Weekday};
//! use docket_core::{
//!     db, models::NewTemplateData,
//!     recurrence::{MaterializationManager, RecurrenceRule},
//!     repository::{MaterializationRepository, SqliteRepository, TemplateRepository, UserRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::establish_connection("docket.db").await?;
//!     let repo = SqliteRepository::new(pool, MaterializationManager::with_defaults());
//!
//!     let user = repo.add_user("ada").await?;
//!     repo.add_template(user.id, NewTemplateData {
//!         name: "Gym".to_string(),
//!         description: None,
//!         rule: RecurrenceRule::Weekly(vec![Weekday::Tue, Weekday::Thu]),
//!     }).await?;
//!
//!     let today = Utc::now().date_naive();
//!     let summary = repo.materialize_today(user.id, today).await?;
//!     println!("created {} tasks", summary.instances_created());
//!
//!     for occurrence in repo.upcoming(user.id, today, 7).await? {
//!         println!("{}: {}", occurrence.date, occurrence.template.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod recurrence;
