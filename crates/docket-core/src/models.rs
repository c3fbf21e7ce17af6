use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::recurrence::RecurrenceRule;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    #[serde(with = "uuid::serde::compact")]
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// The recurrence kind of a template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    /// Never materialized automatically; only added by hand.
    Once,
    Weekly,
    Monthly,
    /// A single fixed calendar date.
    Date,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Once => "once",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Date => "date",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "once" => Ok(Frequency::Once),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "date" => Ok(Frequency::Date),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

/// A stored recurrence template.
///
/// The rule columns are kept exactly as persisted so that stale or unknown
/// values survive a round trip; [`TaskTemplate::rule`] interprets them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TaskTemplate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    /// Comma-separated weekday codes, only read for weekly templates
    pub weekdays: Option<String>,
    /// Only read for monthly templates
    pub day_of_month: Option<i64>,
    /// Only read for date templates
    pub specific_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl TaskTemplate {
    /// The recurrence rule selected by `frequency`. Columns that belong to
    /// other frequencies are ignored.
    pub fn rule(&self) -> RecurrenceRule {
        RecurrenceRule::from_columns(
            &self.frequency,
            self.weekdays.as_deref(),
            self.day_of_month,
            self.specific_date,
        )
    }
}

/// A dated task occurrence, either materialized from a template or added by hand.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TaskInstance {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Back-reference to the originating template; `None` for ad-hoc tasks
    pub template_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub done: bool,
    /// Set the first time the task is marked done and never cleared
    pub completed_at: Option<DateTime<Utc>>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl TaskInstance {
    /// Builds a fresh, not-yet-done occurrence of `template` on `date`.
    pub fn from_template(template: &TaskTemplate, date: NaiveDate) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: template.user_id,
            template_id: Some(template.id),
            name: template.name.clone(),
            description: template.description.clone(),
            done: false,
            completed_at: None,
            date,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Data Transfer Objects (DTOs)
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewTemplateData {
    pub name: String,
    pub description: Option<String>,
    pub rule: RecurrenceRule,
}

/// Data for a manually added task.
#[derive(Debug, Clone)]
pub struct NewInstanceData {
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    /// When set, name and description are taken from this template
    pub template_id: Option<Uuid>,
}

/// One forecast entry: `template` is due on `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingOccurrence {
    pub date: NaiveDate,
    pub template: TaskTemplate,
}

/// Outcome of one run of the daily materialization.
#[derive(Debug, Clone, Default)]
pub struct MaterializationSummary {
    pub date: NaiveDate,
    /// True when the day was already materialized and nothing was written
    pub already_materialized: bool,
    pub templates_evaluated: usize,
    pub instances: Vec<TaskInstance>,
}

impl MaterializationSummary {
    pub fn instances_created(&self) -> usize {
        self.instances.len()
    }
}

/// Which existing instances count as "today has already been materialized".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TodayGuard {
    /// Any instance dated today, including hand-added ones, suppresses expansion.
    #[default]
    AnyInstance,
    /// Only instances that came from a template suppress expansion.
    GeneratedOnly,
}

impl FromStr for TodayGuard {
    type Err = ParseTodayGuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "any_instance" | "any" => Ok(TodayGuard::AnyInstance),
            "generated_only" | "generated" => Ok(TodayGuard::GeneratedOnly),
            _ => Err(ParseTodayGuardError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid today guard: {0}")]
pub struct ParseTodayGuardError(String);

/// Configuration for materialization behavior - core version
/// This is separate from the CLI config to allow for type differences
#[derive(Debug, Clone)]
pub struct MaterializationConfig {
    /// Default forecast horizon in days
    pub upcoming_days: u32,
    /// Idempotence guard for the daily expansion
    pub today_guard: TodayGuard,
}

impl Default for MaterializationConfig {
    fn default() -> Self {
        Self {
            upcoming_days: 7,
            today_guard: TodayGuard::AnyInstance,
        }
    }
}

/// All instances that share a date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub instances: Vec<TaskInstance>,
}

/// Folds consecutive instances with the same date into groups, keeping the
/// incoming order of both the dates and the instances inside each group.
pub fn group_by_date(instances: Vec<TaskInstance>) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for instance in instances {
        match groups.last_mut() {
            Some(group) if group.date == instance.date => group.instances.push(instance),
            _ => groups.push(DayGroup {
                date: instance.date,
                instances: vec![instance],
            }),
        }
    }
    groups
}

/// Everything one dashboard render shows.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub summary: MaterializationSummary,
    pub today_tasks: Vec<TaskInstance>,
    pub history: Vec<DayGroup>,
    pub templates: Vec<TaskTemplate>,
    pub upcoming: Vec<UpcomingOccurrence>,
}
