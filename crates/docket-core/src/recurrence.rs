use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::debug;

use crate::error::CoreError;
use crate::models::{
    Frequency, MaterializationConfig, TaskInstance, TaskTemplate, TodayGuard, UpcomingOccurrence,
};

const WEEKDAY_CODES: [(Weekday, &str); 7] = [
    (Weekday::Mon, "mon"),
    (Weekday::Tue, "tue"),
    (Weekday::Wed, "wed"),
    (Weekday::Thu, "thu"),
    (Weekday::Fri, "fri"),
    (Weekday::Sat, "sat"),
    (Weekday::Sun, "sun"),
];

/// Three-letter lowercase code for a weekday, e.g. `"mon"`.
#[inline]
pub fn weekday_code(weekday: Weekday) -> &'static str {
    WEEKDAY_CODES[weekday.num_days_from_monday() as usize].1
}

/// Parses a three-letter weekday code, ignoring case and surrounding whitespace.
pub fn parse_weekday_code(code: &str) -> Option<Weekday> {
    let code = code.trim().to_lowercase();
    WEEKDAY_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(weekday, _)| *weekday)
}

/// Parses a comma-separated weekday list leniently: unknown codes and
/// duplicates are dropped, first-seen order is kept.
pub fn parse_weekday_list(list: &str) -> Vec<Weekday> {
    let mut weekdays = Vec::with_capacity(7);
    for code in list.split(',') {
        if let Some(weekday) = parse_weekday_code(code) {
            if !weekdays.contains(&weekday) {
                weekdays.push(weekday);
            }
        }
    }
    weekdays
}

/// Parses a comma-separated weekday list strictly, for user input.
pub fn parse_weekday_list_strict(list: &str) -> Result<Vec<Weekday>, CoreError> {
    let mut weekdays = Vec::with_capacity(7);
    for code in list.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let weekday = parse_weekday_code(code).ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "Unknown weekday '{}'. Use mon, tue, wed, thu, fri, sat or sun",
                code
            ))
        })?;
        if !weekdays.contains(&weekday) {
            weekdays.push(weekday);
        }
    }
    Ok(weekdays)
}

/// A template's recurrence rule: the frequency tag plus only the payload that
/// frequency reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceRule {
    Daily,
    Once,
    Weekly(Vec<Weekday>),
    Monthly(Option<u32>),
    OnDate(Option<NaiveDate>),
    /// A stored frequency outside the known set
    Unrecognized(String),
}

/// The persisted column form of a [`RecurrenceRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleColumns {
    pub frequency: String,
    pub weekdays: Option<String>,
    pub day_of_month: Option<i64>,
    pub specific_date: Option<NaiveDate>,
}

impl RecurrenceRule {
    /// Interprets stored template columns. Only the column selected by
    /// `frequency` is read; the rest are inert.
    pub fn from_columns(
        frequency: &str,
        weekdays: Option<&str>,
        day_of_month: Option<i64>,
        specific_date: Option<NaiveDate>,
    ) -> Self {
        match frequency.parse::<Frequency>() {
            Ok(Frequency::Daily) => RecurrenceRule::Daily,
            Ok(Frequency::Once) => RecurrenceRule::Once,
            Ok(Frequency::Weekly) => {
                RecurrenceRule::Weekly(weekdays.map(parse_weekday_list).unwrap_or_default())
            }
            Ok(Frequency::Monthly) => {
                RecurrenceRule::Monthly(day_of_month.and_then(|d| u32::try_from(d).ok()))
            }
            Ok(Frequency::Date) => RecurrenceRule::OnDate(specific_date),
            Err(_) => RecurrenceRule::Unrecognized(frequency.to_string()),
        }
    }

    pub fn to_columns(&self) -> RuleColumns {
        let mut columns = RuleColumns {
            frequency: match self {
                RecurrenceRule::Unrecognized(raw) => raw.clone(),
                _ => self.frequency().map(|f| f.to_string()).unwrap_or_default(),
            },
            weekdays: None,
            day_of_month: None,
            specific_date: None,
        };
        match self {
            RecurrenceRule::Weekly(days) => {
                let codes: Vec<&str> = days.iter().map(|d| weekday_code(*d)).collect();
                columns.weekdays = Some(codes.join(","));
            }
            RecurrenceRule::Monthly(day) => columns.day_of_month = day.map(i64::from),
            RecurrenceRule::OnDate(date) => columns.specific_date = *date,
            _ => {}
        }
        columns
    }

    pub fn frequency(&self) -> Option<Frequency> {
        match self {
            RecurrenceRule::Daily => Some(Frequency::Daily),
            RecurrenceRule::Once => Some(Frequency::Once),
            RecurrenceRule::Weekly(_) => Some(Frequency::Weekly),
            RecurrenceRule::Monthly(_) => Some(Frequency::Monthly),
            RecurrenceRule::OnDate(_) => Some(Frequency::Date),
            RecurrenceRule::Unrecognized(_) => None,
        }
    }

    /// True when the rule can never be due because its active field is
    /// missing or out of range, or its frequency is unknown.
    pub fn is_malformed(&self) -> bool {
        match self {
            RecurrenceRule::Daily | RecurrenceRule::Once => false,
            RecurrenceRule::Weekly(days) => days.is_empty(),
            RecurrenceRule::Monthly(day) => !matches!(day, Some(1..=31)),
            RecurrenceRule::OnDate(date) => date.is_none(),
            RecurrenceRule::Unrecognized(_) => true,
        }
    }

    /// Rejects rules that could never fire. Used when a template is created;
    /// stored rules are never rejected, only evaluated as not due.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            RecurrenceRule::Weekly(days) if days.is_empty() => Err(CoreError::InvalidInput(
                "A weekly template needs at least one weekday".to_string(),
            )),
            RecurrenceRule::Monthly(None) => Err(CoreError::InvalidInput(
                "A monthly template needs a day of the month".to_string(),
            )),
            RecurrenceRule::Monthly(Some(day)) if !(1..=31).contains(day) => {
                Err(CoreError::InvalidInput(format!(
                    "Day of month must be between 1 and 31, got {}",
                    day
                )))
            }
            RecurrenceRule::OnDate(None) => Err(CoreError::InvalidInput(
                "A date template needs a specific date".to_string(),
            )),
            RecurrenceRule::Unrecognized(raw) => Err(CoreError::InvalidInput(format!(
                "Unknown frequency '{}'",
                raw
            ))),
            _ => Ok(()),
        }
    }

    #[inline]
    pub fn is_due(&self, date: NaiveDate) -> bool {
        is_due(self, date)
    }
}

/// Decides whether `rule` produces a task on `date`.
///
/// Fails closed: a missing or invalid active field, or an unknown frequency,
/// is simply never due. `Once` is never due either; those templates only
/// yield tasks when added by hand.
pub fn is_due(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    match rule {
        RecurrenceRule::Daily => true,
        RecurrenceRule::Once => false,
        RecurrenceRule::Weekly(days) => days.contains(&date.weekday()),
        // No clamping: day 31 never matches a 30-day month.
        RecurrenceRule::Monthly(day) => *day == Some(date.day()),
        RecurrenceRule::OnDate(specific) => *specific == Some(date),
        RecurrenceRule::Unrecognized(_) => false,
    }
}

/// Pure planning half of materialization: which templates are due when, and
/// whether a day counts as already materialized. The repository wraps it
/// with reads and a transactional write.
#[derive(Debug, Clone, Default)]
pub struct MaterializationManager {
    config: MaterializationConfig,
}

impl MaterializationManager {
    pub fn new(config: MaterializationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(MaterializationConfig::default())
    }

    /// Whether `existing` (the owner's instances dated today) means the day
    /// has already been expanded.
    pub fn is_day_materialized(&self, existing: &[TaskInstance]) -> bool {
        match self.config.today_guard {
            TodayGuard::AnyInstance => !existing.is_empty(),
            TodayGuard::GeneratedOnly => existing.iter().any(|i| i.template_id.is_some()),
        }
    }

    /// New instances for every template due on `today`, in template order.
    pub fn plan_today(&self, templates: &[TaskTemplate], today: NaiveDate) -> Vec<TaskInstance> {
        templates
            .iter()
            .filter(|template| {
                let rule = template.rule();
                if rule.is_malformed() {
                    debug!(
                        template_id = %template.id,
                        frequency = %template.frequency,
                        "skipping template with malformed recurrence rule"
                    );
                }
                rule.is_due(today)
            })
            .map(|template| TaskInstance::from_template(template, today))
            .collect()
    }

    /// Due `(date, template)` pairs for `today + 1 ..= today + days_ahead`,
    /// sorted by date. Templates due on the same date keep their input order.
    pub fn forecast(
        &self,
        templates: &[TaskTemplate],
        today: NaiveDate,
        days_ahead: u32,
    ) -> Vec<UpcomingOccurrence> {
        let mut upcoming = Vec::new();

        for template in templates {
            let rule = template.rule();
            if rule.is_malformed() {
                continue;
            }
            for offset in 1..=u64::from(days_ahead) {
                let Some(date) = today.checked_add_days(Days::new(offset)) else {
                    break;
                };
                if rule.is_due(date) {
                    upcoming.push(UpcomingOccurrence {
                        date,
                        template: template.clone(),
                    });
                }
            }
        }

        // Stable, so ties keep template order.
        upcoming.sort_by_key(|occurrence| occurrence.date);
        upcoming
    }

    /// Gets the current configuration.
    pub fn config(&self) -> &MaterializationConfig {
        &self.config
    }
}
