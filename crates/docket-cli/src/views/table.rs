use chrono::{Datelike, NaiveDate};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use docket_core::models::{DayGroup, TaskInstance, TaskTemplate, UpcomingOccurrence};
use docket_core::recurrence::{weekday_code, RecurrenceRule};

fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Human-readable summary of a template's rule
pub fn describe_rule(rule: &RecurrenceRule) -> String {
    match rule {
        RecurrenceRule::Daily => "every day".to_string(),
        RecurrenceRule::Once => "once (add by hand)".to_string(),
        RecurrenceRule::Weekly(days) if days.is_empty() => "weekly (no days)".to_string(),
        RecurrenceRule::Weekly(days) => {
            let codes: Vec<&str> = days.iter().map(|d| weekday_code(*d)).collect();
            format!("weekly on {}", codes.join(", "))
        }
        RecurrenceRule::Monthly(Some(day)) => format!("monthly on day {}", day),
        RecurrenceRule::Monthly(None) => "monthly (no day)".to_string(),
        RecurrenceRule::OnDate(Some(date)) => format!("on {}", date),
        RecurrenceRule::OnDate(None) => "on a date (none set)".to_string(),
        RecurrenceRule::Unrecognized(raw) => format!("unknown frequency '{}'", raw),
    }
}

fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => format!("{} (today)", date),
        1 => format!("{} (tomorrow)", date),
        -1 => format!("{} (yesterday)", date),
        _ => format!("{} ({})", date, date.weekday()),
    }
}

pub fn display_tasks(tasks: &[TaskInstance]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Status", "Description"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));

        let mut display_name = String::new();
        if task.template_id.is_some() {
            display_name.push('↻'); // Came from a template
            display_name.push(' ');
        }
        display_name.push_str(&task.name);

        let mut name_cell = Cell::new(display_name);
        let status_cell = if task.done {
            name_cell = name_cell
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey);
            let text = match task.completed_at {
                Some(at) => format!("Done {}", at.humanize()),
                None => "Done".to_string(),
            };
            Cell::new(text).fg(Color::Green)
        } else {
            Cell::new("Pending").fg(Color::Yellow)
        };
        row.add_cell(name_cell);
        row.add_cell(status_cell);
        row.add_cell(Cell::new(task.description.as_deref().unwrap_or("")));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_templates(templates: &[TaskTemplate]) {
    if templates.is_empty() {
        println!("No templates found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Repeats", "Description"]);

    for template in templates {
        let rule = template.rule();
        let mut rule_cell = Cell::new(describe_rule(&rule));
        if rule.is_malformed() {
            rule_cell = rule_cell.fg(Color::Red);
        }

        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&template.id)));
        row.add_cell(Cell::new(&template.name));
        row.add_cell(rule_cell);
        row.add_cell(Cell::new(template.description.as_deref().unwrap_or("")));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_upcoming(upcoming: &[UpcomingOccurrence], today: NaiveDate) {
    if upcoming.is_empty() {
        println!("Nothing coming up.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Name", "Template"]);

    for occurrence in upcoming {
        let mut row = Row::new();
        row.add_cell(Cell::new(day_label(occurrence.date, today)));
        row.add_cell(Cell::new(&occurrence.template.name));
        row.add_cell(Cell::new(short_id(&occurrence.template.id)).fg(Color::DarkGrey));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_history(history: &[DayGroup], today: NaiveDate) {
    if history.is_empty() {
        println!("No tasks found.");
        return;
    }

    for group in history {
        let done = group.instances.iter().filter(|i| i.done).count();
        println!(
            "{}  {}/{} done",
            day_label(group.date, today),
            done,
            group.instances.len()
        );
        display_tasks(&group.instances);
    }
}
