use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use docket_core::error::CoreError;
use docket_core::models::{Frequency, NewTemplateData, User};
use docket_core::recurrence::{parse_weekday_list_strict, RecurrenceRule};
use docket_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use crate::cli::{AddTemplateCommand, TemplateCommand, TemplateSubcommand};
use crate::parser::parse_date;
use crate::views::table::{describe_rule, display_templates};

pub async fn template_command(repo: &impl Repository, user: &User, today: NaiveDate, command: TemplateCommand) -> Result<()> {
    match command.command {
        TemplateSubcommand::Add(add) => add_template(repo, user, today, add).await,
        TemplateSubcommand::List => {
            let templates = repo.find_templates_by_owner(user.id).await?;
            display_templates(&templates);
            Ok(())
        }
    }
}

async fn add_template(repo: &impl Repository, user: &User, today: NaiveDate, command: AddTemplateCommand) -> Result<()> {
    let rule = build_rule(&command, today)?;

    let template = repo
        .add_template(
            user.id,
            NewTemplateData {
                name: command.name,
                description: command.description,
                rule,
            },
        )
        .await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Created template: {}",
        "✓".style(success_style),
        template.name.bright_white().bold()
    );
    println!(
        "  {} Template ID: {}",
        "→".blue(),
        template.id.to_string().yellow()
    );
    println!("  {} Repeats {}", "→".blue(), describe_rule(&template.rule()));
    Ok(())
}

/// Turns the frequency flag and the one option it needs into a rule.
/// Options that belong to other frequencies are rejected.
fn build_rule(command: &AddTemplateCommand, today: NaiveDate) -> Result<RecurrenceRule> {
    let frequency = Frequency::from(command.every);

    let stray = [
        ("--on", command.on.is_some(), Frequency::Weekly),
        ("--day", command.day.is_some(), Frequency::Monthly),
        ("--date", command.date.is_some(), Frequency::Date),
    ];
    for (flag, present, owner) in stray {
        if present && frequency != owner {
            return Err(anyhow!(CoreError::InvalidInput(format!(
                "{} only applies to --every {}",
                flag, owner
            ))));
        }
    }

    let rule = match frequency {
        Frequency::Daily => RecurrenceRule::Daily,
        Frequency::Once => RecurrenceRule::Once,
        Frequency::Weekly => {
            let on = command.on.as_deref().ok_or_else(|| {
                anyhow!(CoreError::InvalidInput(
                    "Weekly templates need --on (e.g. --on mon,wed,fri)".to_string()
                ))
            })?;
            RecurrenceRule::Weekly(parse_weekday_list_strict(on)?)
        }
        Frequency::Monthly => RecurrenceRule::Monthly(command.day),
        Frequency::Date => RecurrenceRule::OnDate(
            command.date.as_deref().map(|d| parse_date(d, today)).transpose()?,
        ),
    };
    Ok(rule)
}
