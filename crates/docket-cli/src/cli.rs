use clap::{Parser, Subcommand, ValueEnum};
use docket_core::models::Frequency;

/// Docket: a personal tracker for daily, weekly, monthly and one-off tasks
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// The user whose tasks to work with (overrides the configured user)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Pretend today is this date (YYYY-MM-DD or e.g. "next friday")
    #[arg(long, global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Register a new user
    Register(RegisterCommand),
    /// Create today's tasks and show today, the forecast and the history (default)
    Dashboard(DashboardCommand),
    /// Add an ad-hoc task for today
    Add(AddCommand),
    /// Manage recurring task templates
    Template(TemplateCommand),
    /// Mark a task as done
    Do(DoCommand),
    /// Change a task's description
    Describe(DescribeCommand),
    /// Show upcoming occurrences without creating anything
    Upcoming(UpcomingCommand),
    /// Show all tasks grouped by day
    History,
}

#[derive(Parser, Debug, Clone)]
pub struct RegisterCommand {
    /// The username to register
    pub username: String,
}

#[derive(Parser, Debug, Clone, Default)]
pub struct DashboardCommand {
    /// How many days ahead to forecast
    #[clap(long)]
    pub days: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The name of the task
    #[clap(required_unless_present = "template")]
    pub name: Option<String>,
    /// The description of the task
    #[clap(short, long)]
    pub description: Option<String>,
    /// Copy name and description from this template (ID or prefix)
    #[clap(short, long)]
    pub template: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct TemplateCommand {
    #[command(subcommand)]
    pub command: TemplateSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TemplateSubcommand {
    /// Create a new template
    Add(AddTemplateCommand),
    /// List templates
    List,
}

#[derive(Parser, Debug, Clone)]
pub struct AddTemplateCommand {
    /// The name of the template
    pub name: String,
    /// The description copied onto each task
    #[clap(short, long)]
    pub description: Option<String>,
    /// How often the task recurs
    #[clap(long, value_enum, default_value_t = FrequencyArg::Daily)]
    pub every: FrequencyArg,
    /// Days of week for weekly templates
    #[clap(long, help = "Days of week (mon,tue,wed,thu,fri,sat,sun)")]
    pub on: Option<String>,
    /// Day of the month for monthly templates
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day: Option<u32>,
    /// The date for date templates
    #[clap(long, help = "Date for date templates (e.g., '2025-12-31' or 'next friday')")]
    pub date: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyArg {
    Daily,
    Once,
    Weekly,
    Monthly,
    Date,
}

impl From<FrequencyArg> for Frequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Daily => Frequency::Daily,
            FrequencyArg::Once => Frequency::Once,
            FrequencyArg::Weekly => Frequency::Weekly,
            FrequencyArg::Monthly => Frequency::Monthly,
            FrequencyArg::Date => Frequency::Date,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the task to mark as done
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DescribeCommand {
    /// The ID of the task to edit
    pub id: String,
    /// The new description
    #[clap(required_unless_present = "clear")]
    pub description: Option<String>,
    /// Remove the description
    #[clap(long, conflicts_with = "description")]
    pub clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct UpcomingCommand {
    /// How many days ahead to look
    #[clap(long)]
    pub days: Option<u32>,
}
