use std::io::Read;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::application::{AppError, JournalEntryReadService};
use crate::domain::{
    CountCategory, GlAccountCommand, JournalEntryAssociations, JournalEntryFilter,
    JournalEntryView, OrderBy, Page, SortOrder, ValidationErrors,
};
use crate::telemetry::LogFormat;

/// glledger - General ledger tooling
#[derive(Parser)]
#[command(name = "glledger")]
#[command(about = "Validate general-ledger account commands and query journal entries")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "GLLEDGER_DATABASE", default_value = "glledger.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log format written to stderr
    #[arg(
        long,
        env = "GLLEDGER_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text,
        global = true
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// GL account commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// List journal entries
    Entries {
        #[command(flatten)]
        filter: EntryFilterArgs,

        #[command(flatten)]
        associations: AssociationArgs,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show a journal entry as JSON
    Entry {
        /// Journal entry ID
        id: i64,

        #[command(flatten)]
        associations: AssociationArgs,
    },

    /// Show the loans and clients a journal entry is assigned to
    Assignments {
        /// Journal entry ID
        id: i64,
    },

    /// Count journal-entry transactions
    Count {
        /// Category: all, reversed, unidentified_profit, unidentified_deposits
        #[arg(long, default_value = "all")]
        filter: String,

        /// Text matched against description, client, dates and amounts
        #[arg(long, default_value = "")]
        search: String,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Validate a GL account command read from a JSON file ("-" for stdin)
    Validate {
        /// Path to the JSON command
        input: String,

        /// Validate as an update instead of a create
        #[arg(long)]
        update: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct EntryFilterArgs {
    /// Filter by transaction ID
    #[arg(long)]
    pub transaction_id: Option<String>,

    /// Filter by entity type (1 = loan, 2 = saving, ...)
    #[arg(long)]
    pub entity_type: Option<i64>,

    /// Filter by office ID
    #[arg(long)]
    pub office_id: Option<i64>,

    /// Filter by GL account ID
    #[arg(long)]
    pub gl_account_id: Option<i64>,

    /// Filter from date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub from_date: Option<String>,

    /// Filter to date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to_date: Option<String>,

    /// Only manual entries; passing it at all disables --entity-type
    #[arg(long)]
    pub only_manual: Option<bool>,

    /// Only unidentified entries not linked to a loan
    #[arg(long)]
    pub only_unidentified: Option<bool>,

    /// Column to order by (e.g. journalEntry.amount)
    #[arg(long)]
    pub order_by: Option<String>,

    /// Sort order: ASC or DESC
    #[arg(long)]
    pub sort_order: Option<String>,

    /// Maximum number of entries to show
    #[arg(short, long)]
    pub limit: Option<i64>,

    /// Number of matching entries to skip
    #[arg(long)]
    pub offset: Option<i64>,
}

impl EntryFilterArgs {
    pub fn into_filter(self) -> Result<JournalEntryFilter> {
        let order_by = self
            .order_by
            .map(|column| OrderBy::new(&column).ok_or(AppError::InvalidOrderBy(column)))
            .transpose()?;
        let sort_order = self
            .sort_order
            .map(|order| SortOrder::from_str(&order).ok_or(AppError::InvalidSortOrder(order)))
            .transpose()?;

        Ok(JournalEntryFilter {
            transaction_id: self.transaction_id,
            entity_type: self.entity_type,
            office_id: self.office_id,
            gl_account_id: self.gl_account_id,
            from_date: self
                .from_date
                .map(|s| parse_date(&s))
                .transpose()
                .context("Invalid from-date")?,
            to_date: self
                .to_date
                .map(|s| parse_date(&s))
                .transpose()
                .context("Invalid to-date")?,
            only_manual_entries: self.only_manual,
            only_unidentified_entries: self.only_unidentified,
            order_by,
            sort_order,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

#[derive(Args, Debug, Default, Clone, Copy)]
pub struct AssociationArgs {
    /// Include office and organization running balances
    #[arg(long)]
    pub running_balance: bool,

    /// Include payment, note and transaction type details
    #[arg(long)]
    pub transaction_details: bool,
}

impl From<AssociationArgs> for JournalEntryAssociations {
    fn from(args: AssociationArgs) -> Self {
        JournalEntryAssociations {
            running_balance: args.running_balance,
            transaction_details: args.transaction_details,
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                JournalEntryReadService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Account(AccountCommands::Validate { input, update }) => {
                run_account_validate_command(&input, update)?;
            }

            Commands::Entries {
                filter,
                associations,
                format,
            } => {
                let service = JournalEntryReadService::connect(&self.database).await?;
                let filter = filter.into_filter()?;
                let page = service.retrieve_all(&filter, associations.into()).await?;
                print_entries(&page, &format)?;
            }

            Commands::Entry { id, associations } => {
                let service = JournalEntryReadService::connect(&self.database).await?;
                let entry = service
                    .retrieve_gl_journal_entry_by_id(id, associations.into())
                    .await?;
                println!("{}", serde_json::to_string_pretty(&entry)?);
            }

            Commands::Assignments { id } => {
                let service = JournalEntryReadService::connect(&self.database).await?;
                let assignments = service.retrieve_journal_entry_assignments(id).await?;
                if assignments.is_empty() {
                    println!("No assignments found for journal entry {}.", id);
                } else {
                    println!(
                        "{:<8} {:<14} {:<20} {:<25} FILE NUMBER",
                        "LOAN", "ACCOUNT", "STATUS", "CLIENT"
                    );
                    println!("{}", "-".repeat(80));
                    for a in &assignments {
                        println!(
                            "{:<8} {:<14} {:<20} {:<25} {}",
                            a.loan_id,
                            a.loan_account_number.as_deref().unwrap_or(""),
                            truncate(a.loan_status.as_deref().unwrap_or(""), 20),
                            truncate(a.client_name.as_deref().unwrap_or(""), 25),
                            a.client_file_number.as_deref().unwrap_or("")
                        );
                    }
                }
            }

            Commands::Count { filter, search } => {
                let service = JournalEntryReadService::connect(&self.database).await?;
                let category = CountCategory::from_str(&filter);
                let count = service.get_journal_entries_count(category, &search).await?;
                println!("{}", count);
            }
        }

        Ok(())
    }
}

fn run_account_validate_command(input: &str, update: bool) -> Result<()> {
    let payload = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read command from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read command file '{}'", input))?
    };

    let command: GlAccountCommand =
        serde_json::from_str(&payload).context("Command is not a valid GL account JSON object")?;

    let result = if update {
        command.validate_for_update()
    } else {
        command.validate_for_create()
    };

    match result {
        Ok(()) => {
            println!(
                "Valid {} command{}",
                if update { "update" } else { "create" },
                if command.is_header_account() {
                    " (header account)"
                } else {
                    ""
                }
            );
            Ok(())
        }
        Err(errors) => {
            print_validation_errors(&errors);
            Err(AppError::Validation(errors).into())
        }
    }
}

fn print_validation_errors(errors: &ValidationErrors) {
    println!("{} [{}]", errors, ValidationErrors::GLOBALISATION_CODE);
    for e in errors.errors() {
        println!(
            "  - {}: {} ({})",
            e.parameter_name, e.default_user_message, e.user_message_globalisation_code
        );
    }
}

/// Flat record for CSV output.
#[derive(Serialize)]
struct EntryCsvRow<'a> {
    id: i64,
    entry_date: String,
    office: &'a str,
    gl_code: &'a str,
    gl_account: &'a str,
    entry_type: &'a str,
    amount: String,
    currency: &'a str,
    transaction_id: &'a str,
    manual: bool,
    reversed: bool,
    comments: &'a str,
}

impl<'a> From<&'a JournalEntryView> for EntryCsvRow<'a> {
    fn from(e: &'a JournalEntryView) -> Self {
        Self {
            id: e.id,
            entry_date: e.transaction_date.to_string(),
            office: e.office_name.as_deref().unwrap_or(""),
            gl_code: e.gl_account_code.as_deref().unwrap_or(""),
            gl_account: e.gl_account_name.as_deref().unwrap_or(""),
            entry_type: &e.entry_type.value,
            amount: e.amount.to_string(),
            currency: &e.currency.code,
            transaction_id: e.transaction_id.as_deref().unwrap_or(""),
            manual: e.manual_entry,
            reversed: e.reversed,
            comments: e.comments.as_deref().unwrap_or(""),
        }
    }
}

fn print_entries(page: &Page<JournalEntryView>, format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(page)?);
        }
        "csv" => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for entry in &page.page_items {
                writer.serialize(EntryCsvRow::from(entry))?;
            }
            writer.flush()?;
        }
        _ => {
            if page.is_empty() {
                println!("No journal entries found.");
                return Ok(());
            }

            println!(
                "{:<6} {:<12} {:<10} {:<25} {:<7} {:>14} {:<5} TRANSACTION",
                "ID", "DATE", "GL CODE", "ACCOUNT", "TYPE", "AMOUNT", "CCY"
            );
            println!("{}", "-".repeat(96));
            for e in &page.page_items {
                println!(
                    "{:<6} {:<12} {:<10} {:<25} {:<7} {:>14} {:<5} {}",
                    e.id,
                    e.transaction_date.format("%Y-%m-%d"),
                    truncate(e.gl_account_code.as_deref().unwrap_or(""), 10),
                    truncate(e.gl_account_name.as_deref().unwrap_or(""), 25),
                    e.entry_type.value,
                    e.amount,
                    e.currency.code,
                    e.transaction_id.as_deref().unwrap_or("")
                );
            }
            println!();
            println!(
                "Showing {} of {} matching entries",
                page.len(),
                page.total_filtered_records
            );
        }
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}
