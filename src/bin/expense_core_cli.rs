use std::{fs, path::PathBuf, process};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;

use expense_core::{
    cli::{output, prompt},
    codec::{backup, csv},
    errors::ExpenseError,
    ledger::{MonthKey, Repeat, TransactionDraft},
    query::{self, QueryParams, SortMode},
    store::{FileStore, Session},
};

#[derive(Parser)]
#[command(
    name = "expense-core",
    version,
    about = "Personal expense tracker: transactions, budgets, and monthly statistics"
)]
struct Cli {
    /// Directory holding the ledger file (defaults to the platform data dir).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a transaction (repeating ones also create future occurrences).
    Add {
        description: String,
        amount: f64,
        #[arg(long, default_value = "Other")]
        category: String,
        #[arg(long, default_value = "")]
        payment: String,
        #[arg(long, default_value = "")]
        tag: String,
        /// ISO date; defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// none, daily, weekly, or monthly.
        #[arg(long, default_value = "none")]
        repeat: String,
    },
    /// Record a preset transaction dated today.
    Quick {
        /// One of: coffee, lunch, groceries, fuel.
        name: String,
    },
    /// Show a month's table and statistics.
    List {
        /// YYYY-MM; defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        /// Category filter; omit for all categories.
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        search: String,
        /// date_desc, date_asc, amount_desc, or amount_asc.
        #[arg(long, default_value = "date_desc")]
        sort: String,
    },
    /// Set the budget for a month.
    Budget { month: String, amount: f64 },
    /// Remove a transaction by id.
    Delete { id: String },
    /// Write a month's transactions as CSV.
    ExportCsv {
        month: String,
        /// Output path; defaults to expenses-<month>.csv in the current dir.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Append transactions from a CSV file (single commit at the end).
    ImportCsv { file: PathBuf },
    /// Write a full-ledger JSON backup.
    Backup {
        /// Output path; defaults to expense-backup.json in the current dir.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the ledger from a JSON backup.
    Restore { file: PathBuf },
    /// Toggle between the light and dark theme.
    Theme,
    /// Clear all data after confirmation.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

struct QuickPreset {
    name: &'static str,
    description: &'static str,
    amount: f64,
    category: &'static str,
    payment: &'static str,
}

const QUICK_PRESETS: [QuickPreset; 4] = [
    QuickPreset {
        name: "coffee",
        description: "Coffee",
        amount: 45.0,
        category: "Food",
        payment: "Cash",
    },
    QuickPreset {
        name: "lunch",
        description: "Lunch",
        amount: 120.0,
        category: "Food",
        payment: "Cash",
    },
    QuickPreset {
        name: "groceries",
        description: "Groceries",
        amount: 350.0,
        category: "Groceries",
        payment: "Card",
    },
    QuickPreset {
        name: "fuel",
        description: "Fuel",
        amount: 500.0,
        category: "Transport",
        payment: "Card",
    },
];

fn main() {
    expense_core::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        output::error(err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ExpenseError> {
    let store = match &cli.data_dir {
        Some(dir) => FileStore::in_dir(dir),
        None => FileStore::default_in_data_dir(),
    };
    let mut session = Session::open(store)?;

    match cli.command {
        Command::Add {
            description,
            amount,
            category,
            payment,
            tag,
            date,
            repeat,
        } => {
            let draft = TransactionDraft {
                description,
                amount,
                category,
                payment,
                tag,
                date: date.as_deref().map(parse_date).transpose()?,
                repeat: Repeat::parse(&repeat),
                ..TransactionDraft::default()
            };
            let created = session.add_with_recurrence(draft)?;
            output::success(format!(
                "added {} ({} {:.2} on {})",
                created[0].id, created[0].description, created[0].amount, created[0].date
            ));
            if created.len() > 1 {
                output::info(format!(
                    "created {} future occurrences",
                    created.len() - 1
                ));
            }
        }
        Command::Quick { name } => {
            let preset = QUICK_PRESETS
                .iter()
                .find(|preset| preset.name == name.to_lowercase())
                .ok_or_else(|| invalid_input(format!("unknown quick-add preset `{name}`")))?;
            let created = session.add_transaction(TransactionDraft {
                description: preset.description.into(),
                amount: preset.amount,
                category: preset.category.into(),
                payment: preset.payment.into(),
                ..TransactionDraft::default()
            })?;
            output::success(format!(
                "added {} {:.2} on {}",
                created.description, created.amount, created.date
            ));
        }
        Command::List {
            month,
            category,
            search,
            sort,
        } => {
            let today = Local::now().date_naive();
            let month = match month {
                Some(raw) => parse_month(&raw)?,
                None => MonthKey::of(today),
            };
            let params = QueryParams {
                month,
                category,
                search,
                sort: SortMode::parse(&sort),
                today,
            };
            render_list(&query::run(session.ledger(), &params), month);
        }
        Command::Budget { month, amount } => {
            let month = parse_month(&month)?;
            session.set_budget(month, amount)?;
            output::success(format!("budget for {month} set"));
        }
        Command::Delete { id } => {
            if session.delete_transaction(&id)? {
                output::success(format!("deleted {id}"));
            } else {
                output::info(format!("no transaction with id {id}"));
            }
        }
        Command::ExportCsv { month, out } => {
            let month = parse_month(&month)?;
            let text = session.export_csv(month)?;
            let path = out.unwrap_or_else(|| PathBuf::from(csv::export_file_name(month)));
            fs::write(&path, text)?;
            output::success(format!("wrote {}", path.display()));
        }
        Command::ImportCsv { file } => {
            let text = fs::read_to_string(&file)?;
            let imported = session.import_csv(&text)?;
            output::success(format!("imported {imported} transactions"));
        }
        Command::Backup { out } => {
            let snapshot = session.backup_json()?;
            let path = out.unwrap_or_else(|| PathBuf::from(backup::BACKUP_FILE_NAME));
            fs::write(&path, snapshot)?;
            output::success(format!("wrote {}", path.display()));
        }
        Command::Restore { file } => {
            let text = fs::read_to_string(&file)?;
            session.restore_json(&text)?;
            output::success(format!(
                "restored {} transactions",
                session.ledger().transaction_count()
            ));
        }
        Command::Theme => {
            let theme = session.toggle_theme()?;
            output::success(format!("theme is now {theme:?}"));
        }
        Command::Reset { yes } => {
            if yes || prompt::confirm_action("Clear all local data?", false)? {
                session.reset_all()?;
                output::success("ledger cleared");
            } else {
                output::info("reset cancelled");
            }
        }
    }
    Ok(())
}

fn render_list(result: &query::QueryResult, month: MonthKey) {
    println!("{}", format!("Transactions for {month}").bold());
    if result.rows.is_empty() {
        println!("  (none match)");
    }
    for tx in &result.rows {
        println!(
            "  {}  {:<28} {:<12} {:<10} {:>10.2}",
            tx.date, tx.description, tx.category, tx.tag, tx.amount
        );
    }

    println!();
    println!(
        "  month total: {:.2} across {} transactions",
        result.month_total, result.month_count
    );
    match &result.budget {
        Some(budget) if budget.over => println!(
            "  budget: {}",
            format!("{:.2} over ({:.2} remaining)", budget.limit, budget.remaining).red()
        ),
        Some(budget) => println!(
            "  budget: {}",
            format!("{:.2} remaining of {:.2}", budget.remaining, budget.limit).green()
        ),
        None => println!("  budget: -"),
    }
    match &result.biggest_expense {
        Some(tx) => println!("  biggest expense: {} ({:.2})", tx.description, tx.amount),
        None => println!("  biggest expense: -"),
    }
    println!(
        "  top tag: {}",
        result.top_tag.as_deref().unwrap_or("-")
    );
    println!("  average daily spend: {:.2}", result.average_daily);

    if !result.category_breakdown.is_empty() {
        println!("  by category:");
        for entry in &result.category_breakdown {
            println!("    {:<14} {:>10.2}", entry.category, entry.total);
        }
    }

    println!("  last {} days:", result.trend.len());
    for point in &result.trend {
        println!("    {}  {:>10.2}", point.day, point.total);
    }
}

fn parse_month(raw: &str) -> Result<MonthKey, ExpenseError> {
    raw.parse()
        .map_err(|err: expense_core::ledger::ParseMonthKeyError| invalid_input(err.to_string()))
}

fn parse_date(raw: &str) -> Result<NaiveDate, ExpenseError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| invalid_input(format!("invalid date `{raw}`, expected YYYY-MM-DD")))
}

fn invalid_input(message: String) -> ExpenseError {
    ExpenseError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message,
    ))
}
