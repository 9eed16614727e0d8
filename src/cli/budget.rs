use anyhow::Result;
use clap::Subcommand;
use rust_decimal::Decimal;

use crate::{
    trackers::budget::{
        add_line, lines_in_month, remove_line, summarize, BudgetLine, BudgetSummary, LineDraft,
        LineKind,
    },
    utils::time::{format_day, month_bounds},
};

use super::{
    output::{format_money, Painter},
    Session,
};

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    #[command(about = "Record income")]
    Income {
        category: String,
        amount: Decimal,
        #[arg(short, long, default_value = "")]
        purpose: String,
        #[arg(short, long, help = "Day of the line, today by default")]
        date: Option<String>,
    },
    #[command(about = "Record an expense")]
    Expense {
        category: String,
        amount: Decimal,
        #[arg(short, long, default_value = "")]
        purpose: String,
        #[arg(short, long, help = "Day of the line, today by default")]
        date: Option<String>,
    },
    #[command(about = "List lines of a month")]
    List {
        #[arg(short, long, help = "Any day of the month, current month by default")]
        month: Option<String>,
    },
    #[command(about = "Income, expenses and balance with a breakdown per category")]
    Summary {
        #[arg(short, long, help = "Any day of the month, current month by default")]
        month: Option<String>,
        #[arg(long, help = "Summarize every line instead of a single month")]
        all: bool,
    },
    #[command(about = "Delete a line")]
    Remove { id: u64 },
}

pub async fn process_budget_command(command: BudgetCommand, session: &Session) -> Result<()> {
    let mut lines = session.open::<BudgetLine>().await?;
    let clock = session.clock.as_ref();
    let painter = &session.painter;

    let (kind, draft) = match command {
        BudgetCommand::Income {
            category,
            amount,
            purpose,
            date,
        } => (LineKind::Income, (category, amount, purpose, date)),
        BudgetCommand::Expense {
            category,
            amount,
            purpose,
            date,
        } => (LineKind::Expense, (category, amount, purpose, date)),
        BudgetCommand::List { month } => {
            let month = session.day(month.as_deref())?;
            let (start, end) = month_bounds(month);
            println!(
                "{}",
                painter.heading(format!("{} to {}", format_day(start), format_day(end)))
            );
            print_lines(&lines_in_month(lines.items(), month), painter);
            return Ok(());
        }
        BudgetCommand::Summary { month, all } => {
            let summary = if all {
                summarize(lines.items())
            } else {
                let month = session.day(month.as_deref())?;
                summarize(lines_in_month(lines.items(), month))
            };
            print_summary(&summary, painter);
            return Ok(());
        }
        BudgetCommand::Remove { id } => {
            let removed = lines.update(|v| Ok(remove_line(v, id)?)).await?;
            println!(
                "Removed {} of {}",
                removed.category,
                format_money(removed.amount)
            );
            return Ok(());
        }
    };

    let (category, amount, purpose, date) = draft;
    let draft = LineDraft {
        kind,
        category,
        amount,
        purpose,
        date: session.day(date.as_deref())?,
    };
    let id = lines.update(|v| Ok(add_line(v, draft, clock)?)).await?;
    println!("Added budget line {id}");
    Ok(())
}

fn signed(line: &BudgetLine) -> Decimal {
    match line.kind {
        LineKind::Income => line.amount,
        LineKind::Expense => -line.amount,
    }
}

fn print_lines(lines: &[&BudgetLine], painter: &Painter) {
    if lines.is_empty() {
        println!("{}", painter.dim("No lines"));
        return;
    }
    for line in lines {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            line.id,
            format_day(line.date),
            painter.signed_money(signed(line)),
            line.category,
            painter.dim(&line.purpose)
        );
    }
}

fn print_summary(summary: &BudgetSummary, painter: &Painter) {
    println!("Income\t{}", format_money(summary.income));
    println!("Expenses\t{}", format_money(summary.expenses));
    println!("Balance\t{}", painter.signed_money(summary.balance));
    if !summary.categories.is_empty() {
        println!("{}", painter.heading("Expenses by category"));
    }
    for share in &summary.categories {
        println!(
            "{}\t{}\t{}",
            share.category,
            format_money(share.amount),
            share.share
        );
    }
}

pub fn summary_line(lines: &[BudgetLine]) -> String {
    let summary = summarize(lines);
    format!(
        "income {}, expenses {}, balance {}",
        format_money(summary.income),
        format_money(summary.expenses),
        format_money(summary.balance)
    )
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::{
        cli::test_support::run,
        storage::{document::DocumentStore, synced::Synced},
        trackers::budget::{BudgetLine, LineKind},
    };

    use super::summary_line;

    #[tokio::test]
    async fn test_budget_commands() -> Result<()> {
        let dir = tempdir()?;
        run(dir.path(), &["budget", "income", "Salary", "2500", "-d", "2018-07-01"]).await?;
        run(
            dir.path(),
            &["budget", "expense", "Rent", "900.50", "-p", "July", "-d", "2018-07-02"],
        )
        .await?;
        run(dir.path(), &["budget", "list", "-m", "2018-07-15"]).await?;
        run(dir.path(), &["budget", "summary", "--all"]).await?;

        let store = DocumentStore::new(dir.path().join("documents"))?;
        let lines = Synced::<BudgetLine, _>::load(&store, "budget").await?;
        assert_eq!(lines.items().len(), 2);
        assert_eq!(lines.items()[1].kind, LineKind::Expense);
        assert_eq!(
            summary_line(lines.items()),
            "income 2500.00, expenses 900.50, balance 1599.50"
        );

        assert!(run(dir.path(), &["budget", "expense", "Rent", "0"]).await.is_err());
        Ok(())
    }
}
