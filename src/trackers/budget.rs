use std::{cmp::Reverse, collections::BTreeMap};

use chrono::NaiveDate;
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::{
    clock::Clock,
    percentage::{amount_percentage, Percentage},
    time::same_month,
};

use super::{next_id, remove_by_id, required, TrackerError, TrackerKind, TrackerRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub id: u64,
    pub kind: LineKind,
    pub category: String,
    /// Always positive, the sign comes from `kind`.
    pub amount: Decimal,
    #[serde(default)]
    pub purpose: String,
    pub date: NaiveDate,
}

impl TrackerRecord for BudgetLine {
    const KIND: TrackerKind = TrackerKind::Budget;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct LineDraft {
    pub kind: LineKind,
    pub category: String,
    pub amount: Decimal,
    pub purpose: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    /// Share of total expenses.
    pub share: Percentage,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    /// Expense categories, largest first.
    pub categories: Vec<CategoryShare>,
}

pub fn add_line(lines: &mut Vec<BudgetLine>, draft: LineDraft, clock: &dyn Clock) -> Result<u64, TrackerError> {
    let category = required("category", &draft.category)?;
    if draft.amount <= Decimal::ZERO {
        return Err(TrackerError::OutOfRange {
            field: "amount",
            requirement: "greater than zero",
            value: draft.amount.to_string(),
        });
    }
    let id = next_id(lines.iter().map(|v| v.id), clock);
    lines.push(BudgetLine {
        id,
        kind: draft.kind,
        category,
        amount: draft.amount,
        purpose: draft.purpose.trim().to_owned(),
        date: draft.date,
    });
    Ok(id)
}

pub fn remove_line(lines: &mut Vec<BudgetLine>, id: u64) -> Result<BudgetLine, TrackerError> {
    remove_by_id(lines, "budget line", id)
}

/// Lines dated in the same calendar month as `month`, oldest first.
pub fn lines_in_month(lines: &[BudgetLine], month: NaiveDate) -> Vec<&BudgetLine> {
    let mut selected = lines
        .iter()
        .filter(|v| same_month(v.date, month))
        .collect::<Vec<_>>();
    selected.sort_by_key(|v| (v.date, v.id));
    selected
}

pub fn summarize<'a>(lines: impl IntoIterator<Item = &'a BudgetLine>) -> BudgetSummary {
    let mut summary = BudgetSummary::default();
    let mut categories = BTreeMap::<&str, Decimal>::new();
    for line in lines {
        match line.kind {
            LineKind::Income => summary.income += line.amount,
            LineKind::Expense => {
                summary.expenses += line.amount;
                *categories.entry(line.category.as_str()).or_default() += line.amount;
            }
        }
    }
    summary.balance = summary.income - summary.expenses;

    let expenses = summary.expenses;
    summary.categories = categories
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category: category.to_owned(),
            amount,
            share: amount_percentage(amount, expenses),
        })
        .collect();
    summary
        .categories
        .sort_by_key(|v| (Reverse(v.amount), v.category.clone()));
    summary
}
