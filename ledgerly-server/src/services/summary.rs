//! Grouped category summaries for chart and breakdown views.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Bucket name for transactions with no effective category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A minimal view of one transaction for aggregation: the resolved effective
/// category name and the signed amount.
#[derive(Debug, Clone, Copy)]
pub struct TxnView<'a> {
    pub category: Option<&'a str>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryGroup {
    pub name: String,
    pub value: Decimal,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CategorySummary {
    pub total: Decimal,
    pub groups: Vec<CategoryGroup>,
}

/// Summaries for a file: the expense subset (amount < 0), the income subset
/// (amount > 0), and the unified set. Zero-amount transactions contribute to
/// none of them.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FileSummary {
    pub expense: CategorySummary,
    pub income: CategorySummary,
    pub unified: CategorySummary,
}

pub fn summarize(txns: &[TxnView<'_>]) -> FileSummary {
    FileSummary {
        expense: group_by_category(
            txns.iter()
                .filter_map(|t| t.amount.map(|a| (t.category, a)))
                .filter(|(_, a)| a.is_sign_negative() && !a.is_zero()),
        ),
        income: group_by_category(
            txns.iter()
                .filter_map(|t| t.amount.map(|a| (t.category, a)))
                .filter(|(_, a)| a.is_sign_positive() && !a.is_zero()),
        ),
        unified: group_by_category(
            txns.iter()
                .filter_map(|t| t.amount.map(|a| (t.category, a)))
                .filter(|(_, a)| !a.is_zero()),
        ),
    }
}

/// Group absolute amounts by effective category name. Group order is the
/// order of first encounter; callers wanting magnitude order sort themselves.
fn group_by_category<'a, I>(items: I) -> CategorySummary
where
    I: Iterator<Item = (Option<&'a str>, Decimal)>,
{
    let mut total = Decimal::ZERO;
    let mut groups: Vec<(String, Decimal)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (category, amount) in items {
        let value = amount.abs();
        total += value;

        let key = category.unwrap_or(UNCATEGORIZED);
        match index.get(key) {
            Some(&i) => groups[i].1 += value,
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push((key.to_string(), value));
            }
        }
    }

    let groups = groups
        .into_iter()
        .map(|(name, value)| CategoryGroup {
            name,
            percentage: if total.is_zero() {
                0.0
            } else {
                (value / total).to_f64().unwrap_or(0.0) * 100.0
            },
            value,
        })
        .collect();

    CategorySummary { total, groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn txn(category: Option<&str>, amount: Decimal) -> TxnView<'_> {
        TxnView {
            category,
            amount: Some(amount),
        }
    }

    #[test]
    fn partitions_by_amount_sign() {
        let txns = vec![
            txn(Some("Groceries"), dec!(-100)),
            txn(Some("Salary"), dec!(5000)),
            txn(Some("Rent"), dec!(-2000)),
        ];

        let summary = summarize(&txns);

        assert_eq!(summary.expense.total, dec!(2100));
        assert_eq!(summary.income.total, dec!(5000));
        assert_eq!(summary.unified.total, dec!(7100));
        assert_eq!(summary.expense.groups.len(), 2);
        assert_eq!(summary.income.groups.len(), 1);
    }

    #[test]
    fn zero_amounts_contribute_nowhere() {
        let txns = vec![
            txn(Some("Groceries"), dec!(0)),
            txn(Some("Groceries"), dec!(-50)),
        ];

        let summary = summarize(&txns);

        assert_eq!(summary.expense.total, dec!(50));
        assert_eq!(summary.income.total, Decimal::ZERO);
        assert!(summary.income.groups.is_empty());
        assert_eq!(summary.unified.total, dec!(50));
        assert_eq!(summary.unified.groups.len(), 1);
    }

    #[test]
    fn missing_category_goes_to_uncategorized_bucket() {
        let txns = vec![txn(None, dec!(-75)), txn(Some("Fuel"), dec!(-25))];

        let summary = summarize(&txns);

        assert_eq!(summary.expense.groups[0].name, UNCATEGORIZED);
        assert_eq!(summary.expense.groups[0].value, dec!(75));
    }

    #[test]
    fn missing_amount_is_excluded() {
        let txns = vec![
            TxnView {
                category: Some("Fuel"),
                amount: None,
            },
            txn(Some("Fuel"), dec!(-25)),
        ];

        let summary = summarize(&txns);

        assert_eq!(summary.expense.total, dec!(25));
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let txns = vec![
            txn(Some("A"), dec!(-10)),
            txn(Some("B"), dec!(-20)),
            txn(Some("C"), dec!(-30)),
        ];

        let summary = summarize(&txns);

        let sum: f64 = summary.expense.groups.iter().map(|g| g.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_subset_has_zero_total_and_no_groups() {
        let summary = summarize(&[]);

        assert_eq!(summary.expense.total, Decimal::ZERO);
        assert!(summary.expense.groups.is_empty());
        assert!(summary.income.groups.is_empty());
        assert!(summary.unified.groups.is_empty());
    }

    #[test]
    fn group_order_is_first_encounter() {
        let txns = vec![
            txn(Some("B"), dec!(-1)),
            txn(Some("A"), dec!(-100)),
            txn(Some("B"), dec!(-1)),
        ];

        let summary = summarize(&txns);

        let names: Vec<&str> = summary
            .expense
            .groups
            .iter()
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(summary.expense.groups[0].value, dec!(2));
    }

    #[test]
    fn summarize_is_idempotent_over_the_same_input() {
        let txns = vec![
            txn(Some("Groceries"), dec!(-100)),
            txn(None, dec!(40)),
            txn(Some("Rent"), dec!(-2000)),
        ];

        let first = summarize(&txns);
        let second = summarize(&txns);

        assert_eq!(first, second);
    }
}
