use crate::model::NormalizedTransaction;
use std::collections::HashSet;
use tracing::warn;

/// Collapses records that share a transaction id, keeping the first one seen in input order.
///
/// Records are compared by `transaction_id` alone. Two records with the same id and different
/// content are still duplicates, and every occurrence after the first is discarded. When there
/// are no duplicates the input is returned as-is.
pub fn dedupe(records: Vec<NormalizedTransaction>) -> Vec<NormalizedTransaction> {
    let distinct = records
        .iter()
        .map(|r| r.transaction_id())
        .collect::<HashSet<i64>>()
        .len();
    if distinct == records.len() {
        return records;
    }

    warn!(
        "Detected {} duplicate sales records. Removing them...",
        records.len() - distinct
    );
    let mut seen = HashSet::with_capacity(distinct);
    records
        .into_iter()
        .filter(|r| seen.insert(r.transaction_id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Financials};
    use chrono::NaiveDate;

    fn record(id: i64, name: &str) -> NormalizedTransaction {
        NormalizedTransaction {
            transaction_id: id,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            raw_name: name.to_string(),
            standardized_name: name.to_string(),
            matched: true,
            quantity: 1,
            unit_price: Amount::ZERO,
            payment_method: "cash".to_string(),
            staff_name: "Olena".to_string(),
            financials: Financials::default(),
        }
    }

    #[test]
    fn test_no_duplicates_is_unchanged() {
        let input = vec![record(1, "a"), record(2, "b"), record(3, "c")];
        let output = dedupe(input.clone());
        assert_eq!(output, input);
    }

    #[test]
    fn test_first_occurrence_survives() {
        let input = vec![
            record(1, "first"),
            record(2, "b"),
            record(1, "second"),
            record(3, "c"),
            record(1, "third"),
        ];
        let output = dedupe(input);
        // N = 5, K = 3 share an id: N - K + 1 = 3
        assert_eq!(output.len(), 3);
        let ids: Vec<i64> = output.iter().map(|r| r.transaction_id()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(output[0].raw_name(), "first");
    }

    #[test]
    fn test_empty() {
        assert!(dedupe(Vec::new()).is_empty());
    }
}
