//! Greedy minimal-key search.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::Result;

use super::validator::{validate, KeyValidationResult};

/// One entry in the reduction trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    /// Initial candidate: base key followed by every item-level column.
    Seed,
    /// Null-rescue: null-bearing non-base columns dropped in one step.
    DropNullColumns { dropped: Vec<String> },
    /// One column removed by the reduction loop.
    Remove { column: String },
}

/// Snapshot of the candidate after one validation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionStep {
    #[serde(flatten)]
    pub action: StepAction,
    /// Candidate columns after this step.
    pub columns: Vec<String>,
    pub column_count: usize,
    pub is_valid: bool,
    pub unique_count: usize,
    pub duplicate_count: usize,
}

impl ReductionStep {
    fn from_validation(action: StepAction, validation: &KeyValidationResult) -> Self {
        Self {
            action,
            columns: validation.columns.clone(),
            column_count: validation.columns.len(),
            is_valid: validation.is_valid,
            unique_count: validation.unique_count,
            duplicate_count: validation.duplicate_count,
        }
    }
}

/// Result of the minimal-key search.
///
/// `minimal_key` always contains every `base_key` column: base columns are
/// never removed, not even by the null-rescue branch. The surviving key is irreducible (no single
/// remaining non-base column can be dropped without breaking validity) but
/// not necessarily the globally smallest valid key; first-fit removal order
/// determines the outcome, and the trace records that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimalKeyResult {
    /// The surviving candidate key.
    pub minimal_key: Vec<String>,
    /// The caller-supplied base key.
    pub base_key: Vec<String>,
    /// `minimal_key` minus `base_key`, in key order.
    pub added_columns: Vec<String>,
    /// Columns successfully eliminated, in elimination order.
    pub removed_columns: Vec<String>,
    /// Every validation step taken, seed included.
    pub iterations: Vec<ReductionStep>,
    /// Whether `minimal_key` is a valid key.
    pub is_valid: bool,
    /// Validation of the final candidate.
    pub validation: KeyValidationResult,
}

impl MinimalKeyResult {
    fn new(
        minimal_key: Vec<String>,
        base_key: &[String],
        removed_columns: Vec<String>,
        iterations: Vec<ReductionStep>,
        validation: KeyValidationResult,
    ) -> Self {
        let added_columns = minimal_key
            .iter()
            .filter(|c| !base_key.contains(c))
            .cloned()
            .collect();
        Self {
            is_valid: validation.is_valid,
            minimal_key,
            base_key: base_key.to_vec(),
            added_columns,
            removed_columns,
            iterations,
            validation,
        }
    }
}

/// Find an irreducible valid key extending `base_key`.
///
/// The search seeds with the base key plus every item-level column (base
/// columns first, item columns in the order given), then:
///
/// 1. If the seed fails on duplicates, the search terminates immediately:
///    column removal can never fix a duplicate failure, and the seed already
///    used every available column.
/// 2. If the seed fails on nulls alone, the null-bearing non-base columns
///    are dropped in one step and the remainder re-validated once. Failure
///    after that rescue terminates the search.
/// 3. Otherwise the reduction loop scans the candidate front to back, trying
///    to remove the first non-base column whose removal keeps the key
///    valid; every committed removal restarts the scan. The loop ends when
///    a full scan removes nothing.
///
/// Key failures never raise: the result carries `is_valid = false` with
/// diagnostic counts. `Err` is reserved for `InvalidColumn`.
pub fn find_minimal_key(
    dataset: &Dataset,
    base_key: &[String],
    item_level_columns: &[String],
) -> Result<MinimalKeyResult> {
    // Seed: base columns first, then item-level columns not already present.
    let mut candidate: Vec<String> = base_key.to_vec();
    for col in item_level_columns {
        if !candidate.contains(col) {
            candidate.push(col.clone());
        }
    }

    let mut removed_columns = Vec::new();
    let mut iterations = Vec::new();

    let mut validation = validate(dataset, &candidate)?;
    iterations.push(ReductionStep::from_validation(StepAction::Seed, &validation));

    if !validation.is_valid {
        if validation.duplicate_count > 0 {
            // Rows collide even on the widest available key. Only column
            // addition could help, and there is nothing left to add.
            return Ok(MinimalKeyResult::new(
                candidate,
                base_key,
                removed_columns,
                iterations,
                validation,
            ));
        }

        // Unique but null-bearing: drop exactly the null-bearing columns,
        // except base columns, and re-validate once.
        let dropped: Vec<String> = validation
            .null_counts
            .keys()
            .filter(|c| !base_key.contains(c))
            .cloned()
            .collect();
        candidate.retain(|c| !dropped.contains(c));

        validation = validate(dataset, &candidate)?;
        iterations.push(ReductionStep::from_validation(
            StepAction::DropNullColumns {
                dropped: dropped.clone(),
            },
            &validation,
        ));
        removed_columns.extend(dropped);

        if !validation.is_valid {
            return Ok(MinimalKeyResult::new(
                candidate,
                base_key,
                removed_columns,
                iterations,
                validation,
            ));
        }
    }

    // Reduction loop: first-fit greedy removal, restarting after every
    // committed removal.
    loop {
        let mut removed_any = false;

        for col in candidate.clone() {
            if base_key.contains(&col) {
                continue;
            }

            let trial: Vec<String> = candidate.iter().filter(|c| **c != col).cloned().collect();
            let trial_validation = validate(dataset, &trial)?;

            if trial_validation.is_valid {
                candidate = trial;
                validation = trial_validation;
                iterations.push(ReductionStep::from_validation(
                    StepAction::Remove { column: col.clone() },
                    &validation,
                ));
                removed_columns.push(col);
                removed_any = true;
                break;
            }
        }

        if !removed_any {
            break;
        }
    }

    Ok(MinimalKeyResult::new(
        candidate,
        base_key,
        removed_columns,
        iterations,
        validation,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    fn make_dataset(columns: Vec<&str>, rows: Vec<Vec<Value>>) -> Dataset {
        Dataset::new(columns.into_iter().map(String::from).collect(), rows).unwrap()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// The worked scenario: scope A1 with rows over (OrderID, ItemID, Qty,
    /// Note). Greedy reduction removes ItemID then Note; Qty cannot go
    /// because [OrderID, Note] leaves a duplicate pair on "y".
    #[test]
    fn test_scenario_orderid_qty() {
        let ds = make_dataset(
            vec!["OrderID", "ItemID", "Qty", "Note"],
            vec![
                vec![Value::from("A1"), Value::from(100), Value::from(2), Value::from("x")],
                vec![Value::from("A1"), Value::from(101), Value::from(1), Value::from("y")],
                vec![Value::from("A1"), Value::from(102), Value::from(5), Value::from("y")],
            ],
        );

        let result =
            find_minimal_key(&ds, &cols(&["OrderID"]), &cols(&["ItemID", "Qty", "Note"])).unwrap();

        assert!(result.is_valid);
        assert_eq!(result.minimal_key, cols(&["OrderID", "Qty"]));
        assert_eq!(result.added_columns, cols(&["Qty"]));
        assert_eq!(result.removed_columns, cols(&["ItemID", "Note"]));
    }

    #[test]
    fn test_base_key_already_valid_reduces_to_base() {
        let ds = make_dataset(
            vec!["id", "payload"],
            vec![
                vec![Value::from(1), Value::from("a")],
                vec![Value::from(2), Value::from("a")],
            ],
        );
        let result = find_minimal_key(&ds, &cols(&["id"]), &cols(&["payload"])).unwrap();

        assert!(result.is_valid);
        assert_eq!(result.minimal_key, cols(&["id"]));
        assert_eq!(result.removed_columns, cols(&["payload"]));
        assert!(result.added_columns.is_empty());
    }

    #[test]
    fn test_duplicate_failure_terminates_immediately() {
        // Two fully identical rows: no key over these columns can work.
        let ds = make_dataset(
            vec!["a", "b"],
            vec![
                vec![Value::from(1), Value::from("x")],
                vec![Value::from(1), Value::from("x")],
            ],
        );
        let result = find_minimal_key(&ds, &cols(&["a"]), &cols(&["b"])).unwrap();

        assert!(!result.is_valid);
        assert!(result.removed_columns.is_empty());
        assert_eq!(result.iterations.len(), 1);
        assert_eq!(result.validation.duplicate_count, 1);
    }

    #[test]
    fn test_null_rescue_succeeds() {
        // "b" distinguishes the rows but carries a null; "c" also
        // distinguishes them and is clean.
        let ds = make_dataset(
            vec!["a", "b", "c"],
            vec![
                vec![Value::from("k"), Value::Null, Value::from(1)],
                vec![Value::from("k"), Value::from(9), Value::from(2)],
            ],
        );
        let result = find_minimal_key(&ds, &cols(&["a"]), &cols(&["b", "c"])).unwrap();

        assert!(result.is_valid);
        assert_eq!(result.minimal_key, cols(&["a", "c"]));
        assert!(result.removed_columns.contains(&"b".to_string()));
        // The rescue step is recorded in the trace.
        assert!(result
            .iterations
            .iter()
            .any(|s| matches!(s.action, StepAction::DropNullColumns { .. })));
    }

    #[test]
    fn test_null_rescue_failure_reports_invalid() {
        // Dropping the null column collapses the remaining tuples.
        let ds = make_dataset(
            vec!["a", "b"],
            vec![
                vec![Value::from("k"), Value::Null],
                vec![Value::from("k"), Value::from(1)],
            ],
        );
        let result = find_minimal_key(&ds, &cols(&["a"]), &cols(&["b"])).unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.minimal_key, cols(&["a"]));
    }

    #[test]
    fn test_base_columns_survive_null_rescue() {
        // The base key itself carries a null: rescue must not drop it, so
        // the search fails but the superset property holds.
        let ds = make_dataset(
            vec!["a", "b"],
            vec![
                vec![Value::Null, Value::from(1)],
                vec![Value::from("k"), Value::from(2)],
            ],
        );
        let result = find_minimal_key(&ds, &cols(&["a"]), &cols(&["b"])).unwrap();

        assert!(!result.is_valid);
        assert!(result.minimal_key.contains(&"a".to_string()));
    }

    #[test]
    fn test_trace_is_deterministic() {
        let ds = make_dataset(
            vec!["k", "p", "q"],
            vec![
                vec![Value::from("s"), Value::from(1), Value::from(1)],
                vec![Value::from("s"), Value::from(2), Value::from(2)],
            ],
        );
        let a = find_minimal_key(&ds, &cols(&["k"]), &cols(&["p", "q"])).unwrap();
        let b = find_minimal_key(&ds, &cols(&["k"]), &cols(&["p", "q"])).unwrap();

        assert_eq!(a.minimal_key, b.minimal_key);
        assert_eq!(a.removed_columns, b.removed_columns);
        assert_eq!(a.iterations.len(), b.iterations.len());
        // First-fit removes "p" first; "q" alone then keeps the key valid.
        assert_eq!(a.minimal_key, cols(&["k", "q"]));
    }
}
