//! # Value Algebra Unit Tests / 值代数单元测试
//!
//! This module tests the `Values` operators, lazy row iteration, and the
//! typed cells passed to test cases.
//!
//! 此模块测试 `Values` 运算符、惰性行迭代以及传递给测试用例的类型化单元格。

use case_matrix::core::error::HarnessError;
use case_matrix::core::exclusion::{ExcludedIndices, RangeSet};
use case_matrix::core::values::{Combination, ParamType, Value, Values};

fn cells(values: &Values) -> Vec<Vec<Value>> {
    values.iter().map(|row| row.cells).collect()
}

fn row(items: &[Value]) -> Vec<Value> {
    items.to_vec()
}

#[cfg(test)]
mod operator_tests {
    use super::*;

    #[test]
    fn test_multiply_varies_left_operand_slowest() {
        let left = Values::column([1, 2]);
        let right = Values::column(["a", "b"]);

        let product = left.multiply(&right);

        assert_eq!(product.width(), 2);
        assert_eq!(product.len(), 4);
        assert_eq!(
            cells(&product),
            vec![
                row(&[Value::Int(1), Value::from("a")]),
                row(&[Value::Int(1), Value::from("b")]),
                row(&[Value::Int(2), Value::from("a")]),
                row(&[Value::Int(2), Value::from("b")]),
            ]
        );
    }

    #[test]
    fn test_multiply_row_count_is_product_of_sizes() {
        let product = Values::column([1, 2, 3]).multiply(&Values::column([true, false, true, false]));
        assert_eq!(product.len(), 12);
        assert_eq!(product.iter().count(), 12);
    }

    #[test]
    fn test_pseudo_multiply_wraps_shorter_operand() {
        let left = Values::column([10, 11, 12, 13]);
        let right = Values::column(["b0", "b1", "b2"]);

        let zipped = left.pseudo_multiply(&right);

        assert_eq!(zipped.len(), 4);
        let second: Vec<Value> = zipped.iter().map(|r| r.cells[1].clone()).collect();
        assert_eq!(
            second,
            vec![
                Value::from("b0"),
                Value::from("b1"),
                Value::from("b2"),
                Value::from("b0")
            ]
        );
        let first: Vec<Value> = zipped.iter().map(|r| r.cells[0].clone()).collect();
        assert_eq!(first, vec![Value::Int(10), Value::Int(11), Value::Int(12), Value::Int(13)]);
    }

    #[test]
    fn test_pseudo_multiply_with_empty_operand_is_empty() {
        let empty = Values::column(Vec::<Value>::new());
        let zipped = Values::column([1, 2]).pseudo_multiply(&empty);
        assert!(zipped.is_empty());
        assert_eq!(zipped.iter().count(), 0);
    }

    #[test]
    fn test_intersect_keeps_left_order_without_duplicates() {
        let left = Values::column([3, 1, 2, 3, 4]);
        let right = Values::column([4, 3, 3, 9]);

        let common = left.intersect(&right);

        assert_eq!(cells(&common), vec![row(&[Value::Int(3)]), row(&[Value::Int(4)])]);
        assert_eq!(common.len(), 2);
    }

    #[test]
    fn test_intersect_of_different_widths_is_empty() {
        let narrow = Values::column([1, 2]);
        let wide = Values::column([1, 2]).multiply(&Values::column([1]));
        assert!(narrow.intersect(&wide).is_empty());
    }

    #[test]
    fn test_operators_do_not_mutate_operands() {
        let left = Values::column([1, 2]);
        let right = Values::column([3]);
        let _ = left.multiply(&right);
        let _ = left.pseudo_multiply(&right);
        assert_eq!(cells(&left), vec![row(&[Value::Int(1)]), row(&[Value::Int(2)])]);
        assert_eq!(cells(&right), vec![row(&[Value::Int(3)])]);
    }

    #[test]
    fn test_combine_all_folds_in_declaration_order() {
        let columns = vec![
            Values::column([1, 2]),
            Values::column(["x"]),
            Values::column([true, false]),
        ];

        let folded = Values::combine_all(&columns, Combination::Multiply).unwrap();
        assert_eq!(folded.width(), 3);
        assert_eq!(folded.len(), 4);
        assert_eq!(
            cells(&folded)[1],
            row(&[Value::Int(1), Value::from("x"), Value::Bool(false)])
        );

        assert!(Values::combine_all(&[], Combination::PseudoMultiply).is_none());
    }

    #[test]
    fn test_rows_rejects_unequal_widths() {
        let result = Values::rows(vec![vec![Value::Int(1)], vec![Value::Int(1), Value::Int(2)]]);
        match result {
            Err(HarnessError::Configuration(message)) => assert!(message.contains("row 1")),
            other => panic!("Expected a configuration error, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod iteration_tests {
    use super::*;

    #[test]
    fn test_each_iteration_starts_from_the_first_row() {
        let values = Values::column([1, 2, 3]).multiply(&Values::column([4, 5]));
        assert_eq!(cells(&values), cells(&values));
        assert_eq!(values.iter().next().unwrap().index, 0);
    }

    #[test]
    fn test_not_applicable_rows_keep_their_index() {
        let mut rows = RangeSet::new();
        rows.insert_index(1);
        let values = Values::column([7, 8, 9]).with_not_applicable(ExcludedIndices::Rows(rows));

        let flags: Vec<(u64, bool)> = values.iter().map(|r| (r.index, r.applicable)).collect();
        assert_eq!(flags, vec![(0, true), (1, false), (2, true)]);
    }

    #[test]
    fn test_marks_do_not_leak_into_combined_values() {
        let marked = Values::column([1, 2]).with_not_applicable(ExcludedIndices::All);
        assert!(marked.iter().all(|r| !r.applicable));

        let combined = marked.multiply(&Values::column([3]));
        assert!(combined.iter().all(|r| r.applicable));
    }

    #[test]
    fn test_large_products_are_iterated_lazily() {
        let big = Values::column(0..1000i64).multiply(&Values::column(0..1000i64));
        assert_eq!(big.len(), 1_000_000);
        let third = big.iter().nth(2).unwrap();
        assert_eq!(third.cells, vec![Value::Int(0), Value::Int(2)]);
    }
}

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn test_param_type_accepts_matching_values() {
        assert!(ParamType::Int.accepts(&Value::Int(1)));
        assert!(!ParamType::Int.accepts(&Value::Float(1.0)));
        assert!(ParamType::Any.accepts(&Value::from("x")));
        let floats = Value::array(ParamType::Float, vec![Value::Float(1.0)]);
        assert!(ParamType::array_of(ParamType::Float).accepts(&floats));
        assert!(!ParamType::array_of(ParamType::Int).accepts(&floats));
    }

    #[test]
    fn test_coercion_widens_ints_and_narrows_single_chars() {
        assert_eq!(Value::Int(2).coerce_to(&ParamType::Float), Some(Value::Float(2.0)));
        assert_eq!(Value::from("x").coerce_to(&ParamType::Char), Some(Value::Char('x')));
        assert_eq!(Value::from("xy").coerce_to(&ParamType::Char), None);
        assert_eq!(Value::Bool(true).coerce_to(&ParamType::Bool), Some(Value::Bool(true)));
        assert_eq!(Value::Float(1.5).coerce_to(&ParamType::Int), None);
    }

    #[test]
    fn test_param_type_display() {
        assert_eq!(ParamType::array_of(ParamType::Int).to_string(), "[int]");
        assert_eq!(Value::Int(3).param_type(), ParamType::Int);
    }
}
