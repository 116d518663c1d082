use pretty_assertions::assert_eq;
use rstest::*;

use crate::sem::types::{can_cast, types_equal, unify, width, BusShape, DataType};

#[rstest]
#[case(DataType::Signed(8), DataType::Signed(16), DataType::Signed(16))]
#[case(DataType::Unsigned(8), DataType::Unsigned(8), DataType::Unsigned(8))]
#[case(DataType::Signed(-1), DataType::Signed(8), DataType::Signed(8))]
#[case(DataType::Unsigned(8), DataType::Signed(-1), DataType::Unsigned(8))]
#[case(DataType::Float(32), DataType::Float(64), DataType::Float(64))]
#[case(DataType::Bool, DataType::Bool, DataType::Bool)]
fn unify_produces_expected_widened_type(#[case] a: DataType, #[case] b: DataType, #[case] expected: DataType) {
    assert_eq!(unify(&a, &b), Some(expected));
}

#[test]
fn unify_is_commutative() {
    let pairs = [
        (DataType::Signed(8), DataType::Unsigned(4)),
        (DataType::Unsigned(8), DataType::Signed(8)),
        (DataType::Signed(-1), DataType::Unsigned(16)),
    ];
    for (a, b) in pairs {
        assert_eq!(unify(&a, &b), unify(&b, &a), "unify must not depend on argument order");
    }
}

#[test]
fn unify_is_idempotent_on_equal_types() {
    for ty in [DataType::Signed(8), DataType::Unsigned(16), DataType::Float(32), DataType::Bool] {
        assert_eq!(unify(&ty, &ty), Some(ty));
    }
}

#[test]
fn cross_signedness_widens_when_signed_side_is_narrower() {
    // An 8-bit unsigned value needs a 9-bit signed type to represent its
    // full range alongside a signed 8-bit value.
    assert_eq!(unify(&DataType::Signed(8), &DataType::Unsigned(8)), Some(DataType::Signed(9)));
}

#[test]
fn bool_and_numeric_do_not_unify() {
    assert_eq!(unify(&DataType::Bool, &DataType::Signed(8)), None);
}

#[test]
fn bus_shapes_unify_by_union_when_element_types_agree() {
    let a = BusShape { signals: vec![("v".to_string(), DataType::Unsigned(8)), ("flag".to_string(), DataType::Bool)] };
    let b = BusShape { signals: vec![("v".to_string(), DataType::Unsigned(8)), ("extra".to_string(), DataType::Unsigned(16))] };
    let unified = unify(&DataType::Bus(a), &DataType::Bus(b)).expect("compatible shapes unify");
    let DataType::Bus(shape) = unified else { panic!("expected a bus shape") };
    assert_eq!(shape.get("v"), Some(&DataType::Unsigned(8)));
    assert_eq!(shape.get("flag"), Some(&DataType::Bool));
    assert_eq!(shape.get("extra"), Some(&DataType::Unsigned(16)));
}

#[test]
fn bus_shapes_with_disagreeing_element_types_do_not_unify() {
    let a = BusShape { signals: vec![("v".to_string(), DataType::Unsigned(8))] };
    let b = BusShape { signals: vec![("v".to_string(), DataType::Signed(8))] };
    assert_eq!(unify(&DataType::Bus(a), &DataType::Bus(b)), None);
}

#[test]
fn types_equal_rejects_a_widening_pair() {
    assert!(!types_equal(&DataType::Unsigned(8), &DataType::Unsigned(16)));
    assert!(types_equal(&DataType::Unsigned(8), &DataType::Unsigned(8)));
}

#[test]
fn can_cast_allows_numeric_to_numeric_even_without_unification() {
    assert!(can_cast(&DataType::Float(32), &DataType::Signed(8)));
    assert!(!can_cast(&DataType::Bool, &DataType::Signed(8)));
}

#[test]
fn unconstrained_width_is_negative_one() {
    assert_eq!(width(&DataType::Signed(-1)), -1);
    assert_eq!(width(&DataType::Unsigned(3)), 3);
    assert_eq!(width(&DataType::Bool), 0);
}
