//! Tests for the std type extensions

use rstest::rstest;
use wwforge_utils::{SliceExt, ValueExt};

#[rstest]
#[case(1.0, "1.00000e+00")]
#[case(-2.5e-7, "-2.50000e-07")]
#[case(1e40, "1.00000e+40")]
#[case(0.0, "0.00000e+00")]
fn scientific_formatting(#[case] value: f64, #[case] expected: &str) {
    assert_eq!(value.sci(5, 2), expected);
}

#[test]
fn scientific_formatting_integers() {
    assert_eq!(12_usize.sci(2, 2), "1.20e+01");
}

#[rstest]
#[case(vec![10.0, 0.0, 5.0], 10.0)]
#[case(vec![0.0, 0.0], 0.0)]
#[case(vec![1e-30], 1e-30)]
fn peak_of_finite_values(#[case] values: Vec<f64>, #[case] expected: f64) {
    assert_eq!(values.peak(), expected);
}

#[test]
fn undefined_values_propagate() {
    assert_eq!([1.0, f64::INFINITY].peak(), f64::INFINITY);
    assert!([f64::NAN, 1.0].peak().is_nan());
}
