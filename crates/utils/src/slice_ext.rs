/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Maximum value of the slice, propagating undefined values
    ///
    /// Any NAN in the slice makes the peak NAN, and an empty slice has a peak
    /// of zero. Used where a bad value should poison a whole group rather than
    /// be silently skipped.
    ///
    /// ```rust
    /// # use wwforge_utils::SliceExt;
    /// assert_eq!([3.0, 9.0, 1.0].peak(), 9.0);
    /// assert_eq!([3.0, f64::INFINITY].peak(), f64::INFINITY);
    /// assert!([3.0, f64::NAN, 1.0].peak().is_nan());
    /// assert_eq!(Vec::<f64>::new().peak(), 0.0);
    /// ```
    fn peak(&self) -> T;
}

impl SliceExt<f64> for [f64] {
    fn peak(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        self.iter().fold(f64::NEG_INFINITY, |acc, &v| {
            if acc.is_nan() || v.is_nan() {
                f64::NAN
            } else {
                acc.max(v)
            }
        })
    }
}
