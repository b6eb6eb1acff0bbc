use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Fixed-width scientific number formatting
    ///
    /// The default `LowerExp` output does not sign or pad the exponent, which
    /// makes tabulated output ragged. This always signs the exponent and pads
    /// it to `exp_pad` digits.
    ///
    /// ```rust
    /// # use wwforge_utils::ValueExt;
    /// assert_eq!((-1.0).sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!((0.00125).sci(3, 2), "1.250e-03".to_string());
    /// assert_eq!(1e40.sci(2, 3), "1.00e+040".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: std::fmt::LowerExp> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let formatted = f!("{:.precision$e}", self, precision = precision);

        // LowerExp always writes an 'e', anything else is non-finite text
        let Some((mantissa, exponent)) = formatted.split_once('e') else {
            return formatted;
        };

        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };

        f!("{mantissa}e{sign}{digits:0>exp_pad$}")
    }
}
