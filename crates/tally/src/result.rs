//! Tally results of a single simulation run

// crate modules
use crate::error::{Error, Result};

// wwforge modules
use wwforge_utils::f;

// external crates
use serde::{Deserialize, Deserializer, Serialize};

/// Which array of a [TallyResult] to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultValue {
    /// Tally mean
    Mean,
    /// Relative error on the mean
    RelErr,
}

/// Mean and relative error for every bin of one tally
///
/// Values are flattened row-major over `(filter_0, ..., filter_n, nuclide,
/// score)`, i.e. the score index varies fastest and the first declared filter
/// slowest. The relative error is undefined (NAN) for bins that scored
/// nothing, and is written to file as `null`.
///
/// ```rust
/// # use wwforge_tally::{ResultValue, TallyResult};
/// let result = TallyResult {
///     id: 1,
///     filter_bins: vec![3],
///     nuclides: vec!["total".into()],
///     scores: vec!["flux".into(), "absorption".into()],
///     mean: vec![1.0, 0.1, 2.0, 0.2, 3.0, 0.3],
///     rel_err: vec![0.01, 0.1, 0.02, 0.2, 0.03, 0.3],
/// };
///
/// // Pick out the flux score for the total nuclide
/// let flux = result.slice(ResultValue::Mean, 0, 0).unwrap();
/// assert_eq!(flux, vec![1.0, 2.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyResult {
    /// Identifier of the tally these results belong to
    pub id: u32,
    /// Number of bins for each filter, in declaration order
    pub filter_bins: Vec<usize>,
    /// Nuclides tallied
    pub nuclides: Vec<String>,
    /// Scores tallied
    pub scores: Vec<String>,
    /// Flattened tally means
    #[serde(deserialize_with = "nullable_floats")]
    pub mean: Vec<f64>,
    /// Flattened relative errors
    #[serde(deserialize_with = "nullable_floats")]
    pub rel_err: Vec<f64>,
}

impl TallyResult {
    /// Full shape of the result arrays
    ///
    /// One axis per filter, followed by the nuclide and score axes.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = self.filter_bins.clone();
        shape.push(self.nuclides.len());
        shape.push(self.scores.len());
        shape
    }

    /// Check that both arrays match the declared shape
    pub fn validate(&self) -> Result<()> {
        let expected: usize = self.shape().iter().product();

        for (what, found) in [("means", self.mean.len()), ("errors", self.rel_err.len())] {
            if found != expected {
                return Err(Error::InconsistentShape {
                    id: self.id,
                    what: what.to_string(),
                    expected,
                    found,
                });
            }
        }

        Ok(())
    }

    /// Index of a score
    pub fn score_index(&self, score: &str) -> Result<usize> {
        self.scores
            .iter()
            .position(|s| s == score)
            .ok_or_else(|| Error::ScoreNotFound {
                id: self.id,
                score: score.to_string(),
            })
    }

    /// Index of a nuclide
    pub fn nuclide_index(&self, nuclide: &str) -> Result<usize> {
        self.nuclides
            .iter()
            .position(|n| n == nuclide)
            .ok_or_else(|| Error::NuclideNotFound {
                id: self.id,
                nuclide: nuclide.to_string(),
            })
    }

    /// Values of one nuclide and score for every filter combination
    ///
    /// The returned values keep the filter axes in declaration order, with
    /// the last declared filter varying fastest.
    pub fn slice(&self, value: ResultValue, nuclide: usize, score: usize) -> Result<Vec<f64>> {
        self.validate()?;

        let n_nuclides = self.nuclides.len();
        let n_scores = self.scores.len();

        if nuclide >= n_nuclides {
            return Err(Error::NuclideNotFound {
                id: self.id,
                nuclide: f!("index {nuclide}"),
            });
        }

        if score >= n_scores {
            return Err(Error::ScoreNotFound {
                id: self.id,
                score: f!("index {score}"),
            });
        }

        let values = match value {
            ResultValue::Mean => &self.mean,
            ResultValue::RelErr => &self.rel_err,
        };

        let stride = n_nuclides * n_scores;
        let offset = nuclide * n_scores + score;

        Ok(values
            .iter()
            .skip(offset)
            .step_by(stride)
            .copied()
            .collect())
    }
}

/// Read floats where undefined values were written as `null`
fn nullable_floats<'de, D>(deserializer: D) -> core::result::Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}
