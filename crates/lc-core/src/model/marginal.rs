//! Single-topic baseline model.

use lc_math::Matrix;

use super::{BackendError, TopicModel};
use crate::frame::WideMatrix;

/// One topic equal to the training column totals plus a pseudo-count.
///
/// Every document is assigned to that topic with probability 1, so
/// `predict` returns the pooled timeslot distribution for every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarginalModel {
    pseudo_count: f64,
}

impl MarginalModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smooth every slot by `pseudo_count` so unseen slots keep some mass.
    pub fn with_pseudo_count(pseudo_count: f64) -> Self {
        MarginalModel { pseudo_count }
    }

    pub fn pseudo_count(&self) -> f64 {
        self.pseudo_count
    }
}

impl TopicModel for MarginalModel {
    fn fit(&mut self, documents: &WideMatrix<f64>) -> Result<Matrix, BackendError> {
        if !self.pseudo_count.is_finite() || self.pseudo_count < 0.0 {
            return Err(format!(
                "pseudo_count must be finite and nonnegative, got {}",
                self.pseudo_count
            )
            .into());
        }
        let totals = documents.to_matrix().col_sums();
        let smoothed: Vec<f64> = totals.iter().map(|t| t + self.pseudo_count).collect();
        Matrix::from_vec(1, smoothed.len(), smoothed)
            .ok_or_else(|| "column totals do not form a row".into())
    }

    fn transform(&self, documents: &WideMatrix<f64>) -> Result<Matrix, BackendError> {
        Matrix::from_vec(documents.n_rows(), 1, vec![1.0; documents.n_rows()])
            .ok_or_else(|| "could not build topic probabilities".into())
    }
}
