//! Mixture of categoricals with fixed, pretrained components.

use lc_math::{log_sum_exp, normalize_log_probs, Matrix};

use super::{BackendError, TopicModel};
use crate::frame::WideMatrix;

/// Components supplied up front, e.g. loaded from an earlier fit.
///
/// `fit` only checks the column count and hands the components back.
/// `transform` computes posterior topic responsibilities of each document
/// under the mixture, in log space:
///
/// `log p(k | x) = log pi_k + sum_s x_s log phi_ks - logsumexp(...)`
///
/// where `phi` is the row-normalized components and `pi` the share of total
/// weight held by each topic. Topics with zero weight get no mass.
#[derive(Debug, Clone, PartialEq)]
pub struct PretrainedMixture {
    components: Matrix,
}

impl PretrainedMixture {
    pub fn new(components: Matrix) -> Self {
        PretrainedMixture { components }
    }

    pub fn components(&self) -> &Matrix {
        &self.components
    }

    fn check_width(&self, documents: &WideMatrix<f64>) -> Result<(), BackendError> {
        if documents.n_cols() != self.components.cols() {
            return Err(format!(
                "components have {} slots, documents have {}",
                self.components.cols(),
                documents.n_cols()
            )
            .into());
        }
        Ok(())
    }

    /// Per-topic log prior and log slot probabilities.
    fn log_parameters(&self) -> (Vec<f64>, Vec<Vec<f64>>) {
        let sums = self.components.row_sums();
        let total = lc_math::compensated_sum(&sums);
        let log_prior = sums
            .iter()
            .map(|s| {
                if *s > 0.0 && total > 0.0 {
                    (s / total).ln()
                } else {
                    f64::NEG_INFINITY
                }
            })
            .collect();
        let log_phi = self
            .components
            .iter_rows()
            .zip(&sums)
            .map(|(row, sum)| {
                row.iter()
                    .map(|w| if *sum > 0.0 { (w / sum).ln() } else { f64::NEG_INFINITY })
                    .collect()
            })
            .collect();
        (log_prior, log_phi)
    }
}

impl TopicModel for PretrainedMixture {
    fn fit(&mut self, documents: &WideMatrix<f64>) -> Result<Matrix, BackendError> {
        self.check_width(documents)?;
        Ok(self.components.clone())
    }

    fn transform(&self, documents: &WideMatrix<f64>) -> Result<Matrix, BackendError> {
        self.check_width(documents)?;
        let (log_prior, log_phi) = self.log_parameters();
        let n_topics = log_prior.len();
        let mut out = Matrix::zeros(documents.n_rows(), n_topics);

        for (r, (group, row)) in documents.iter_rows().enumerate() {
            let log_joint: Vec<f64> = (0..n_topics)
                .map(|k| {
                    let mut ll = log_prior[k];
                    for (s, count) in row.iter().enumerate() {
                        if *count > 0.0 {
                            ll += count * log_phi[k][s];
                        }
                    }
                    ll
                })
                .collect();
            let posterior = normalize_log_probs(&log_joint).ok_or_else(|| {
                format!(
                    "document {} has zero likelihood under every component (log evidence {})",
                    group,
                    log_sum_exp(&log_joint)
                )
            })?;
            out.row_mut(r).copy_from_slice(&posterior);
        }
        Ok(out)
    }
}
