//! Latent component model over weekly histograms.
//!
//! The statistical estimator is a collaborator behind [`TopicModel`]; this
//! module owns the fitted components and everything derived from them.
//!
//! Contract for a collaborator:
//! - `fit` returns an `n_topics x 7H` matrix of finite, nonnegative weights
//! - `transform` returns one row of topic probabilities per input row

pub mod latent;
pub mod marginal;
pub mod mixture;

pub use latent::LatentCalendar;
pub use marginal::MarginalModel;
pub use mixture::PretrainedMixture;

use lc_math::Matrix;

use crate::frame::WideMatrix;

/// Error type reported by a collaborator.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// A topic-discovery routine with a fit/transform pair.
pub trait TopicModel {
    /// Fit on training documents and return the component weights.
    fn fit(&mut self, documents: &WideMatrix<f64>) -> Result<Matrix, BackendError>;

    /// Topic probabilities for each document, `n_rows x n_topics`.
    fn transform(&self, documents: &WideMatrix<f64>) -> Result<Matrix, BackendError>;
}

impl<M: TopicModel + ?Sized> TopicModel for Box<M> {
    fn fit(&mut self, documents: &WideMatrix<f64>) -> Result<Matrix, BackendError> {
        (**self).fit(documents)
    }

    fn transform(&self, documents: &WideMatrix<f64>) -> Result<Matrix, BackendError> {
        (**self).transform(documents)
    }
}
