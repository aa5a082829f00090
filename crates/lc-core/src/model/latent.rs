//! Wrapper that validates and post-processes a collaborator's output.

use lc_common::{Error, Result};
use lc_math::Matrix;
use tracing::{debug, info, warn};

use super::TopicModel;
use crate::calendar::CalendarGrid;
use crate::frame::{CellValue, WideMatrix};
use crate::logging::event_names;

/// A fitted (or not yet fitted) latent calendar.
///
/// Derived quantities are recomputed on every call.
#[derive(Debug, Clone)]
pub struct LatentCalendar<M> {
    model: M,
    grid: CalendarGrid,
    components: Option<Matrix>,
}

impl<M: TopicModel> LatentCalendar<M> {
    pub fn new(model: M, grid: CalendarGrid) -> Self {
        LatentCalendar {
            model,
            grid,
            components: None,
        }
    }

    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn is_fitted(&self) -> bool {
        self.components.is_some()
    }

    /// Fit the collaborator and keep its components.
    ///
    /// The input must have 7H columns; the output must be an
    /// `n_topics x 7H` matrix of finite nonnegative weights with at least one
    /// topic. A failed fit leaves any previous components in place.
    pub fn fit<T: CellValue>(&mut self, documents: &WideMatrix<T>) -> Result<&mut Self> {
        self.check_grid("fit", documents.grid())?;
        let documents = documents.to_f64();

        info!(
            target: event_names::MODEL_FIT_STARTED,
            documents = documents.n_rows(),
            slots = documents.n_cols(),
            "fitting latent components"
        );

        let components = self.model.fit(&documents).map_err(|e| {
            warn!(target: event_names::MODEL_FIT_FAILED, error = %e, "fit failed");
            Error::Backend(e.to_string())
        })?;
        validate_components(&components, self.grid.n_slots())?;

        info!(
            target: event_names::MODEL_FIT_FINISHED,
            topics = components.rows(),
            "fit finished"
        );
        self.components = Some(components);
        Ok(self)
    }

    /// Raw component weights.
    pub fn components(&self) -> Result<&Matrix> {
        self.components.as_ref().ok_or(Error::NotFitted)
    }

    pub fn n_topics(&self) -> Result<usize> {
        Ok(self.components()?.rows())
    }

    /// Each topic's weights divided by its own total.
    pub fn normalized_components(&self) -> Result<Matrix> {
        self.components()?
            .normalize_rows()
            .map_err(|topic| Error::DegenerateTopic { topic })
    }

    /// Share of the total component weight held by each topic.
    pub fn component_distribution(&self) -> Result<Vec<f64>> {
        let components = self.components()?;
        let sums = components.row_sums();
        lc_math::normalize(&sums).ok_or_else(|| Error::DegenerateTopic {
            topic: sums.iter().position(|s| *s <= 0.0).unwrap_or(0),
        })
    }

    /// Topic probabilities per document, `n_rows x n_topics`.
    pub fn transform<T: CellValue>(&self, documents: &WideMatrix<T>) -> Result<Matrix> {
        let n_topics = self.n_topics()?;
        self.check_grid("transform", documents.grid())?;

        let probabilities = self
            .model
            .transform(&documents.to_f64())
            .map_err(|e| Error::Backend(e.to_string()))?;
        if probabilities.rows() != documents.n_rows() || probabilities.cols() != n_topics {
            return Err(Error::Backend(format!(
                "transform returned {}x{}, expected {}x{}",
                probabilities.rows(),
                probabilities.cols(),
                documents.n_rows(),
                n_topics
            )));
        }
        if probabilities.as_slice().iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(Error::Backend(
                "transform returned negative or non-finite probabilities".to_string(),
            ));
        }
        debug!(
            target: event_names::MODEL_TRANSFORM,
            documents = documents.n_rows(),
            topics = n_topics,
            "transformed documents"
        );
        Ok(probabilities)
    }

    /// Marginal timeslot distribution per document:
    /// `transform(X) @ normalized_components()`.
    pub fn predict<T: CellValue>(&self, documents: &WideMatrix<T>) -> Result<WideMatrix<f64>> {
        let normalized = self.normalized_components()?;
        let probabilities = self.transform(documents)?;
        let predicted = probabilities
            .matmul(&normalized)
            .ok_or_else(|| Error::shape("predict", normalized.rows(), probabilities.cols()))?;
        WideMatrix::from_matrix(self.grid, documents.groups().to_vec(), &predicted)
    }

    /// `predict` for a bare matrix whose columns follow the grid's vocabulary.
    pub fn predict_matrix(&self, documents: &Matrix) -> Result<Matrix> {
        if !self.is_fitted() {
            return Err(Error::NotFitted);
        }
        self.check_columns("predict", documents.cols())?;
        let groups = (0..documents.rows()).map(lc_common::GroupKey::row).collect();
        let wide = WideMatrix::from_matrix(self.grid, groups, documents)?;
        Ok(self.predict(&wide)?.to_matrix())
    }

    /// Same column count and the same day order as the fitted grid.
    fn check_grid(&self, context: &'static str, grid: &CalendarGrid) -> Result<()> {
        self.check_columns(context, grid.n_slots())?;
        if !grid.compatible_with(&self.grid) {
            return Err(Error::IncompatibleGrid(format!(
                "{}: documents are {}-first, model is {}-first; rebase them first",
                context,
                grid.week_start(),
                self.grid.week_start()
            )));
        }
        Ok(())
    }

    fn check_columns(&self, context: &'static str, actual: usize) -> Result<()> {
        let expected = self.grid.n_slots();
        if actual != expected {
            return Err(Error::shape(context, expected, actual));
        }
        Ok(())
    }
}

fn validate_components(components: &Matrix, n_slots: usize) -> Result<()> {
    if components.cols() != n_slots {
        return Err(Error::shape("fit components", n_slots, components.cols()));
    }
    if components.rows() == 0 {
        return Err(Error::Backend("fit returned no topics".to_string()));
    }
    if let Some(bad) = components
        .as_slice()
        .iter()
        .find(|w| !w.is_finite() || **w < 0.0)
    {
        return Err(Error::invalid(
            "components",
            format!("weights must be finite and nonnegative, got {}", bad),
        ));
    }
    Ok(())
}
