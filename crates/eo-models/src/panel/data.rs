//! Panel data container

use std::ops::Range;

use ndarray::{Array1, Array2, Axis, s};

use crate::base::{ModelError, Result};
use eo_core::data::{DataFrame, IndexValue, PanelIndex};
use eo_core::design::DesignMatrix;

/// Response and regressors sorted by (entity, time)
///
/// Rows with a missing value in any used column are dropped before the
/// panel index is built. Regressors carry a leading `const` column.
#[derive(Debug, Clone)]
pub struct PanelData {
    pub design: DesignMatrix,
    entity_codes: Vec<usize>,
    time_codes: Vec<usize>,
    groups: Vec<Range<usize>>,
    entities: Vec<IndexValue>,
    periods: Vec<IndexValue>,
}

impl PanelData {
    /// Build from a frame holding the identifiers as columns
    pub fn from_frame<S: AsRef<str>>(
        df: &DataFrame,
        dependent: &str,
        regressors: &[S],
        entity_col: &str,
        time_col: &str,
    ) -> Result<Self> {
        let mut used: Vec<&str> = vec![entity_col, time_col, dependent];
        used.extend(regressors.iter().map(|r| r.as_ref()));
        df.require_columns(&used)?;

        let complete = df.complete_rows(&used)?;
        let df = df.filter(&complete)?;
        let index = PanelIndex::new(&df, entity_col, time_col)?;
        let sorted = df.reorder_rows(index.order())?;
        let design = DesignMatrix::build(&sorted, dependent, regressors, true)?;

        Ok(Self {
            design,
            entity_codes: index.entity_codes().to_vec(),
            time_codes: index.time_codes().to_vec(),
            groups: index.groups(),
            entities: index.entities().to_vec(),
            periods: index.periods().to_vec(),
        })
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.design.y
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.design.x
    }

    pub fn names(&self) -> &[String] {
        &self.design.names
    }

    pub fn nobs(&self) -> usize {
        self.design.nobs()
    }

    pub fn n_entities(&self) -> usize {
        self.groups.len()
    }

    pub fn n_periods(&self) -> usize {
        self.periods.len()
    }

    /// Entity code of each row
    pub fn entity_codes(&self) -> &[usize] {
        &self.entity_codes
    }

    /// Time code of each row
    pub fn time_codes(&self) -> &[usize] {
        &self.time_codes
    }

    /// Contiguous row range of each entity
    pub fn groups(&self) -> &[Range<usize>] {
        &self.groups
    }

    pub fn entities(&self) -> &[IndexValue] {
        &self.entities
    }

    pub fn periods(&self) -> &[IndexValue] {
        &self.periods
    }

    /// Observations per entity
    pub fn group_sizes(&self) -> Vec<usize> {
        self.groups.iter().map(|g| g.len()).collect()
    }

    /// Entity means of a vector, one per entity
    pub fn entity_means(&self, v: &Array1<f64>) -> Array1<f64> {
        self.groups
            .iter()
            .map(|g| v.slice(s![g.clone()]).mean().unwrap_or(0.0))
            .collect()
    }

    /// Entity means of each column, one row per entity
    pub fn entity_means_matrix(&self, m: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.groups.len(), m.ncols()));
        for (i, g) in self.groups.iter().enumerate() {
            let block = m.slice(s![g.clone(), ..]);
            if let Some(mean) = block.mean_axis(Axis(0)) {
                out.row_mut(i).assign(&mean);
            }
        }
        out
    }

    /// Subtract `theta_i` times the entity mean from every row of entity `i`
    pub fn demean(&self, v: &Array1<f64>, theta: &[f64]) -> Array1<f64> {
        let means = self.entity_means(v);
        let mut out = v.clone();
        for (i, g) in self.groups.iter().enumerate() {
            for r in g.clone() {
                out[r] -= theta[i] * means[i];
            }
        }
        out
    }

    /// Column-wise [`demean`](Self::demean)
    pub fn demean_matrix(&self, m: &Array2<f64>, theta: &[f64]) -> Array2<f64> {
        let means = self.entity_means_matrix(m);
        let mut out = m.clone();
        for (i, g) in self.groups.iter().enumerate() {
            for r in g.clone() {
                let mut row = out.row_mut(r);
                row.scaled_add(-theta[i], &means.row(i));
            }
        }
        out
    }

    pub(crate) fn require_entities(&self, test: &'static str, min: usize) -> Result<()> {
        if self.n_entities() < min {
            return Err(ModelError::too_few(test, min, self.n_entities(), "entities"));
        }
        Ok(())
    }
}
