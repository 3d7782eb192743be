//! # Batches

use ndarray::Array2;

use crate::types::{ContextType, TokenType};

/// One emitted training batch.
///
/// Shapes are always explicit, including for `0` and `1` row batches:
/// * `inputs` - `(rows, max_length)`.
/// * `targets` - `(rows, num_classes)`, one-hot.
/// * `context` - `rows` labels, when the corpus carries context labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T: TokenType, C: ContextType = ()> {
    /// Left-padded input id rows.
    pub inputs: Array2<T>,

    /// One-hot target rows.
    pub targets: Array2<f32>,

    /// Per-row context labels.
    pub context: Option<Vec<C>>,

    /// The epoch this batch was drawn from.
    pub epoch: usize,
}

impl<T: TokenType, C: ContextType> Batch<T, C> {
    /// The number of rows.
    pub fn rows(&self) -> usize {
        self.inputs.nrows()
    }

    /// Does this batch have no rows?
    pub fn is_empty(&self) -> bool {
        self.rows() == 0
    }

    /// The hot column of each target row.
    pub fn target_ids(&self) -> Vec<usize> {
        self.targets
            .rows()
            .into_iter()
            .map(|row| row.iter().position(|&v| v == 1.0).unwrap_or_default())
            .collect()
    }

    /// Convert into the model's `(inputs, targets)` form.
    pub fn into_model_io(self) -> ModelIo<T, C> {
        match self.context {
            None => ModelIo::Single {
                inputs: self.inputs,
                targets: self.targets,
            },
            Some(context) => ModelIo::WithContext {
                inputs: (self.inputs, context),
                targets: (self.targets.clone(), self.targets),
            },
        }
    }
}

/// A batch shaped for the downstream model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelIo<T: TokenType, C: ContextType> {
    /// A plain `(inputs, targets)` pair.
    Single {
        /// Input id rows.
        inputs: Array2<T>,

        /// One-hot target rows.
        targets: Array2<f32>,
    },

    /// `([inputs, context], [targets, targets])`.
    ///
    /// The targets are duplicated for the primary and auxiliary output heads.
    WithContext {
        /// Input id rows and their context labels.
        inputs: (Array2<T>, Vec<C>),

        /// Targets for the primary and auxiliary heads.
        targets: (Array2<f32>, Array2<f32>),
    },
}
