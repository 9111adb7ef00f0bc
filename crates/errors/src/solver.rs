//! Solver error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// The solver could not satisfy the request; `conflict` is the
    /// human-readable explanation produced by the solver.
    #[error("no solution: {conflict}")]
    NoSolution { conflict: String },

    #[error("solver input invalid: {message}")]
    InvalidRequest { message: String },
}
