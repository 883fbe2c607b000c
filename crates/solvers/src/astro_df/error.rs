use crate::simulation::EvalError;

/// Errors that can occur during an ASTRO-DF search.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("initial solution has {found} coordinates but the problem has {expected}")]
    Dimension { expected: usize, found: usize },

    #[error("could not estimate a usable maximum radius (got {0})")]
    MaxRadius(f64),

    #[error("linear algebra failure: {0}")]
    LinearAlgebra(&'static str),

    #[error("model error: {0}")]
    Model(Box<dyn std::error::Error + Send + Sync>),

    #[error("problem error: {0}")]
    Problem(Box<dyn std::error::Error + Send + Sync>),
}

impl<IE, ME, OE> From<EvalError<IE, ME, OE>> for Error
where
    IE: std::error::Error + Send + Sync + 'static,
    ME: std::error::Error + Send + Sync + 'static,
    OE: std::error::Error + Send + Sync + 'static,
{
    fn from(err: EvalError<IE, ME, OE>) -> Self {
        match err {
            EvalError::Model(e) => Error::Model(Box::new(e)),
            EvalError::Input(e) => Error::Problem(Box::new(e)),
            EvalError::Objective(e) => Error::Problem(Box::new(e)),
        }
    }
}

/// Why an iteration stopped before finishing.
#[derive(Debug)]
pub(super) enum Interrupt {
    /// The ledger refused a replication request.
    BudgetExhausted,

    /// A fatal error that ends the search.
    Failed(Error),
}

impl From<Error> for Interrupt {
    fn from(err: Error) -> Self {
        Interrupt::Failed(err)
    }
}
