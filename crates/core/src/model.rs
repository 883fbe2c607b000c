use rand::Rng;

/// A stochastic simulation model that produces one noisy output per call.
///
/// Each call to [`replicate`](StochasticModel::replicate) is one independent
/// trial. The randomness comes entirely from the supplied `rng`, so two calls
/// that see identical random streams produce identical outputs.
pub trait StochasticModel {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs one stochastic trial of the model.
    ///
    /// # Errors
    ///
    /// Returns an error if the trial cannot be completed.
    fn replicate<R: Rng + ?Sized>(
        &self,
        input: &Self::Input,
        rng: &mut R,
    ) -> Result<Self::Output, Self::Error>;
}
