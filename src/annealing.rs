//! Temperature schedule and Boltzmann acceptance.

use rand::Rng;

/// Probability of accepting a move that worsens the cost by `delta` at `temperature`.
pub fn acceptance_probability(delta: f64, temperature: f64) -> f64 {
    if delta <= 0.0 {
        1.0
    } else if temperature <= 0.0 {
        0.0
    } else {
        (-delta / temperature).exp()
    }
}

/// Geometric cooling schedule calibrated from an observed average cost increase.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub initial_temperature: f64,
    pub final_temperature: f64,
    pub cooling_factor: f64,
    temperature: f64,
}

impl Schedule {
    /// Build a schedule for `iterations` steps.
    ///
    /// The initial temperature accepts an increase of `average_delta` with
    /// probability `p_max`, the final one with probability `p_min`; the
    /// temperature decays geometrically in between.
    pub fn new(average_delta: f64, p_max: f64, p_min: f64, iterations: usize) -> Self {
        let average_delta = if average_delta > 0.0 { average_delta } else { 1.0 };
        let initial_temperature = -average_delta / p_max.ln();
        let final_temperature = -average_delta / p_min.ln();
        let cooling_factor =
            (final_temperature / initial_temperature).powf(1.0 / iterations.max(1) as f64);

        Schedule {
            initial_temperature,
            final_temperature,
            cooling_factor,
            temperature: initial_temperature,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Advance one iteration.
    pub fn cool(&mut self) {
        self.temperature *= self.cooling_factor;
    }

    /// Boltzmann acceptance of a cost change `delta` at the current temperature.
    pub fn accepts<R: Rng>(&self, delta: f64, rng: &mut R) -> bool {
        delta <= 0.0 || rng.gen::<f64>() < acceptance_probability(delta, self.temperature)
    }
}
