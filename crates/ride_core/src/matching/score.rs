use crate::config::ScoreWeights;

/// Terms of the composite driver score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreComponents {
    pub eta_minutes: f64,
    pub distance_km: f64,
    pub rating: f64,
}

impl ScoreComponents {
    /// `(w_eta * eta + w_distance * distance) / rating`; lower is better.
    ///
    /// The weights need not sum to one, which leaves room for another weighted
    /// term. `rating` must be positive.
    pub fn composite(&self, weights: &ScoreWeights) -> f64 {
        (weights.eta * self.eta_minutes + weights.distance * self.distance_km) / self.rating
    }
}
