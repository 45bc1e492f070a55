//! The scoring function itself: total, deterministic, side-effect-free.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use trustmesh_core::{Error, Result};

use crate::declaration::TrustDeclaration;
use crate::profile::ScoringProfile;

const WEIGHT_EPSILON: f64 = 1e-9;

/// The result of scoring a [`TrustDeclaration`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrustScore {
    /// Weighted fraction of declared articles that are `true`.
    pub compliance_score: f64,
    /// `1.0 - compliance_score`, exactly.
    pub guilt_score: f64,
    /// How much weight a consumer should place in this score, independent
    /// of the score's own value.
    pub confidence: f64,
    /// When this score was computed, RFC 3339.
    pub computed_at: String,
}

/// Scores `declaration` under `profile`'s weights, attributing
/// `confidence` to the result.
///
/// # Errors
///
/// Returns `Err(Error::MalformedInput)` if `profile`'s weights are
/// negative or do not sum to 1 within floating-point tolerance, or if
/// `confidence` is outside `[0, 1]`.
pub fn score(declaration: &TrustDeclaration, profile: &dyn ScoringProfile, confidence: f64) -> Result<TrustScore> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(Error::MalformedInput(format!("confidence {confidence} outside [0, 1]")));
    }

    let weights = profile.weights();
    if weights.iter().any(|w| *w < 0.0) {
        return Err(Error::MalformedInput("scoring profile has a negative weight".to_string()));
    }
    let total_weight: f64 = weights.iter().sum();
    if (total_weight - 1.0).abs() > WEIGHT_EPSILON {
        return Err(Error::MalformedInput(format!("scoring profile weights sum to {total_weight}, not 1")));
    }

    let articles = declaration.articles.as_array();
    let compliance_score: f64 =
        weights.iter().zip(articles).map(|(weight, held)| if held { *weight } else { 0.0 }).sum();

    Ok(TrustScore {
        compliance_score,
        guilt_score: 1.0 - compliance_score,
        confidence,
        computed_at: trustmesh_core::time::to_rfc3339(Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::Articles;
    use crate::profile::EqualWeightProfile;

    fn declaration(articles: Articles) -> TrustDeclaration {
        TrustDeclaration { agent_id: "did:key:zAgent".to_string(), agent_name: "Agent".to_string(), articles }
    }

    #[test]
    fn compliance_and_guilt_sum_to_one() {
        let decl = declaration(Articles {
            inspection_mandate: true,
            consent_architecture: true,
            ethical_override: false,
            continuous_validation: true,
            right_to_disconnect: false,
            moral_recognition: false,
        });
        let result = score(&decl, &EqualWeightProfile, 1.0).unwrap();
        assert!((result.compliance_score + result.guilt_score - 1.0).abs() < f64::EPSILON);
        assert!((result.compliance_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn all_true_scores_full_compliance() {
        let decl = declaration(Articles {
            inspection_mandate: true,
            consent_architecture: true,
            ethical_override: true,
            continuous_validation: true,
            right_to_disconnect: true,
            moral_recognition: true,
        });
        let result = score(&decl, &EqualWeightProfile, 1.0).unwrap();
        assert!((result.compliance_score - 1.0).abs() < 1e-9);
        assert!(result.guilt_score.abs() < 1e-9);
    }

    #[test]
    fn all_false_scores_zero_compliance() {
        let decl = declaration(Articles::default());
        let result = score(&decl, &EqualWeightProfile, 1.0).unwrap();
        assert!(result.compliance_score.abs() < 1e-9);
        assert!((result.guilt_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_confidence_out_of_range() {
        let decl = declaration(Articles::default());
        assert_eq!(score(&decl, &EqualWeightProfile, 1.5).unwrap_err().kind(), trustmesh_core::ErrorKind::MalformedInput);
    }

    struct BadProfile;
    impl ScoringProfile for BadProfile {
        fn weights(&self) -> [f64; 6] {
            [0.5; 6]
        }
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let decl = declaration(Articles::default());
        assert_eq!(score(&decl, &BadProfile, 1.0).unwrap_err().kind(), trustmesh_core::ErrorKind::MalformedInput);
    }
}
