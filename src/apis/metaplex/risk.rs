/// Token and creator risk scoring
///
/// Scores are in [0, 1] with 1.0 meaning maximum risk.
///
/// Token risk weights:
/// - creator history 40%
/// - metadata completeness 30% (name/symbol/uri/creators/verified
///   collection contribute equally)
/// - mutability 30% (full weight if the metadata account is mutable)
use crate::apis::types::{CreatorVerification, RiskFactor, TokenMetadata};

const CREATOR_WEIGHT: f64 = 0.4;
const COMPLETENESS_WEIGHT: f64 = 0.3;
const MUTABILITY_WEIGHT: f64 = 0.3;

/// Creator risk above this is flagged as HIGH_RISK_CREATOR
const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Success ratio of past projects, inverted into a risk score
///
/// A creator with no history gets maximum risk.
pub fn creator_risk_score(total_projects: u32, successful_projects: u32) -> f64 {
    if total_projects == 0 {
        return 1.0;
    }
    let ratio = successful_projects.min(total_projects) as f64 / total_projects as f64;
    (1.0 - ratio).clamp(0.0, 1.0)
}

/// Fraction of the five completeness signals that are present
fn metadata_completeness(metadata: &TokenMetadata) -> f64 {
    let mut present = 0u32;
    if metadata.name.as_deref().is_some_and(|n| !n.is_empty()) {
        present += 1;
    }
    if metadata.symbol.as_deref().is_some_and(|s| !s.is_empty()) {
        present += 1;
    }
    if metadata.uri.as_deref().is_some_and(|u| !u.is_empty()) {
        present += 1;
    }
    if !metadata.creators.is_empty() {
        present += 1;
    }
    if metadata.collection_verified {
        present += 1;
    }
    present as f64 / 5.0
}

/// Combine metadata shape and creator history into a token risk score
/// plus the discrete factors that contributed
pub fn assess_token(
    metadata: &TokenMetadata,
    creator: Option<&CreatorVerification>,
) -> (f64, Vec<RiskFactor>) {
    let mut factors = Vec::new();

    if !metadata.name.as_deref().is_some_and(|n| !n.is_empty()) {
        factors.push(RiskFactor::MissingName);
    }
    if !metadata.symbol.as_deref().is_some_and(|s| !s.is_empty()) {
        factors.push(RiskFactor::MissingSymbol);
    }
    if metadata.mutable {
        factors.push(RiskFactor::MutableMetadata);
    }

    let creator_risk = match creator {
        Some(verification) => {
            if !verification.verified {
                factors.push(RiskFactor::UnverifiedCreator);
            }
            if verification.risk_score > HIGH_RISK_THRESHOLD {
                factors.push(RiskFactor::HighRiskCreator);
            }
            verification.risk_score
        }
        None => {
            factors.push(RiskFactor::NoCreatorInfo);
            1.0
        }
    };

    let incompleteness = 1.0 - metadata_completeness(metadata);
    let mutability = if metadata.mutable { 1.0 } else { 0.0 };

    let score = CREATOR_WEIGHT * creator_risk
        + COMPLETENESS_WEIGHT * incompleteness
        + MUTABILITY_WEIGHT * mutability;

    (score.clamp(0.0, 1.0), factors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::types::{Creator, Severity};

    fn metadata(name: Option<&str>, mutable: bool, creators: usize) -> TokenMetadata {
        TokenMetadata {
            mint: "So11111111111111111111111111111111111111112".to_string(),
            name: name.map(|n| n.to_string()),
            symbol: name.map(|n| n.to_string()),
            uri: name.map(|_| "https://example.com/meta.json".to_string()),
            mutable,
            creators: (0..creators)
                .map(|i| Creator {
                    address: format!("creator{}", i),
                    verified: true,
                    share: 100,
                })
                .collect(),
            collection_verified: creators > 0,
        }
    }

    fn verification(risk_score: f64, verified: bool) -> CreatorVerification {
        CreatorVerification {
            address: "creator0".to_string(),
            verified,
            total_projects: 10,
            successful_projects: 5,
            risk_score,
        }
    }

    #[test]
    fn zero_history_means_maximum_creator_risk() {
        assert_eq!(creator_risk_score(0, 0), 1.0);
    }

    #[test]
    fn creator_risk_is_one_minus_success_ratio() {
        assert!((creator_risk_score(10, 10) - 0.0).abs() < f64::EPSILON);
        assert!((creator_risk_score(10, 5) - 0.5).abs() < f64::EPSILON);
        assert!((creator_risk_score(4, 1) - 0.75).abs() < f64::EPSILON);
        // Inconsistent upstream counts are clamped rather than negative
        assert_eq!(creator_risk_score(5, 9), 0.0);
    }

    #[test]
    fn complete_immutable_token_with_good_creator_scores_low() {
        let (score, factors) = assess_token(&metadata(Some("Token"), false, 1), Some(&verification(0.0, true)));
        assert!((0.0..=0.05).contains(&score));
        assert!(factors.is_empty());
    }

    #[test]
    fn bare_mutable_token_without_creators_scores_maximum() {
        let (score, factors) = assess_token(&metadata(None, true, 0), None);
        assert!((score - 1.0).abs() < f64::EPSILON);
        assert!(factors.contains(&RiskFactor::MissingName));
        assert!(factors.contains(&RiskFactor::MissingSymbol));
        assert!(factors.contains(&RiskFactor::MutableMetadata));
        assert!(factors.contains(&RiskFactor::NoCreatorInfo));
    }

    #[test]
    fn risky_unverified_creator_is_flagged() {
        let (score, factors) =
            assess_token(&metadata(Some("Token"), false, 1), Some(&verification(0.9, false)));
        assert!((0.0..=1.0).contains(&score));
        assert!(factors.contains(&RiskFactor::UnverifiedCreator));
        assert!(factors.contains(&RiskFactor::HighRiskCreator));
    }

    #[test]
    fn scores_stay_in_unit_range_across_shapes() {
        let shapes = [
            (metadata(None, true, 0), None),
            (metadata(None, false, 3), Some(verification(0.5, true))),
            (metadata(Some("T"), true, 1), Some(verification(1.0, false))),
        ];
        for (meta, creator) in &shapes {
            let (score, _) = assess_token(meta, creator.as_ref());
            assert!((0.0..=1.0).contains(&score), "score out of range: {}", score);
        }
    }

    #[test]
    fn factor_severities_are_tiered() {
        assert_eq!(RiskFactor::MissingName.severity(), Severity::Low);
        assert_eq!(RiskFactor::MutableMetadata.severity(), Severity::Medium);
        assert_eq!(RiskFactor::HighRiskCreator.severity(), Severity::High);
        assert_eq!(RiskFactor::NoCreatorInfo.severity(), Severity::High);
    }
}
