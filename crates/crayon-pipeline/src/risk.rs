//! Threshold rules from the emotion vector to a risk level.

use crate::types::{
    Emotion, EmotionAnalysis, EmotionalState, RiskAssessment, RiskLevel, Stage, StageDegraded,
};

/// What a rule looks at.
#[derive(Debug, Clone, Copy)]
enum Condition {
    /// The emotion's score is strictly above the threshold.
    Above(Emotion, f64),
    /// The emotional state equals this one.
    State(EmotionalState),
}

/// One rule: when it triggers it adds a factor and a recommendation.
struct RiskRule {
    condition: Condition,
    factor: &'static str,
    recommendation: &'static str,
}

const RULES: &[RiskRule] = &[
    RiskRule {
        condition: Condition::Above(Emotion::Sadness, 0.7),
        factor: "High sadness detected",
        recommendation: "Observe recent behavior and mood",
    },
    RiskRule {
        condition: Condition::Above(Emotion::Anger, 0.7),
        factor: "Intense anger detected",
        recommendation: "Encourage verbal expression of emotions",
    },
    RiskRule {
        condition: Condition::Above(Emotion::Anxiety, 0.6),
        factor: "Notable anxiety",
        recommendation: "Relaxing and reassuring activities recommended",
    },
    RiskRule {
        condition: Condition::Above(Emotion::Fear, 0.5),
        factor: "Fear detected",
        recommendation: "Reassure and create a secure environment",
    },
    RiskRule {
        condition: Condition::State(EmotionalState::Conflicted),
        factor: "Internal emotional conflict",
        recommendation: "Help put contradictory emotions into words",
    },
    RiskRule {
        condition: Condition::State(EmotionalState::Volatile),
        factor: "Emotional instability",
        recommendation: "Establish reassuring routines",
    },
];

/// Factor count at which the level becomes high.
const HIGH_FACTORS: usize = 3;

/// Evaluate every rule against an emotion analysis.
///
/// Factors and recommendations follow rule order; the level-specific
/// recommendation is appended last.
///
/// # Errors
///
/// Returns [`StageDegraded`] when a score the rules read is not finite.
pub fn assess_risk(emotions: &EmotionAnalysis) -> Result<RiskAssessment, StageDegraded> {
    let mut risk_factors = Vec::new();
    let mut recommendations = Vec::new();

    for rule in RULES {
        let triggered = match rule.condition {
            Condition::Above(emotion, threshold) => {
                let score = emotions.scores.get(emotion);
                if !score.is_finite() {
                    return Err(StageDegraded::new(
                        Stage::Risk,
                        format!("{emotion} score is {score}"),
                    ));
                }
                score > threshold
            }
            Condition::State(state) => emotions.state == state,
        };
        if triggered {
            risk_factors.push(rule.factor.to_owned());
            recommendations.push(rule.recommendation.to_owned());
        }
    }

    let level = level_for(risk_factors.len());
    recommendations.push(closing_recommendation(level).to_owned());

    tracing::debug!(%level, factors = risk_factors.len(), "risk assessed");

    Ok(RiskAssessment {
        level,
        risk_factors,
        recommendations,
        requires_attention: matches!(level, RiskLevel::Medium | RiskLevel::High),
    })
}

/// Risk level for a number of triggered factors.
#[must_use]
pub const fn level_for(factors: usize) -> RiskLevel {
    match factors {
        0 => RiskLevel::Low,
        n if n >= HIGH_FACTORS => RiskLevel::High,
        _ => RiskLevel::Medium,
    }
}

const fn closing_recommendation(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "Professional consultation recommended",
        RiskLevel::Medium => "Attentive monitoring recommended",
        RiskLevel::Low | RiskLevel::Unknown => "Continue observing normal development",
    }
}
