//! Emotion scoring from color, shape, symbol and composition evidence.
//!
//! Every evidence source adds fixed deltas to an 8-entry accumulator.
//! The accumulated vector is then scaled so the leading emotion reads
//! exactly 1.0, and a categorical state is derived from its shape.

use crate::symbol::count_where;
use crate::types::{
    Balance, ColorDistribution, ColorName, CompositionAnalysis, DetectedShape, DetectedSymbol,
    Emotion, EmotionAnalysis, EmotionScores, EmotionalIndicator, EmotionalState, IndicatorKind,
    Pressure, ShapeKind, SpaceUsage, Stage, StageDegraded, SymbolKind,
};

type Deltas = &'static [(Emotion, f64)];

/// Emotion weights per color, scaled by the bucket's share of the image.
const COLOR_WEIGHTS: &[(ColorName, Deltas)] = &[
    (
        ColorName::Red,
        &[(Emotion::Anger, 0.8), (Emotion::Energy, 0.7), (Emotion::Joy, 0.2)],
    ),
    (
        ColorName::Blue,
        &[(Emotion::Calm, 0.9), (Emotion::Sadness, 0.6), (Emotion::Fear, 0.3)],
    ),
    (ColorName::Yellow, &[(Emotion::Joy, 0.9), (Emotion::Energy, 0.7)]),
    (ColorName::Green, &[(Emotion::Calm, 0.8), (Emotion::Joy, 0.4)]),
    (
        ColorName::Black,
        &[(Emotion::Sadness, 0.8), (Emotion::Anxiety, 0.9), (Emotion::Fear, 0.5)],
    ),
    (ColorName::White, &[(Emotion::Calm, 0.6), (Emotion::Fear, 0.3)]),
    (ColorName::Orange, &[(Emotion::Joy, 0.7), (Emotion::Energy, 0.8)]),
    (ColorName::Purple, &[(Emotion::Calm, 0.5), (Emotion::Anxiety, 0.4)]),
    (ColorName::Brown, &[(Emotion::Calm, 0.6), (Emotion::Sadness, 0.2)]),
    (
        ColorName::Pink,
        &[(Emotion::Love, 0.8), (Emotion::Joy, 0.5), (Emotion::Calm, 0.4)],
    ),
    (
        ColorName::Gray,
        &[(Emotion::Sadness, 0.5), (Emotion::Calm, 0.3), (Emotion::Anxiety, 0.4)],
    ),
];

/// Fixed deltas per detected symbol.
///
/// Emotional expression additionally reinforces the current leader; see
/// [`LEADER_BOOST`].
const SYMBOL_DELTAS: &[(SymbolKind, Deltas)] = &[
    (SymbolKind::Human, &[(Emotion::Love, 0.3), (Emotion::Calm, 0.2)]),
    (SymbolKind::Face, &[(Emotion::Love, 0.3), (Emotion::Calm, 0.2)]),
    (
        SymbolKind::Isolation,
        &[(Emotion::Sadness, 0.4), (Emotion::Anxiety, 0.3), (Emotion::Fear, 0.2)],
    ),
    (SymbolKind::EmotionalExpression, &[(Emotion::Energy, 0.3)]),
    (SymbolKind::PastFocus, &[(Emotion::Sadness, 0.3), (Emotion::Calm, 0.2)]),
    (SymbolKind::House, &[(Emotion::Calm, 0.3), (Emotion::Love, 0.2)]),
    (SymbolKind::Tree, &[(Emotion::Calm, 0.2), (Emotion::Joy, 0.1)]),
];

/// Added to the leading emotion when emotional expression is detected.
const LEADER_BOOST: f64 = 0.2;

const ORGANIC_DOMINANT: Deltas = &[(Emotion::Energy, 0.2), (Emotion::Love, 0.1)];
const GEOMETRIC_DOMINANT: Deltas = &[(Emotion::Calm, 0.2)];

/// Per-shape bonus for each circle (calm) and triangle (energy).
const PER_SHAPE_BONUS: f64 = 0.1;

const SPACE_DELTAS: &[(SpaceUsage, Deltas)] = &[
    (
        SpaceUsage::Constricted,
        &[(Emotion::Anxiety, 0.4), (Emotion::Fear, 0.2), (Emotion::Sadness, 0.1)],
    ),
    (
        SpaceUsage::Expansive,
        &[(Emotion::Joy, 0.3), (Emotion::Energy, 0.2), (Emotion::Calm, 0.1)],
    ),
    (
        SpaceUsage::Crowded,
        &[(Emotion::Anxiety, 0.3), (Emotion::Energy, 0.2)],
    ),
];

const PRESSURE_DELTAS: &[(Pressure, Deltas)] = &[
    (
        Pressure::Heavy,
        &[(Emotion::Anger, 0.3), (Emotion::Energy, 0.2), (Emotion::Anxiety, 0.1)],
    ),
    (Pressure::Light, &[(Emotion::Calm, 0.3), (Emotion::Sadness, 0.1)]),
];

const BALANCE_DELTAS: &[(Balance, Deltas)] = &[
    (Balance::LeftHeavy, &[(Emotion::Sadness, 0.2), (Emotion::Calm, 0.1)]),
    (Balance::RightHeavy, &[(Emotion::Energy, 0.2), (Emotion::Joy, 0.1)]),
];

/// Pairs of emotions that signal inner conflict when both run high.
const CONFLICTING_PAIRS: [(Emotion, Emotion); 3] = [
    (Emotion::Joy, Emotion::Sadness),
    (Emotion::Anger, Emotion::Calm),
    (Emotion::Energy, Emotion::Fear),
];
const CONFLICT_THRESHOLD: f64 = 0.4;
const HIGH_SCORE: f64 = 0.6;
const INTENSE_SCORE: f64 = 0.8;

const COLOR_CORRELATIONS: &[(ColorName, &str)] = &[
    (ColorName::Red, "Intense energy, passion or anger"),
    (ColorName::Blue, "Calm, serenity or sadness"),
    (ColorName::Yellow, "Joy, optimism and positive energy"),
    (ColorName::Black, "Anxiety, sadness or need for structure"),
    (ColorName::Green, "Balance, growth and harmony"),
    (ColorName::White, "Purity, simplicity or emotional emptiness"),
    (ColorName::Orange, "Creativity, enthusiasm and sociability"),
    (ColorName::Purple, "Imagination, spirituality and sensitivity"),
    (ColorName::Pink, "Tenderness, affection and gentleness"),
    (ColorName::Brown, "Stability, security and pragmatism"),
    (ColorName::Gray, "Neutrality, indecision or maturity"),
];

const STATE_CORRELATIONS: &[(EmotionalState, &str)] = &[
    (
        EmotionalState::Conflicted,
        "Contradictory emotions or inner tension",
    ),
    (EmotionalState::Volatile, "Changing or unstable emotions"),
    (EmotionalState::Intense, "Strong, concentrated emotion"),
    (EmotionalState::Stable, "Emotional balance"),
    (EmotionalState::Neutral, "Moderate or contained emotions"),
];

/// Everything the scorer reads, borrowed from earlier stages.
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    pub colors: &'a ColorDistribution,
    /// Aggregated shape groups.
    pub shapes: &'a [DetectedShape],
    pub symbols: &'a [DetectedSymbol],
    pub composition: &'a CompositionAnalysis,
}

/// Score the eight emotions and derive the emotional state.
///
/// # Errors
///
/// Returns [`StageDegraded`] if any accumulated score is not finite.
pub fn score_emotions(evidence: &Evidence<'_>) -> Result<EmotionAnalysis, StageDegraded> {
    let mut scores = EmotionScores::default();
    add_color_evidence(&mut scores, evidence.colors);
    add_shape_evidence(&mut scores, evidence.shapes, evidence.symbols);
    add_composition_evidence(&mut scores, evidence.composition);

    if let Some((emotion, score)) = scores.iter().find(|(_, s)| !s.is_finite()) {
        return Err(StageDegraded::new(
            Stage::Emotion,
            format!("{emotion} accumulated to {score}"),
        ));
    }

    scores.normalize();
    let dominant_emotion = scores.dominant();
    let state = emotional_state(&scores);
    let indicators = emotional_indicators(evidence, &scores, dominant_emotion, state);

    tracing::debug!(%dominant_emotion, %state, "emotions scored");

    Ok(EmotionAnalysis {
        scores,
        dominant_emotion,
        state,
        indicators,
    })
}

fn apply(scores: &mut EmotionScores, deltas: Deltas, scale: f64) {
    for &(emotion, delta) in deltas {
        scores.add(emotion, delta * scale);
    }
}

fn lookup<K: PartialEq + Copy>(table: &[(K, Deltas)], key: K) -> Deltas {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|&(_, deltas)| deltas)
        .unwrap_or_default()
}

fn add_color_evidence(scores: &mut EmotionScores, colors: &ColorDistribution) {
    for bucket in &colors.buckets {
        apply(
            scores,
            lookup(COLOR_WEIGHTS, bucket.color),
            bucket.percentage / 100.0,
        );
    }
}

#[allow(clippy::cast_precision_loss)]
fn add_shape_evidence(
    scores: &mut EmotionScores,
    shapes: &[DetectedShape],
    symbols: &[DetectedSymbol],
) {
    for symbol in symbols {
        apply(scores, lookup(SYMBOL_DELTAS, symbol.kind), 1.0);
        if symbol.kind == SymbolKind::EmotionalExpression {
            let leader = scores.dominant();
            scores.add(leader, LEADER_BOOST);
        }
    }

    // A drawing without shapes carries no organic/geometric signal.
    if !shapes.is_empty() {
        let organic = count_where(shapes, ShapeKind::is_organic);
        let geometric = count_where(shapes, ShapeKind::is_geometric);
        if organic > geometric {
            apply(scores, ORGANIC_DOMINANT, 1.0);
        } else {
            apply(scores, GEOMETRIC_DOMINANT, 1.0);
        }
    }

    let circles = count_where(shapes, |k| k == ShapeKind::Circle);
    let triangles = count_where(shapes, |k| k == ShapeKind::Triangle);
    scores.add(Emotion::Calm, PER_SHAPE_BONUS * circles as f64);
    scores.add(Emotion::Energy, PER_SHAPE_BONUS * triangles as f64);
}

fn add_composition_evidence(scores: &mut EmotionScores, composition: &CompositionAnalysis) {
    apply(scores, lookup(SPACE_DELTAS, composition.space_usage), 1.0);
    apply(scores, lookup(PRESSURE_DELTAS, composition.pressure), 1.0);
    apply(scores, lookup(BALANCE_DELTAS, composition.balance), 1.0);
}

/// Categorize a normalized score vector.
///
/// Checked in order: any conflicting pair both above 0.4 is conflicted;
/// three or more scores above 0.6 is volatile; none above 0.6 is
/// neutral; a single one with the maximum above 0.8 is intense;
/// anything else is stable.
#[must_use]
pub fn emotional_state(scores: &EmotionScores) -> EmotionalState {
    let conflicted = CONFLICTING_PAIRS
        .iter()
        .any(|&(a, b)| scores.get(a) > CONFLICT_THRESHOLD && scores.get(b) > CONFLICT_THRESHOLD);
    if conflicted {
        return EmotionalState::Conflicted;
    }

    match scores.count_above(HIGH_SCORE) {
        n if n >= 3 => EmotionalState::Volatile,
        0 => EmotionalState::Neutral,
        1 if scores.max() > INTENSE_SCORE => EmotionalState::Intense,
        _ => EmotionalState::Stable,
    }
}

fn color_correlation(color: ColorName) -> &'static str {
    COLOR_CORRELATIONS
        .iter()
        .find(|(c, _)| *c == color)
        .map_or("Contextual emotional meaning", |&(_, text)| text)
}

fn state_correlation(state: EmotionalState) -> &'static str {
    STATE_CORRELATIONS
        .iter()
        .find(|(s, _)| *s == state)
        .map_or("Particular emotional state", |&(_, text)| text)
}

fn emotional_indicators(
    evidence: &Evidence<'_>,
    scores: &EmotionScores,
    dominant: Emotion,
    state: EmotionalState,
) -> Vec<EmotionalIndicator> {
    let mut indicators = vec![EmotionalIndicator {
        kind: IndicatorKind::Color,
        description: format!("Dominant color: {}", evidence.colors.dominant_color),
        confidence: 0.8,
        correlation: color_correlation(evidence.colors.dominant_color).to_owned(),
    }];

    if evidence.shapes.iter().any(|s| s.kind == ShapeKind::Circle) {
        indicators.push(EmotionalIndicator {
            kind: IndicatorKind::Shape,
            description: "Presence of round shapes".to_owned(),
            confidence: 0.7,
            correlation: "Emotional harmony and gentleness".to_owned(),
        });
    }

    if evidence
        .symbols
        .iter()
        .any(|s| s.kind == SymbolKind::Isolation)
    {
        indicators.push(EmotionalIndicator {
            kind: IndicatorKind::Symbol,
            description: "Withdrawal elements detected".to_owned(),
            confidence: 0.6,
            correlation: "Tendency toward introspection or need for protection".to_owned(),
        });
    }

    indicators.push(EmotionalIndicator {
        kind: IndicatorKind::Emotional,
        description: format!("Dominant emotion: {dominant}"),
        confidence: scores.get(dominant),
        correlation: "Main emotional state detected".to_owned(),
    });
    indicators.push(EmotionalIndicator {
        kind: IndicatorKind::State,
        description: format!("Overall state: {state}"),
        confidence: 0.7,
        correlation: state_correlation(state).to_owned(),
    });

    indicators
}
