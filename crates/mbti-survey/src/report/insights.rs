use super::views::{DimensionDetail, ReportInsights};

const PRONOUNCED_STRENGTH: f64 = 2.0;
const HIGH_RELIABILITY: f64 = 0.7;
const MEDIUM_RELIABILITY: f64 = 0.5;
const SUGGESTION_CONFIDENCE: f64 = 0.6;

pub(crate) fn generate_insights(dimensions: &[DimensionDetail]) -> ReportInsights {
    let count = dimensions.len().max(1) as f64;
    let strength = dimensions.iter().map(|detail| detail.score.abs()).sum::<f64>() / count;
    let mean_confidence = dimensions.iter().map(|detail| detail.confidence).sum::<f64>() / count;

    let strength_descriptor = if strength > PRONOUNCED_STRENGTH {
        "pronounced"
    } else {
        "moderate"
    };

    let reliability = if mean_confidence > HIGH_RELIABILITY {
        "high"
    } else if mean_confidence > MEDIUM_RELIABILITY {
        "medium"
    } else {
        "needs further verification"
    };

    let suggestions = dimensions
        .iter()
        .filter(|detail| detail.confidence < SUGGESTION_CONFIDENCE)
        .map(|detail| detail.dimension.balance_suggestion())
        .collect();

    ReportInsights {
        strength,
        mean_confidence,
        strength_descriptor,
        reliability,
        suggestions,
    }
}
