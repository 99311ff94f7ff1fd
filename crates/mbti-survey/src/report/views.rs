use chrono::{DateTime, Utc};
use serde::Serialize;

use super::generate_insights;
use crate::survey::domain::{AssessmentResult, Dimension, Pole, TypeCode, TypeProfile};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionDetail {
    pub dimension: Dimension,
    pub name: &'static str,
    pub description: &'static str,
    pub score: f64,
    pub confidence: f64,
    pub letter: char,
    pub label: &'static str,
    pub tendency: &'static str,
}

impl DimensionDetail {
    /// Positive scores lean to the second letter; zero keeps the first.
    pub fn new(dimension: Dimension, score: f64, confidence: f64) -> Self {
        let pole = if score > 0.0 { Pole::Second } else { Pole::First };
        Self {
            dimension,
            name: dimension.name(),
            description: dimension.description(),
            score,
            confidence,
            letter: dimension.letter(pole),
            label: dimension.label(pole),
            tendency: dimension.tendency(pole),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportInsights {
    /// Mean absolute raw score across dimensions.
    pub strength: f64,
    pub mean_confidence: f64,
    pub strength_descriptor: &'static str,
    pub reliability: &'static str,
    pub suggestions: Vec<&'static str>,
}

/// Everything the result page and PDF render, resolved from a stored result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub username: String,
    pub type_code: TypeCode,
    pub profile: Option<TypeProfile>,
    pub computed_at: DateTime<Utc>,
    pub answered: i64,
    pub dimensions: Vec<DimensionDetail>,
    pub insights: ReportInsights,
}

impl ResultView {
    pub fn build(
        username: &str,
        result: &AssessmentResult,
        profile: Option<TypeProfile>,
        answered: i64,
    ) -> Self {
        let dimensions: Vec<DimensionDetail> = Dimension::ALL
            .iter()
            .map(|dimension| {
                let score = result.score_detail.get(dimension).copied().unwrap_or(0.0);
                let confidence = result.confidence.get(dimension).copied().unwrap_or(0.0);
                DimensionDetail::new(*dimension, score, confidence)
            })
            .collect();
        let insights = generate_insights(&dimensions);

        Self {
            username: username.to_string(),
            type_code: result.type_code.clone(),
            profile,
            computed_at: result.computed_at,
            answered,
            dimensions,
            insights,
        }
    }

    pub fn profile_name(&self) -> &str {
        self.profile
            .as_ref()
            .map(|profile| profile.name.as_str())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Unknown type")
    }

    pub fn growth(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .map(|profile| profile.growth.as_str())
            .filter(|growth| !growth.trim().is_empty())
    }
}
