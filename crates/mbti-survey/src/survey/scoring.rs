use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{Dimension, LikertChoice, Pole, TypeCode};

/// A stored answer joined with the question attributes scoring needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub dimension: Dimension,
    pub keyed_pole: Pole,
    pub weight: i32,
    pub choice: LikertChoice,
}

impl ScoredAnswer {
    /// Signed contribution toward the dimension's second letter.
    ///
    /// Bounded by `±2 * max(weight, 1)`. Computed in `i64` so no stored
    /// weight can overflow it.
    pub fn contribution(&self) -> i64 {
        let direction = match self.keyed_pole {
            Pole::Second => 1,
            Pole::First => -1,
        };
        i64::from(self.choice.centered()) * direction * i64::from(self.weight.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub total: i64,
    pub answered: u32,
}

impl DimensionScore {
    /// Ties resolve to the first letter.
    pub fn pole(&self) -> Pole {
        if self.total > 0 {
            Pole::Second
        } else {
            Pole::First
        }
    }

    pub fn letter(&self) -> char {
        self.dimension.letter(self.pole())
    }

    pub fn confidence(&self) -> f64 {
        let answered = self.answered.max(1) as f64;
        ((self.total.unsigned_abs() as f64 / answered) / 2.0).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    dimensions: [DimensionScore; 4],
}

impl ScoreCard {
    pub fn dimensions(&self) -> &[DimensionScore; 4] {
        &self.dimensions
    }

    pub fn get(&self, dimension: Dimension) -> &DimensionScore {
        &self.dimensions[Self::index(dimension)]
    }

    pub fn type_code(&self) -> TypeCode {
        TypeCode::from_poles(self.dimensions.map(|score| score.pole()))
    }

    pub fn score_detail(&self) -> BTreeMap<Dimension, f64> {
        self.dimensions
            .iter()
            .map(|score| (score.dimension, score.total as f64))
            .collect()
    }

    pub fn confidence(&self) -> BTreeMap<Dimension, f64> {
        self.dimensions
            .iter()
            .map(|score| (score.dimension, score.confidence()))
            .collect()
    }

    /// Slot in [`Dimension::ALL`] order.
    fn index(dimension: Dimension) -> usize {
        match dimension {
            Dimension::IntroversionExtraversion => 0,
            Dimension::SensingIntuition => 1,
            Dimension::ThinkingFeeling => 2,
            Dimension::JudgingPerceiving => 3,
        }
    }
}

pub fn score_answers<'a, I>(answers: I) -> ScoreCard
where
    I: IntoIterator<Item = &'a ScoredAnswer>,
{
    let mut dimensions = Dimension::ALL.map(|dimension| DimensionScore {
        dimension,
        total: 0,
        answered: 0,
    });

    for answer in answers {
        let slot = &mut dimensions[ScoreCard::index(answer.dimension)];
        slot.total = slot.total.saturating_add(answer.contribution());
        slot.answered += 1;
    }

    ScoreCard { dimensions }
}
