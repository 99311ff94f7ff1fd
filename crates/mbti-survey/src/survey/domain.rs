use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the four bipolar axes, declared in the fixed type-code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "IE")]
    IntroversionExtraversion,
    #[serde(rename = "SN")]
    SensingIntuition,
    #[serde(rename = "TF")]
    ThinkingFeeling,
    #[serde(rename = "JP")]
    JudgingPerceiving,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::IntroversionExtraversion,
        Dimension::SensingIntuition,
        Dimension::ThinkingFeeling,
        Dimension::JudgingPerceiving,
    ];

    /// Accepts the canonical code in any case, plus its reversed spelling (`EI` for `IE`).
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|dimension| {
                let (first, second) = dimension.letters();
                let forward: String = [first, second].iter().collect();
                let reversed: String = [second, first].iter().collect();
                normalized == forward || normalized == reversed
            })
            .ok_or(DomainError::UnknownDimension(raw.trim().to_string()))
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::IntroversionExtraversion => "IE",
            Self::SensingIntuition => "SN",
            Self::ThinkingFeeling => "TF",
            Self::JudgingPerceiving => "JP",
        }
    }

    pub const fn letters(self) -> (char, char) {
        match self {
            Self::IntroversionExtraversion => ('I', 'E'),
            Self::SensingIntuition => ('S', 'N'),
            Self::ThinkingFeeling => ('T', 'F'),
            Self::JudgingPerceiving => ('J', 'P'),
        }
    }

    pub const fn letter(self, pole: Pole) -> char {
        let (first, second) = self.letters();
        match pole {
            Pole::First => first,
            Pole::Second => second,
        }
    }

    pub fn pole_of(self, letter: char) -> Option<Pole> {
        let (first, second) = self.letters();
        let letter = letter.to_ascii_uppercase();
        if letter == first {
            Some(Pole::First)
        } else if letter == second {
            Some(Pole::Second)
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::IntroversionExtraversion => "Introversion vs Extraversion",
            Self::SensingIntuition => "Sensing vs Intuition",
            Self::ThinkingFeeling => "Thinking vs Feeling",
            Self::JudgingPerceiving => "Judging vs Perceiving",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::IntroversionExtraversion => {
                "How you recharge your energy and where you direct your attention."
            }
            Self::SensingIntuition => "How you prefer to take in and process information.",
            Self::ThinkingFeeling => "What you weigh most heavily when making decisions.",
            Self::JudgingPerceiving => "How you prefer to organise your outer life.",
        }
    }

    pub const fn label(self, pole: Pole) -> &'static str {
        match (self, pole) {
            (Self::IntroversionExtraversion, Pole::First) => "Introverted",
            (Self::IntroversionExtraversion, Pole::Second) => "Extraverted",
            (Self::SensingIntuition, Pole::First) => "Sensing",
            (Self::SensingIntuition, Pole::Second) => "Intuitive",
            (Self::ThinkingFeeling, Pole::First) => "Thinking",
            (Self::ThinkingFeeling, Pole::Second) => "Feeling",
            (Self::JudgingPerceiving, Pole::First) => "Judging",
            (Self::JudgingPerceiving, Pole::Second) => "Perceiving",
        }
    }

    pub const fn tendency(self, pole: Pole) -> &'static str {
        match (self, pole) {
            (Self::IntroversionExtraversion, Pole::First) => {
                "Introverted: draws energy from the inner world, enjoys time alone to think, and focuses on ideas and reflection."
            }
            (Self::IntroversionExtraversion, Pole::Second) => {
                "Extraverted: draws energy from the outer world, enjoys interacting with people, and tends to think out loud."
            }
            (Self::SensingIntuition, Pole::First) => {
                "Sensing: attends to concrete facts and details, trusts experience and observation, and stays grounded in the present."
            }
            (Self::SensingIntuition, Pole::Second) => {
                "Intuitive: attends to patterns and possibilities, trusts inspiration and imagination, and looks toward future potential."
            }
            (Self::ThinkingFeeling, Pole::First) => {
                "Thinking: decides through logical analysis and values objective criteria and fairness."
            }
            (Self::ThinkingFeeling, Pole::Second) => {
                "Feeling: decides through personal values and relationships and values harmony."
            }
            (Self::JudgingPerceiving, Pole::First) => {
                "Judging: prefers a planned and structured life and likes to settle decisions and finish tasks."
            }
            (Self::JudgingPerceiving, Pole::Second) => {
                "Perceiving: prefers a flexible and open life and likes to keep options open and adapt to change."
            }
        }
    }

    /// Suggestion offered when the result on this axis is not clear-cut.
    pub const fn balance_suggestion(self) -> &'static str {
        match self {
            Self::IntroversionExtraversion => {
                "On the introversion/extraversion axis you may sit near the middle. Try different modes of engagement in different settings to find where you recharge best."
            }
            Self::SensingIntuition => {
                "On the sensing/intuition axis you show flexibility. Build the habit of tracking details while keeping the big picture in view."
            }
            Self::ThinkingFeeling => {
                "On the thinking/feeling axis you balance logic and empathy. When deciding, weigh both the analysis and the impact on the people involved."
            }
            Self::JudgingPerceiving => {
                "On the judging/perceiving axis you adapt well. Use structure when a situation needs it and stay open when it does not."
            }
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which letter of a dimension a question pushes toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pole {
    First,
    Second,
}

/// A Likert answer on the 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct LikertChoice(u8);

impl LikertChoice {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    const NEUTRAL: i32 = 3;

    pub fn new(value: i64) -> Result<Self, DomainError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(DomainError::ChoiceOutOfRange(value))
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| DomainError::MalformedChoice(raw.trim().to_string()))?;
        Self::new(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Maps 1..=5 onto -2..=+2.
    pub const fn centered(self) -> i32 {
        self.0 as i32 - Self::NEUTRAL
    }
}

impl TryFrom<i64> for LikertChoice {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LikertChoice> for i64 {
    fn from(choice: LikertChoice) -> Self {
        i64::from(choice.0)
    }
}

/// Four-letter code, one letter per dimension in `Dimension::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeCode(String);

impl TypeCode {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_ascii_uppercase();
        let letters: Vec<char> = normalized.chars().collect();
        if letters.len() != Dimension::ALL.len() {
            return Err(DomainError::InvalidTypeCode(raw.trim().to_string()));
        }

        let valid = Dimension::ALL
            .iter()
            .zip(letters.iter())
            .all(|(dimension, letter)| dimension.pole_of(*letter).is_some());
        if !valid {
            return Err(DomainError::InvalidTypeCode(raw.trim().to_string()));
        }

        Ok(Self(normalized))
    }

    pub fn from_poles(poles: [Pole; 4]) -> Self {
        let code = Dimension::ALL
            .iter()
            .zip(poles)
            .map(|(dimension, pole)| dimension.letter(pole))
            .collect();
        Self(code)
    }

    /// Every code the four axes can produce.
    pub fn all() -> Vec<TypeCode> {
        let mut codes = Vec::with_capacity(16);
        for bits in 0u8..16 {
            let pole = |shift: u8| {
                if bits & (0b1000 >> shift) == 0 {
                    Pole::First
                } else {
                    Pole::Second
                }
            };
            codes.push(Self::from_poles([pole(0), pole(1), pole(2), pole(3)]));
        }
        codes
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TypeCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeCode> for String {
    fn from(code: TypeCode) -> Self {
        code.0
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Questionnaire {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: i64,
    pub questionnaire_id: Option<i64>,
    pub text: String,
    pub dimension: Dimension,
    pub keyed_pole: Pole,
    pub weight: i32,
    pub order: i32,
    pub active: bool,
}

impl Question {
    pub fn keyed_letter(&self) -> char {
        self.dimension.letter(self.keyed_pole)
    }

    pub fn form_key(&self) -> String {
        format!("q_{}", self.id)
    }
}

/// Upper bound accepted for a question weight on import.
pub const MAX_QUESTION_WEIGHT: i32 = 1000;

/// Validated question content ahead of persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub dimension: Dimension,
    pub keyed_pole: Pole,
    pub weight: i32,
    pub order: i32,
}

impl QuestionDraft {
    pub fn new(
        text: &str,
        dimension: &str,
        keyed_pole: &str,
        weight: i32,
        order: i32,
    ) -> Result<Self, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::BlankQuestion);
        }

        let dimension = Dimension::parse(dimension)?;
        let mut letters = keyed_pole.trim().chars();
        let keyed_pole = match (letters.next(), letters.next()) {
            (Some(letter), None) => dimension.pole_of(letter),
            _ => None,
        }
        .ok_or_else(|| DomainError::PoleOutsideDimension {
            dimension,
            pole: keyed_pole.trim().to_string(),
        })?;

        if !(1..=MAX_QUESTION_WEIGHT).contains(&weight) {
            return Err(DomainError::WeightOutOfRange(weight));
        }

        Ok(Self {
            text: text.to_string(),
            dimension,
            keyed_pole,
            weight,
            order,
        })
    }
}

/// Static reference text for one of the sixteen type codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeProfile {
    pub code: TypeCode,
    pub name: String,
    pub description: String,
    pub strengths: String,
    pub growth: String,
    pub personality_traits: String,
    pub work_style: String,
    pub interpersonal_relations: String,
    pub emotional_expression: String,
    pub decision_making: String,
    pub stress_management: String,
    pub learning_style: String,
    pub career_suggestions: String,
    pub life_philosophy: String,
    pub communication_style: String,
}

impl TypeProfile {
    pub fn new(code: TypeCode, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            description: description.into(),
            strengths: String::new(),
            growth: String::new(),
            personality_traits: String::new(),
            work_style: String::new(),
            interpersonal_relations: String::new(),
            emotional_expression: String::new(),
            decision_making: String::new(),
            stress_management: String::new(),
            learning_style: String::new(),
            career_suggestions: String::new(),
            life_philosophy: String::new(),
            communication_style: String::new(),
        }
    }

    /// Titled analysis sections that carry text, in display order.
    pub fn analysis_sections(&self) -> Vec<(&'static str, &str)> {
        [
            ("Personality traits", self.personality_traits.as_str()),
            ("Work style", self.work_style.as_str()),
            ("Interpersonal relations", self.interpersonal_relations.as_str()),
            ("Emotional expression", self.emotional_expression.as_str()),
            ("Decision making", self.decision_making.as_str()),
            ("Stress management", self.stress_management.as_str()),
            ("Learning style", self.learning_style.as_str()),
            ("Career suggestions", self.career_suggestions.as_str()),
            ("Life philosophy", self.life_philosophy.as_str()),
            ("Communication style", self.communication_style.as_str()),
        ]
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub user_id: i64,
    pub type_code: TypeCode,
    pub score_detail: std::collections::BTreeMap<Dimension, f64>,
    pub confidence: std::collections::BTreeMap<Dimension, f64>,
    pub questionnaire_id: Option<i64>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),
    #[error("keyed pole '{pole}' is not a letter of dimension {dimension}")]
    PoleOutsideDimension { dimension: Dimension, pole: String },
    #[error("choice {0} is outside the 1-5 scale")]
    ChoiceOutOfRange(i64),
    #[error("choice '{0}' is not a number")]
    MalformedChoice(String),
    #[error("'{0}' is not a valid type code")]
    InvalidTypeCode(String),
    #[error("question text is blank")]
    BlankQuestion,
    #[error("weight {0} is outside 1-{max}", max = MAX_QUESTION_WEIGHT)]
    WeightOutOfRange(i32),
}
