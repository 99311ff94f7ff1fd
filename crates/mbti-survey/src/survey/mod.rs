//! Questionnaire delivery, draft autosave, scoring, and result pages.

pub mod domain;
pub mod drafts;
pub mod pages;
pub mod pagination;
pub mod router;
pub mod scoring;
pub mod seed;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentResult, Dimension, DomainError, LikertChoice, Pole, Question, QuestionDraft,
    Questionnaire, TypeCode, TypeProfile,
};
pub use drafts::DraftAnswers;
pub use pagination::{Pagination, PAGE_SIZE};
pub use router::{survey_router, SurveyState};
pub use scoring::{score_answers, ScoreCard, ScoredAnswer};
pub use seed::{ImportSummary, SeedError};
pub use service::{SurveyError, SurveyService};
