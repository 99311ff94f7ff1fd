use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::domain::{AssessmentResult, Question, Questionnaire};
use super::drafts::DraftAnswers;
use super::pagination::Pagination;
use super::scoring::score_answers;
use crate::auth::SessionUser;
use crate::report::{pdf_filename, render_markdown, ExportError, ReportExporter, ResultView};
use crate::store::{Store, StoreError};

/// The questions a submission must answer.
#[derive(Debug, Clone)]
pub struct QuestionSet {
    pub questionnaire: Option<Questionnaire>,
    pub questions: Vec<Question>,
}

/// One page of the test with the user's saved answers.
#[derive(Debug, Clone)]
pub struct TestPage {
    pub questionnaire: Option<Questionnaire>,
    pub pagination: Pagination,
    pub total_questions: usize,
    pub questions: Vec<Question>,
    /// Raw draft values keyed by question id.
    pub saved: BTreeMap<i64, String>,
}

/// Rendered result for the result page.
#[derive(Debug, Clone)]
pub struct ResultPage {
    pub view: ResultView,
    pub report_html: String,
}

#[derive(Debug, Clone)]
pub struct PdfReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Question delivery, draft autosave, scoring, and report export.
#[derive(Debug, Clone)]
pub struct SurveyService {
    store: Store,
    exporter: ReportExporter,
}

impl SurveyService {
    pub fn new(store: Store, exporter: ReportExporter) -> Self {
        Self { store, exporter }
    }

    /// Active questionnaire's active questions, or every active question when
    /// no questionnaire is active.
    pub async fn question_set(&self) -> Result<QuestionSet, SurveyError> {
        let questionnaire = self.store.active_questionnaire().await?;
        let questions = self
            .store
            .active_questions(questionnaire.as_ref().map(|q| q.id))
            .await?;
        Ok(QuestionSet {
            questionnaire,
            questions,
        })
    }

    pub async fn test_page(
        &self,
        user: &SessionUser,
        raw_page: Option<&str>,
    ) -> Result<TestPage, SurveyError> {
        let set = self.question_set().await?;
        if set.questions.is_empty() {
            return Err(SurveyError::NoQuestions);
        }

        let pagination = Pagination::from_query(set.questions.len(), raw_page);
        let questions = pagination.slice(&set.questions).to_vec();

        Ok(TestPage {
            questionnaire: set.questionnaire,
            pagination,
            total_questions: set.questions.len(),
            questions,
            saved: user.draft.saved_values(),
        })
    }

    /// Merges autosaved answers into the stored session draft and returns how
    /// many answers the draft now holds.
    pub async fn save_progress(
        &self,
        user: &SessionUser,
        answers: &Map<String, Value>,
    ) -> Result<usize, SurveyError> {
        let mut patch = DraftAnswers::default();
        patch.merge_json(answers);
        let merged = self.store.merge_draft(&user.token, &patch).await?;
        Ok(merged.len())
    }

    /// Scores a complete submission and replaces the user's result.
    ///
    /// Posted `q_<id>` fields win over the session draft. When a required
    /// question is unanswered nothing is persisted except the merged draft.
    pub async fn submit(
        &self,
        user: &SessionUser,
        form: &HashMap<String, String>,
    ) -> Result<AssessmentResult, SurveyError> {
        let set = self.question_set().await?;
        if set.questions.is_empty() {
            return Err(SurveyError::NoQuestions);
        }

        let mut posted = DraftAnswers::default();
        posted.merge_form(form);
        let choices = self
            .store
            .merge_draft(&user.token, &posted)
            .await?
            .choices();

        let missing = set
            .questions
            .iter()
            .filter(|question| !choices.contains_key(&question.id))
            .count();
        if missing > 0 {
            return Err(SurveyError::Incomplete { missing });
        }

        let questionnaire_id = set.questionnaire.as_ref().map(|q| q.id);
        let required: BTreeMap<_, _> = set
            .questions
            .iter()
            .filter_map(|question| choices.get(&question.id).map(|choice| (question.id, *choice)))
            .collect();
        self.store
            .upsert_responses(user.user_id, questionnaire_id, &required)
            .await?;

        let answers = self
            .store
            .scored_answers(user.user_id, questionnaire_id)
            .await?;
        let card = score_answers(&answers);
        let result = AssessmentResult {
            user_id: user.user_id,
            type_code: card.type_code(),
            score_detail: card.score_detail(),
            confidence: card.confidence(),
            questionnaire_id,
            computed_at: Utc::now(),
        };
        self.store.replace_result(&result).await?;
        self.store
            .save_draft(&user.token, &DraftAnswers::default())
            .await?;

        info!(
            user_id = user.user_id,
            type_code = %result.type_code,
            answered = required.len(),
            "assessment submitted"
        );
        Ok(result)
    }

    /// `None` when the user has not completed the test yet.
    pub async fn result_page(&self, user: &SessionUser) -> Result<Option<ResultPage>, SurveyError> {
        let Some(view) = self.result_view(user).await? else {
            return Ok(None);
        };
        let markdown = render_markdown(&view, Utc::now());
        let report_html = self.exporter.to_html_fragment(&markdown);
        Ok(Some(ResultPage { view, report_html }))
    }

    pub async fn pdf(&self, user: &SessionUser) -> Result<PdfReport, SurveyError> {
        let view = self
            .result_view(user)
            .await?
            .ok_or(SurveyError::NoResult)?;
        let now = Utc::now();
        let markdown = render_markdown(&view, now);
        let bytes = self.exporter.to_pdf(&markdown).await.map_err(|err| {
            warn!(user_id = user.user_id, error = %err, "PDF export failed");
            err
        })?;

        Ok(PdfReport {
            filename: pdf_filename(&user.username, now.date_naive()),
            bytes,
        })
    }

    async fn result_view(&self, user: &SessionUser) -> Result<Option<ResultView>, SurveyError> {
        let Some(result) = self.store.result_for(user.user_id).await? else {
            return Ok(None);
        };
        let profile = self.store.profile(&result.type_code).await?;
        let answered = self.store.count_responses(user.user_id).await?;
        Ok(Some(ResultView::build(
            &user.username,
            &result,
            profile,
            answered,
        )))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("No test questions are available yet, please contact the administrator")]
    NoQuestions,
    #[error("{missing} question(s) still unanswered, please answer every question before submitting")]
    Incomplete { missing: usize },
    #[error("no result has been recorded yet")]
    NoResult,
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
