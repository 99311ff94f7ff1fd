use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Store, StoreError};
use crate::survey::domain::{
    AssessmentResult, Dimension, DomainError, LikertChoice, Pole, Question, QuestionDraft,
    Questionnaire, TypeCode, TypeProfile,
};
use crate::survey::scoring::ScoredAnswer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeCounts {
    pub responses: u64,
    pub results: u64,
}

const QUESTIONNAIRE_COLUMNS: &str = "id, key, name, description, is_active, created_at";
const QUESTION_COLUMNS: &str =
    "id, questionnaire_id, text, dimension, keyed_pole, weight, display_order, active";
const PROFILE_COLUMNS: &str = "code, name, description, strengths, growth, personality_traits, \
     work_style, interpersonal_relations, emotional_expression, decision_making, \
     stress_management, learning_style, career_suggestions, life_philosophy, communication_style";

impl Store {
    /// First active questionnaire by id; activation keeps this to at most one.
    pub async fn active_questionnaire(&self) -> Result<Option<Questionnaire>, StoreError> {
        let sql = format!(
            "SELECT {QUESTIONNAIRE_COLUMNS} FROM questionnaires WHERE is_active = 1 ORDER BY id LIMIT 1"
        );
        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
        row.as_ref().map(questionnaire_from_row).transpose()
    }

    pub async fn questionnaire_by_key(
        &self,
        key: &str,
    ) -> Result<Option<Questionnaire>, StoreError> {
        let sql = format!("SELECT {QUESTIONNAIRE_COLUMNS} FROM questionnaires WHERE key = ?");
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(questionnaire_from_row).transpose()
    }

    /// Creates the questionnaire inactive, or refreshes the name of an existing
    /// one. A blank description keeps the stored text.
    pub async fn upsert_questionnaire(
        &self,
        key: &str,
        name: &str,
        description: &str,
    ) -> Result<Questionnaire, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO questionnaires (key, name, description, is_active, created_at)
            VALUES (?, ?, ?, 0, ?)
            ON CONFLICT(key) DO UPDATE SET
                name = excluded.name,
                description = CASE
                    WHEN excluded.description = '' THEN questionnaires.description
                    ELSE excluded.description
                END
            "#,
        )
        .bind(key)
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.questionnaire_by_key(key)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Makes `questionnaire_id` the only active questionnaire.
    pub async fn activate_questionnaire(&self, questionnaire_id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM questionnaires WHERE id = ?")
            .bind(questionnaire_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound);
        }

        sqlx::query("UPDATE questionnaires SET is_active = CASE WHEN id = ? THEN 1 ELSE 0 END")
            .bind(questionnaire_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Active questions in display order. Without a questionnaire every active
    /// question qualifies.
    pub async fn active_questions(
        &self,
        questionnaire_id: Option<i64>,
    ) -> Result<Vec<Question>, StoreError> {
        let rows = match questionnaire_id {
            Some(id) => {
                let sql = format!(
                    "SELECT {QUESTION_COLUMNS} FROM questions \
                     WHERE active = 1 AND questionnaire_id = ? ORDER BY display_order, id"
                );
                sqlx::query(&sql).bind(id).fetch_all(&self.pool).await?
            }
            None => {
                let sql = format!(
                    "SELECT {QUESTION_COLUMNS} FROM questions \
                     WHERE active = 1 ORDER BY display_order, id"
                );
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        rows.iter().map(question_from_row).collect()
    }

    /// Matches on (questionnaire, text); an existing question is reactivated.
    pub async fn upsert_question(
        &self,
        questionnaire_id: i64,
        draft: &QuestionDraft,
    ) -> Result<UpsertOutcome, StoreError> {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM questions WHERE questionnaire_id = ? AND text = ?",
        )
        .bind(questionnaire_id)
        .bind(&draft.text)
        .fetch_optional(&self.pool)
        .await?;

        let dimension = draft.dimension.code();
        let keyed_pole = draft.dimension.letter(draft.keyed_pole).to_string();

        match existing {
            Some(id) => {
                sqlx::query(
                    "UPDATE questions SET dimension = ?, keyed_pole = ?, weight = ?, \
                     display_order = ?, active = 1 WHERE id = ?",
                )
                .bind(dimension)
                .bind(keyed_pole)
                .bind(draft.weight)
                .bind(draft.order)
                .bind(id)
                .execute(&self.pool)
                .await?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                sqlx::query(
                    "INSERT INTO questions \
                     (questionnaire_id, text, dimension, keyed_pole, weight, display_order, active) \
                     VALUES (?, ?, ?, ?, ?, ?, 1)",
                )
                .bind(questionnaire_id)
                .bind(&draft.text)
                .bind(dimension)
                .bind(keyed_pole)
                .bind(draft.weight)
                .bind(draft.order)
                .execute(&self.pool)
                .await?;
                Ok(UpsertOutcome::Created)
            }
        }
    }

    /// Inserts or updates one response per (user, question) in a single transaction.
    pub async fn upsert_responses(
        &self,
        user_id: i64,
        questionnaire_id: Option<i64>,
        answers: &BTreeMap<i64, LikertChoice>,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for (question_id, choice) in answers {
            sqlx::query(
                r#"
                INSERT INTO responses (user_id, question_id, choice, questionnaire_id, created_at)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(user_id, question_id) DO UPDATE SET
                    choice = excluded.choice,
                    questionnaire_id = excluded.questionnaire_id
                "#,
            )
            .bind(user_id)
            .bind(*question_id)
            .bind(i64::from(*choice))
            .bind(questionnaire_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// The user's stored answers restricted to the same question set as
    /// [`Store::active_questions`].
    pub async fn scored_answers(
        &self,
        user_id: i64,
        questionnaire_id: Option<i64>,
    ) -> Result<Vec<ScoredAnswer>, StoreError> {
        let base = "SELECT q.dimension, q.keyed_pole, q.weight, r.choice \
                    FROM responses r JOIN questions q ON q.id = r.question_id \
                    WHERE r.user_id = ? AND q.active = 1";
        let rows = match questionnaire_id {
            Some(id) => {
                let sql = format!("{base} AND q.questionnaire_id = ? ORDER BY q.display_order, q.id");
                sqlx::query(&sql)
                    .bind(user_id)
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{base} ORDER BY q.display_order, q.id");
                sqlx::query(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter()
            .map(|row| -> Result<ScoredAnswer, StoreError> {
                let dimension = Dimension::parse(&row.try_get::<String, _>("dimension")?)?;
                let keyed_pole = pole_from_column(dimension, &row.try_get::<String, _>("keyed_pole")?)?;
                Ok(ScoredAnswer {
                    dimension,
                    keyed_pole,
                    weight: row.try_get("weight")?,
                    choice: LikertChoice::new(row.try_get("choice")?)?,
                })
            })
            .collect()
    }

    pub async fn count_responses(&self, user_id: i64) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Replaces any previous result for the same user.
    pub async fn replace_result(&self, result: &AssessmentResult) -> Result<(), StoreError> {
        let score_detail = serde_json::to_string(&codes_to_strings(&result.score_detail))?;
        let confidence = serde_json::to_string(&codes_to_strings(&result.confidence))?;

        sqlx::query(
            r#"
            INSERT INTO results (user_id, type_code, score_detail, confidence, questionnaire_id, computed_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                type_code = excluded.type_code,
                score_detail = excluded.score_detail,
                confidence = excluded.confidence,
                questionnaire_id = excluded.questionnaire_id,
                computed_at = excluded.computed_at
            "#,
        )
        .bind(result.user_id)
        .bind(result.type_code.as_str())
        .bind(score_detail)
        .bind(confidence)
        .bind(result.questionnaire_id)
        .bind(result.computed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn result_for(&self, user_id: i64) -> Result<Option<AssessmentResult>, StoreError> {
        let row = sqlx::query(
            "SELECT user_id, type_code, score_detail, confidence, questionnaire_id, computed_at \
             FROM results WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let score_detail: BTreeMap<String, f64> =
            serde_json::from_str(&row.try_get::<String, _>("score_detail")?)?;
        let confidence: BTreeMap<String, f64> =
            serde_json::from_str(&row.try_get::<String, _>("confidence")?)?;
        let computed_at: DateTime<Utc> = row.try_get("computed_at")?;

        Ok(Some(AssessmentResult {
            user_id: row.try_get("user_id")?,
            type_code: TypeCode::parse(&row.try_get::<String, _>("type_code")?)?,
            score_detail: strings_to_codes(score_detail)?,
            confidence: strings_to_codes(confidence)?,
            questionnaire_id: row.try_get("questionnaire_id")?,
            computed_at,
        }))
    }

    pub async fn profile(&self, code: &TypeCode) -> Result<Option<TypeProfile>, StoreError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM type_profiles WHERE code = ?");
        let row = sqlx::query(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(profile_from_row).transpose()
    }

    pub async fn upsert_profile(&self, profile: &TypeProfile) -> Result<UpsertOutcome, StoreError> {
        let existed = self.profile(&profile.code).await?.is_some();
        let sql = format!(
            "INSERT OR REPLACE INTO type_profiles ({PROFILE_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        bind_profile(sqlx::query(&sql), profile)
            .execute(&self.pool)
            .await?;

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    /// Returns whether a row was written; existing profiles are left untouched.
    pub async fn insert_profile_if_missing(&self, profile: &TypeProfile) -> Result<bool, StoreError> {
        let sql = format!(
            "INSERT OR IGNORE INTO type_profiles ({PROFILE_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        let outcome = bind_profile(sqlx::query(&sql), profile)
            .execute(&self.pool)
            .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// Deletes every response and result.
    pub async fn purge_results(&self) -> Result<PurgeCounts, StoreError> {
        let mut tx = self.pool.begin().await?;
        let responses = sqlx::query("DELETE FROM responses")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let results = sqlx::query("DELETE FROM results")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        Ok(PurgeCounts { responses, results })
    }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

fn bind_profile<'q>(query: SqliteQuery<'q>, profile: &'q TypeProfile) -> SqliteQuery<'q> {
    query
        .bind(profile.code.as_str())
        .bind(profile.name.as_str())
        .bind(profile.description.as_str())
        .bind(profile.strengths.as_str())
        .bind(profile.growth.as_str())
        .bind(profile.personality_traits.as_str())
        .bind(profile.work_style.as_str())
        .bind(profile.interpersonal_relations.as_str())
        .bind(profile.emotional_expression.as_str())
        .bind(profile.decision_making.as_str())
        .bind(profile.stress_management.as_str())
        .bind(profile.learning_style.as_str())
        .bind(profile.career_suggestions.as_str())
        .bind(profile.life_philosophy.as_str())
        .bind(profile.communication_style.as_str())
}

fn questionnaire_from_row(row: &SqliteRow) -> Result<Questionnaire, StoreError> {
    Ok(Questionnaire {
        id: row.try_get("id")?,
        key: row.try_get("key")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn question_from_row(row: &SqliteRow) -> Result<Question, StoreError> {
    let dimension = Dimension::parse(&row.try_get::<String, _>("dimension")?)?;
    let keyed_pole = pole_from_column(dimension, &row.try_get::<String, _>("keyed_pole")?)?;

    Ok(Question {
        id: row.try_get("id")?,
        questionnaire_id: row.try_get("questionnaire_id")?,
        text: row.try_get("text")?,
        dimension,
        keyed_pole,
        weight: row.try_get("weight")?,
        order: row.try_get("display_order")?,
        active: row.try_get("active")?,
    })
}

fn profile_from_row(row: &SqliteRow) -> Result<TypeProfile, StoreError> {
    Ok(TypeProfile {
        code: TypeCode::parse(&row.try_get::<String, _>("code")?)?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        strengths: row.try_get("strengths")?,
        growth: row.try_get("growth")?,
        personality_traits: row.try_get("personality_traits")?,
        work_style: row.try_get("work_style")?,
        interpersonal_relations: row.try_get("interpersonal_relations")?,
        emotional_expression: row.try_get("emotional_expression")?,
        decision_making: row.try_get("decision_making")?,
        stress_management: row.try_get("stress_management")?,
        learning_style: row.try_get("learning_style")?,
        career_suggestions: row.try_get("career_suggestions")?,
        life_philosophy: row.try_get("life_philosophy")?,
        communication_style: row.try_get("communication_style")?,
    })
}

fn pole_from_column(dimension: Dimension, raw: &str) -> Result<Pole, StoreError> {
    let mut letters = raw.trim().chars();
    let pole = match (letters.next(), letters.next()) {
        (Some(letter), None) => dimension.pole_of(letter),
        _ => None,
    };
    pole.ok_or_else(|| {
        StoreError::Corrupt(DomainError::PoleOutsideDimension {
            dimension,
            pole: raw.to_string(),
        })
    })
}

fn codes_to_strings(values: &BTreeMap<Dimension, f64>) -> BTreeMap<&'static str, f64> {
    values
        .iter()
        .map(|(dimension, value)| (dimension.code(), *value))
        .collect()
}

fn strings_to_codes(values: BTreeMap<String, f64>) -> Result<BTreeMap<Dimension, f64>, StoreError> {
    values
        .into_iter()
        .map(|(code, value)| -> Result<(Dimension, f64), StoreError> {
            Ok((Dimension::parse(&code)?, value))
        })
        .collect()
}
