//! Question bank and type-profile seeding from CSV exports.

use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use super::domain::{DomainError, QuestionDraft, Questionnaire, TypeCode, TypeProfile};
use crate::store::{Store, StoreError, UpsertOutcome};

pub const DEFAULT_QUESTIONNAIRE_KEY: &str = "open-balanced-v1";
pub const DEFAULT_QUESTIONNAIRE_NAME: &str = "Open balanced question bank";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("questionnaire '{0}' does not exist")]
    UnknownQuestionnaire(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A CSV row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based data row number, header excluded.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl ImportSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Created => self.created += 1,
            UpsertOutcome::Updated => self.updated += 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuestionRow {
    #[serde(default)]
    text: String,
    #[serde(default)]
    dimension: String,
    #[serde(default)]
    keyed_pole: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    weight: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    order: Option<String>,
}

/// Parses `text,dimension,keyed_pole,weight,order` rows. Weight defaults to 1
/// and order to the row number; invalid rows are returned as skipped.
pub fn parse_questions<R: Read>(
    reader: R,
) -> Result<(Vec<QuestionDraft>, Vec<SkippedRow>), SeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut drafts = Vec::new();
    let mut skipped = Vec::new();

    for (index, record) in csv_reader.deserialize::<QuestionRow>().enumerate() {
        let row_number = index + 1;
        let row = record?;

        let weight = match parse_int(row.weight.as_deref(), 1) {
            Some(weight) => weight,
            None => {
                skipped.push(SkippedRow {
                    row: row_number,
                    reason: format!("weight '{}' is not a number", row.weight.unwrap_or_default()),
                });
                continue;
            }
        };
        let order = match parse_int(row.order.as_deref(), row_number as i32) {
            Some(order) => order,
            None => {
                skipped.push(SkippedRow {
                    row: row_number,
                    reason: format!("order '{}' is not a number", row.order.unwrap_or_default()),
                });
                continue;
            }
        };

        match QuestionDraft::new(&row.text, &row.dimension, &row.keyed_pole, weight, order) {
            Ok(draft) => drafts.push(draft),
            Err(err) => skipped.push(SkippedRow {
                row: row_number,
                reason: err.to_string(),
            }),
        }
    }

    Ok((drafts, skipped))
}

/// Upserts questions into the keyed questionnaire, then makes it the only
/// active one.
pub async fn import_questions(
    store: &Store,
    key: &str,
    name: &str,
    description: &str,
    drafts: &[QuestionDraft],
    skipped: usize,
) -> Result<(Questionnaire, ImportSummary), SeedError> {
    let questionnaire = store.upsert_questionnaire(key, name, description).await?;
    let mut summary = ImportSummary {
        skipped,
        ..ImportSummary::default()
    };

    for draft in drafts {
        let outcome = store.upsert_question(questionnaire.id, draft).await?;
        summary.record(outcome);
    }

    store.activate_questionnaire(questionnaire.id).await?;
    info!(
        key = %questionnaire.key,
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        "imported questions"
    );
    Ok((questionnaire, summary))
}

pub async fn activate_questionnaire(store: &Store, key: &str) -> Result<Questionnaire, SeedError> {
    let questionnaire = store
        .questionnaire_by_key(key)
        .await?
        .ok_or_else(|| SeedError::UnknownQuestionnaire(key.to_string()))?;
    store.activate_questionnaire(questionnaire.id).await?;
    info!(key = %questionnaire.key, "activated questionnaire");
    Ok(Questionnaire {
        is_active: true,
        ..questionnaire
    })
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(default)]
    code: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    strengths: String,
    #[serde(default)]
    growth: String,
    #[serde(default)]
    personality_traits: String,
    #[serde(default)]
    work_style: String,
    #[serde(default)]
    interpersonal_relations: String,
    #[serde(default)]
    emotional_expression: String,
    #[serde(default)]
    decision_making: String,
    #[serde(default)]
    stress_management: String,
    #[serde(default)]
    learning_style: String,
    #[serde(default)]
    career_suggestions: String,
    #[serde(default)]
    life_philosophy: String,
    #[serde(default)]
    communication_style: String,
}

impl ProfileRow {
    fn into_profile(self) -> Result<TypeProfile, DomainError> {
        let code = TypeCode::parse(&self.code)?;
        Ok(TypeProfile {
            code,
            name: self.name,
            description: self.description,
            strengths: self.strengths,
            growth: self.growth,
            personality_traits: self.personality_traits,
            work_style: self.work_style,
            interpersonal_relations: self.interpersonal_relations,
            emotional_expression: self.emotional_expression,
            decision_making: self.decision_making,
            stress_management: self.stress_management,
            learning_style: self.learning_style,
            career_suggestions: self.career_suggestions,
            life_philosophy: self.life_philosophy,
            communication_style: self.communication_style,
        })
    }
}

/// Parses profile rows keyed by `code`; missing text columns stay empty.
pub fn parse_profiles<R: Read>(
    reader: R,
) -> Result<(Vec<TypeProfile>, Vec<SkippedRow>), SeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut profiles = Vec::new();
    let mut skipped = Vec::new();

    for (index, record) in csv_reader.deserialize::<ProfileRow>().enumerate() {
        let row = record?;
        match row.into_profile() {
            Ok(profile) => profiles.push(profile),
            Err(err) => skipped.push(SkippedRow {
                row: index + 1,
                reason: err.to_string(),
            }),
        }
    }

    Ok((profiles, skipped))
}

pub async fn import_profiles(
    store: &Store,
    profiles: &[TypeProfile],
    skipped: usize,
) -> Result<ImportSummary, SeedError> {
    let mut summary = ImportSummary {
        skipped,
        ..ImportSummary::default()
    };
    for profile in profiles {
        summary.record(store.upsert_profile(profile).await?);
    }
    info!(
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        "imported type profiles"
    );
    Ok(summary)
}

/// Inserts the built-in profiles; rows that already exist are counted as
/// skipped and left untouched.
pub async fn seed_default_profiles(store: &Store) -> Result<ImportSummary, SeedError> {
    let mut summary = ImportSummary::default();
    for profile in default_profiles() {
        if store.insert_profile_if_missing(&profile).await? {
            summary.created += 1;
        } else {
            summary.skipped += 1;
        }
    }
    info!(created = summary.created, skipped = summary.skipped, "seeded default profiles");
    Ok(summary)
}

const DEFAULT_PROFILES: [(&str, &str, &str); 16] = [
    ("ISTJ", "Logistician", "Practical and fact-minded, reliable and thorough in meeting commitments."),
    ("ISFJ", "Defender", "Dedicated and warm protectors, always ready to look after the people they care about."),
    ("INFJ", "Advocate", "Quiet and principled idealists who pursue meaning and connection."),
    ("INTJ", "Architect", "Imaginative and strategic thinkers with a plan for everything."),
    ("ISTP", "Virtuoso", "Bold and practical experimenters who master all kinds of tools."),
    ("ISFP", "Adventurer", "Flexible and gentle artists, ready to explore and experience something new."),
    ("INFP", "Mediator", "Poetic and kind idealists, eager to help a good cause."),
    ("INTP", "Logician", "Inventive thinkers with an unquenchable thirst for knowledge."),
    ("ESTP", "Entrepreneur", "Smart and energetic, perceptive people who enjoy living on the edge."),
    ("ESFP", "Entertainer", "Spontaneous and enthusiastic, life is never boring around them."),
    ("ENFP", "Campaigner", "Enthusiastic, creative, and sociable free spirits who find a reason to smile."),
    ("ENTP", "Debater", "Smart and curious thinkers who cannot resist an intellectual challenge."),
    ("ESTJ", "Executive", "Excellent administrators, unsurpassed at managing things and people."),
    ("ESFJ", "Consul", "Caring, social, and popular people, always eager to help."),
    ("ENFJ", "Protagonist", "Charismatic and inspiring leaders who energise their listeners."),
    ("ENTJ", "Commander", "Bold, imaginative, and strong-willed leaders who find or make a way."),
];

/// Name and one-line description for each of the sixteen codes.
pub fn default_profiles() -> Vec<TypeProfile> {
    DEFAULT_PROFILES
        .iter()
        .filter_map(|(code, name, description)| match TypeCode::parse(code) {
            Ok(code) => Some(TypeProfile::new(code, *name, *description)),
            Err(err) => {
                warn!(%err, "skipping malformed built-in profile");
                None
            }
        })
        .collect()
}

fn parse_int(raw: Option<&str>, default: i32) -> Option<i32> {
    match raw {
        None => Some(default),
        Some(value) => value.trim().parse::<i32>().ok(),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::survey::domain::{Dimension, Pole};

    #[test]
    fn parses_rows_with_defaults_and_aliases() {
        let csv = "text,dimension,keyed_pole,weight,order\n\
                   I enjoy parties,EI,E,,\n\
                   I trust facts,sn,s,2,40\n";
        let (drafts, skipped) = parse_questions(csv.as_bytes()).expect("parses");

        assert!(skipped.is_empty());
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].dimension, Dimension::IntroversionExtraversion);
        assert_eq!(drafts[0].keyed_pole, Pole::Second);
        assert_eq!(drafts[0].weight, 1);
        assert_eq!(drafts[0].order, 1);
        assert_eq!(drafts[1].keyed_pole, Pole::First);
        assert_eq!(drafts[1].weight, 2);
        assert_eq!(drafts[1].order, 40);
    }

    #[test]
    fn invalid_rows_are_skipped_with_row_numbers() {
        let csv = "text,dimension,keyed_pole,weight,order\n\
                   ,IE,E,1,1\n\
                   Unknown axis,XY,X,1,2\n\
                   Wrong pole,TF,J,1,3\n\
                   Heavy,JP,P,lots,4\n\
                   Fine,JP,P,1,5\n\
                   Overweight,JP,J,1500000000,6\n";
        let (drafts, skipped) = parse_questions(csv.as_bytes()).expect("parses");

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].text, "Fine");
        let rows: Vec<usize> = skipped.iter().map(|row| row.row).collect();
        assert_eq!(rows, vec![1, 2, 3, 4, 6]);
        assert!(skipped[4].reason.contains("1500000000"));
    }

    #[test]
    fn profile_rows_require_valid_codes() {
        let csv = "code,name,description,growth\n\
                   intj,Architect,Strategic,Share plans\n\
                   XXXX,Nobody,,\n";
        let (profiles, skipped) = parse_profiles(csv.as_bytes()).expect("parses");

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].code.as_str(), "INTJ");
        assert_eq!(profiles[0].growth, "Share plans");
        assert_eq!(profiles[0].work_style, "");
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn default_profiles_cover_every_code() {
        let codes: BTreeSet<String> = default_profiles()
            .into_iter()
            .map(|profile| profile.code.to_string())
            .collect();
        let expected: BTreeSet<String> =
            TypeCode::all().into_iter().map(|code| code.to_string()).collect();
        assert_eq!(codes, expected);
    }
}
