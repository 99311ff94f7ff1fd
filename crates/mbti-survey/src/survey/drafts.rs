//! In-progress answers held in the user's session between pages.
//!
//! Answers are keyed by form field name (`q_<question id>`) exactly as the test
//! page posts them, so drafts and submitted forms merge without translation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::LikertChoice;

const FIELD_PREFIX: &str = "q_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftAnswers(BTreeMap<String, String>);

impl DraftAnswers {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merges an autosave payload. Only `q_` keys with string or number
    /// values are kept.
    pub fn merge_json(&mut self, answers: &serde_json::Map<String, Value>) {
        for (key, value) in answers {
            if !key.starts_with(FIELD_PREFIX) {
                continue;
            }
            let value = match value {
                Value::String(raw) => raw.trim().to_string(),
                Value::Number(number) => number.to_string(),
                _ => continue,
            };
            self.0.insert(key.clone(), value);
        }
    }

    /// Merges posted form fields; only `q_` fields are taken and they override drafts.
    pub fn merge_form<'a, I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (key, value) in fields {
            if key.starts_with(FIELD_PREFIX) {
                self.0.insert(key.clone(), value.trim().to_string());
            }
        }
    }

    /// Raw saved values keyed by question id, for pre-selecting radio buttons.
    pub fn saved_values(&self) -> BTreeMap<i64, String> {
        self.0
            .iter()
            .filter_map(|(key, value)| question_id(key).map(|id| (id, value.clone())))
            .collect()
    }

    /// Well-formed answers keyed by question id. Malformed keys and choices
    /// outside the Likert scale are dropped.
    pub fn choices(&self) -> BTreeMap<i64, LikertChoice> {
        self.0
            .iter()
            .filter_map(|(key, value)| {
                let id = question_id(key)?;
                let choice = LikertChoice::parse(value).ok()?;
                Some((id, choice))
            })
            .collect()
    }
}

fn question_id(key: &str) -> Option<i64> {
    key.strip_prefix(FIELD_PREFIX)?.parse::<i64>().ok()
}
