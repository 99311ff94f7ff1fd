use sqlx::SqlitePool;

use super::StoreError;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        draft_answers TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS questionnaires (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        questionnaire_id INTEGER REFERENCES questionnaires(id) ON DELETE CASCADE,
        text TEXT NOT NULL,
        dimension TEXT NOT NULL,
        keyed_pole TEXT NOT NULL,
        weight INTEGER NOT NULL DEFAULT 1,
        display_order INTEGER NOT NULL DEFAULT 0,
        active INTEGER NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS responses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
        choice INTEGER NOT NULL,
        questionnaire_id INTEGER REFERENCES questionnaires(id) ON DELETE SET NULL,
        created_at TEXT NOT NULL,
        UNIQUE (user_id, question_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS results (
        user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        type_code TEXT NOT NULL,
        score_detail TEXT NOT NULL,
        confidence TEXT NOT NULL,
        questionnaire_id INTEGER REFERENCES questionnaires(id) ON DELETE SET NULL,
        computed_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS type_profiles (
        code TEXT PRIMARY KEY,
        name TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        strengths TEXT NOT NULL DEFAULT '',
        growth TEXT NOT NULL DEFAULT '',
        personality_traits TEXT NOT NULL DEFAULT '',
        work_style TEXT NOT NULL DEFAULT '',
        interpersonal_relations TEXT NOT NULL DEFAULT '',
        emotional_expression TEXT NOT NULL DEFAULT '',
        decision_making TEXT NOT NULL DEFAULT '',
        stress_management TEXT NOT NULL DEFAULT '',
        learning_style TEXT NOT NULL DEFAULT '',
        career_suggestions TEXT NOT NULL DEFAULT '',
        life_philosophy TEXT NOT NULL DEFAULT '',
        communication_style TEXT NOT NULL DEFAULT ''
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS questions_text_per_questionnaire ON questions (questionnaire_id, text)",
    "CREATE INDEX IF NOT EXISTS questions_display ON questions (questionnaire_id, active, display_order, id)",
    "CREATE INDEX IF NOT EXISTS sessions_user ON sessions (user_id)",
];

/// Idempotent; safe to run on every start.
pub(super) async fn create_tables(pool: &SqlitePool) -> Result<(), StoreError> {
    for statement in TABLES {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
