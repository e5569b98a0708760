use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS assessments (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        day DATE NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS assessments_day_idx ON assessments (day)",
    r#"
    CREATE TABLE IF NOT EXISTS assessment_questions (
        id BIGSERIAL PRIMARY KEY,
        assessment_id BIGINT NOT NULL REFERENCES assessments (id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        category TEXT NOT NULL,
        kind TEXT NOT NULL,
        text TEXT NOT NULL,
        options JSONB NOT NULL DEFAULT '[]'::jsonb,
        correct_answer TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS assessment_attempts (
        id BIGSERIAL PRIMARY KEY,
        user_id UUID NOT NULL,
        assessment_id BIGINT REFERENCES assessments (id) ON DELETE SET NULL,
        score INTEGER NOT NULL,
        responses JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS coding_submissions (
        id BIGSERIAL PRIMARY KEY,
        user_id UUID NOT NULL,
        problem_id BIGINT NOT NULL,
        code TEXT NOT NULL,
        language TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interview_sessions (
        id BIGSERIAL PRIMARY KEY,
        user_id UUID NOT NULL,
        job_description TEXT NOT NULL,
        resume_text TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT 'active',
        feedback JSONB,
        score INTEGER,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interview_messages (
        id BIGSERIAL PRIMARY KEY,
        session_id BIGINT NOT NULL REFERENCES interview_sessions (id) ON DELETE CASCADE,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates any missing tables. Safe to run on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("failed to apply schema")?;
    }
    info!("Database schema ready ({} statements)", SCHEMA.len());
    Ok(())
}
