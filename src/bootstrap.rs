/// Offsec Program - Database bootstrap.
///
/// Creates the schema (idempotent `CREATE TABLE IF NOT EXISTS`) and seeds the
/// initial admin user when the users table is empty. Cascade behaviour lives
/// in the DDL: deleting an engagement removes its associations, findings,
/// timeline events and comments in one statement; deleting a finding removes
/// its asset links and comments. Assets and templates themselves survive.
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::info;

use crate::config::SeedConfig;
use crate::db::DbConnection;
use crate::error::AppResult;
use crate::models::user::{NewUser, User, UserRole};
use crate::schema::users;

const DDL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(50) NOT NULL UNIQUE,
        full_name VARCHAR(100),
        email VARCHAR(100) UNIQUE,
        role VARCHAR(20) NOT NULL DEFAULT 'red',
        api_key VARCHAR(64) UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS program_years (
        id SERIAL PRIMARY KEY,
        year INTEGER NOT NULL UNIQUE,
        theme TEXT,
        objectives TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS engagements (
        id SERIAL PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        program_year_id INTEGER REFERENCES program_years(id),
        engagement_type VARCHAR(30) NOT NULL,
        business_unit VARCHAR(100),
        owner_id INTEGER REFERENCES users(id),
        status VARCHAR(30) NOT NULL DEFAULT 'Planned',
        start_date DATE,
        end_date DATE,
        scope_summary TEXT,
        objectives TEXT,
        methodology TEXT,
        exec_summary TEXT,
        recommendations_overall TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS intake_requests (
        id SERIAL PRIMARY KEY,
        title VARCHAR(200) NOT NULL,
        requester_name VARCHAR(100),
        requester_email VARCHAR(100),
        business_unit VARCHAR(100),
        system_name VARCHAR(200),
        description TEXT,
        risk_level VARCHAR(30),
        desired_window VARCHAR(100),
        engagement_type VARCHAR(30),
        status VARCHAR(30) NOT NULL DEFAULT 'New',
        linked_engagement_id INTEGER REFERENCES engagements(id) ON DELETE SET NULL,
        created_by_id INTEGER REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS assets (
        id SERIAL PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        asset_type VARCHAR(50) NOT NULL,
        identifier VARCHAR(255),
        environment VARCHAR(50),
        business_unit VARCHAR(100),
        criticality VARCHAR(20),
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS engagement_assets (
        id SERIAL PRIMARY KEY,
        engagement_id INTEGER NOT NULL REFERENCES engagements(id) ON DELETE CASCADE,
        asset_id INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE,
        role VARCHAR(50),
        notes TEXT
    )",
    "CREATE TABLE IF NOT EXISTS finding_templates (
        id SERIAL PRIMARY KEY,
        title VARCHAR(200) NOT NULL,
        category VARCHAR(100),
        severity_default VARCHAR(20),
        description TEXT,
        impact TEXT,
        recommendation TEXT,
        cwe_id VARCHAR(20),
        attack_techniques TEXT,
        external_references TEXT,
        created_by_id INTEGER REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS findings (
        id SERIAL PRIMARY KEY,
        engagement_id INTEGER NOT NULL REFERENCES engagements(id) ON DELETE CASCADE,
        template_id INTEGER REFERENCES finding_templates(id) ON DELETE SET NULL,
        title VARCHAR(200) NOT NULL,
        severity VARCHAR(20) NOT NULL,
        status VARCHAR(30) NOT NULL DEFAULT 'New',
        description TEXT,
        impact TEXT,
        poc TEXT,
        recommendation TEXT,
        attack_techniques TEXT,
        remediation_status VARCHAR(30) NOT NULL DEFAULT 'Not-Started',
        remediation_owner VARCHAR(100),
        due_date DATE,
        detection_status VARCHAR(30),
        detection_notes TEXT,
        risk_accepted BOOLEAN NOT NULL DEFAULT FALSE,
        risk_accepted_notes TEXT,
        created_by_id INTEGER REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS finding_assets (
        id SERIAL PRIMARY KEY,
        finding_id INTEGER NOT NULL REFERENCES findings(id) ON DELETE CASCADE,
        asset_id INTEGER NOT NULL REFERENCES assets(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS timeline_events (
        id SERIAL PRIMARY KEY,
        engagement_id INTEGER NOT NULL REFERENCES engagements(id) ON DELETE CASCADE,
        user_id INTEGER REFERENCES users(id),
        event_type VARCHAR(50) NOT NULL,
        summary VARCHAR(255) NOT NULL,
        details TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS comments (
        id SERIAL PRIMARY KEY,
        engagement_id INTEGER REFERENCES engagements(id) ON DELETE CASCADE,
        finding_id INTEGER REFERENCES findings(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id),
        text TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

/// Generate a URL-safe random API key.
pub fn generate_api_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

/// Create all tables and seed the initial admin user.
///
/// Safe to run on every startup. The generated admin API key is logged
/// exactly once, at first seed; it is never logged again.
pub async fn initialize(conn: &mut DbConnection, seed: &SeedConfig) -> AppResult<()> {
    for statement in DDL {
        diesel::sql_query(*statement).execute(conn).await?;
    }

    let user_count: i64 = users::table.count().get_result(conn).await?;
    if user_count == 0 {
        let api_key = generate_api_key();
        let new_user = NewUser {
            username: seed.admin_username.clone(),
            full_name: Some(seed.admin_full_name.clone()),
            email: Some(seed.admin_email.clone()),
            role: UserRole::Admin.as_str().to_string(),
            api_key: Some(api_key.clone()),
        };
        let user: User = diesel::insert_into(users::table)
            .values(&new_user)
            .get_result(conn)
            .await?;
        info!(
            username = %user.username,
            api_key = %api_key,
            "seeded initial admin user; store this API key now, it will not be shown again"
        );
    }

    Ok(())
}
