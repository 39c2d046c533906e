/// Offsec Program - ProgramYear model.
///
/// A yearly grouping of engagements, created lazily the first time an
/// engagement cites a year not yet present.
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::program_years;

/// Program year database model.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = program_years)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProgramYear {
    pub id: i32,
    pub year: i32,
    pub theme: Option<String>,
    pub objectives: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New program year for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = program_years)]
pub struct NewProgramYear {
    pub year: i32,
}
