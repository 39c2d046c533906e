// SAFETY: This is a CLI tool where expect()/unwrap() on I/O is acceptable -
// failures should terminate the tool. println!/eprintln! are the correct
// output mechanism for CLI tools (not tracing).
#![allow(clippy::expect_used, clippy::unwrap_used)]
#![allow(clippy::print_stdout, clippy::print_stderr)]

//! Offsec Program - Seed demo data.
//!
//! Creates the schema if needed, ensures the admin user exists, and ensures
//! a program year row for the current calendar year.
//! Usage: cargo run --bin seed_demo

use chrono::{Datelike, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::process::ExitCode;

use offsec_program::bootstrap;
use offsec_program::config::Config;
use offsec_program::db::create_pool;
use offsec_program::models::program_year::ProgramYear;
use offsec_program::models::user::User;
use offsec_program::schema::{program_years, users};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter("offsec_program=info")
        .init();

    let pool = match create_pool(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to create database pool: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut conn = match pool.get().await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to get database connection: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Schema + admin user. Logs the generated API key if it seeds one.
    if let Err(e) = bootstrap::initialize(&mut conn, &config.seed).await {
        eprintln!("Bootstrap failed: {}", e);
        return ExitCode::FAILURE;
    }

    let admin: Option<User> = users::table
        .filter(users::username.eq(&config.seed.admin_username))
        .first(&mut conn)
        .await
        .optional()
        .expect("query admin user");
    match admin {
        Some(user) => println!("Admin user '{}' present (id {}).", user.username, user.id),
        None => println!(
            "Admin user '{}' not found; another user was seeded earlier.",
            config.seed.admin_username
        ),
    }

    // Ensure a program year row for the current calendar year.
    let year = Utc::now().year();
    let existing: Option<ProgramYear> = program_years::table
        .filter(program_years::year.eq(year))
        .first(&mut conn)
        .await
        .optional()
        .expect("query program year");

    if existing.is_none() {
        diesel::insert_into(program_years::table)
            .values((
                program_years::year.eq(year),
                program_years::theme.eq("Default program year"),
                program_years::objectives.eq("Seeded program year for initial testing."),
            ))
            .on_conflict(program_years::year)
            .do_nothing()
            .execute(&mut conn)
            .await
            .expect("insert program year");
        println!("Created ProgramYear for {}", year);
    } else {
        println!("ProgramYear for {} already exists.", year);
    }

    ExitCode::SUCCESS
}
