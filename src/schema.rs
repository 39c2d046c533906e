// Diesel table definitions for the offsec program schema.
//
// The DDL itself lives in bootstrap.rs; these definitions must stay in sync
// with it (column order matters for Queryable derives).

diesel::table! {
    users (id) {
        id -> Int4,
        username -> Varchar,
        full_name -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        role -> Varchar,
        api_key -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    program_years (id) {
        id -> Int4,
        year -> Int4,
        theme -> Nullable<Text>,
        objectives -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    intake_requests (id) {
        id -> Int4,
        title -> Varchar,
        requester_name -> Nullable<Varchar>,
        requester_email -> Nullable<Varchar>,
        business_unit -> Nullable<Varchar>,
        system_name -> Nullable<Varchar>,
        description -> Nullable<Text>,
        risk_level -> Nullable<Varchar>,
        desired_window -> Nullable<Varchar>,
        engagement_type -> Nullable<Varchar>,
        status -> Varchar,
        linked_engagement_id -> Nullable<Int4>,
        created_by_id -> Nullable<Int4>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    engagements (id) {
        id -> Int4,
        name -> Varchar,
        program_year_id -> Nullable<Int4>,
        engagement_type -> Varchar,
        business_unit -> Nullable<Varchar>,
        owner_id -> Nullable<Int4>,
        status -> Varchar,
        start_date -> Nullable<Date>,
        end_date -> Nullable<Date>,
        scope_summary -> Nullable<Text>,
        objectives -> Nullable<Text>,
        methodology -> Nullable<Text>,
        exec_summary -> Nullable<Text>,
        recommendations_overall -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    assets (id) {
        id -> Int4,
        name -> Varchar,
        asset_type -> Varchar,
        identifier -> Nullable<Varchar>,
        environment -> Nullable<Varchar>,
        business_unit -> Nullable<Varchar>,
        criticality -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    engagement_assets (id) {
        id -> Int4,
        engagement_id -> Int4,
        asset_id -> Int4,
        role -> Nullable<Varchar>,
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    finding_templates (id) {
        id -> Int4,
        title -> Varchar,
        category -> Nullable<Varchar>,
        severity_default -> Nullable<Varchar>,
        description -> Nullable<Text>,
        impact -> Nullable<Text>,
        recommendation -> Nullable<Text>,
        cwe_id -> Nullable<Varchar>,
        attack_techniques -> Nullable<Text>,
        external_references -> Nullable<Text>,
        created_by_id -> Nullable<Int4>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    findings (id) {
        id -> Int4,
        engagement_id -> Int4,
        template_id -> Nullable<Int4>,
        title -> Varchar,
        severity -> Varchar,
        status -> Varchar,
        description -> Nullable<Text>,
        impact -> Nullable<Text>,
        poc -> Nullable<Text>,
        recommendation -> Nullable<Text>,
        attack_techniques -> Nullable<Text>,
        remediation_status -> Varchar,
        remediation_owner -> Nullable<Varchar>,
        due_date -> Nullable<Date>,
        detection_status -> Nullable<Varchar>,
        detection_notes -> Nullable<Text>,
        risk_accepted -> Bool,
        risk_accepted_notes -> Nullable<Text>,
        created_by_id -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    finding_assets (id) {
        id -> Int4,
        finding_id -> Int4,
        asset_id -> Int4,
    }
}

diesel::table! {
    timeline_events (id) {
        id -> Int4,
        engagement_id -> Int4,
        user_id -> Nullable<Int4>,
        event_type -> Varchar,
        summary -> Varchar,
        details -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    comments (id) {
        id -> Int4,
        engagement_id -> Nullable<Int4>,
        finding_id -> Nullable<Int4>,
        user_id -> Int4,
        text -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(engagements -> program_years (program_year_id));
diesel::joinable!(engagements -> users (owner_id));
diesel::joinable!(intake_requests -> engagements (linked_engagement_id));
diesel::joinable!(intake_requests -> users (created_by_id));
diesel::joinable!(engagement_assets -> engagements (engagement_id));
diesel::joinable!(engagement_assets -> assets (asset_id));
diesel::joinable!(finding_templates -> users (created_by_id));
diesel::joinable!(findings -> engagements (engagement_id));
diesel::joinable!(findings -> finding_templates (template_id));
diesel::joinable!(findings -> users (created_by_id));
diesel::joinable!(finding_assets -> findings (finding_id));
diesel::joinable!(finding_assets -> assets (asset_id));
diesel::joinable!(timeline_events -> engagements (engagement_id));
diesel::joinable!(timeline_events -> users (user_id));
diesel::joinable!(comments -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    program_years,
    intake_requests,
    engagements,
    assets,
    engagement_assets,
    finding_templates,
    findings,
    finding_assets,
    timeline_events,
    comments,
);
