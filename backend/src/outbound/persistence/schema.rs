//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered users and their profile fields.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        about -> Nullable<Text>,
        role -> Varchar,
        hashed_password -> Varchar,
        salt -> Varchar,
        photo_data -> Nullable<Bytea>,
        photo_content_type -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Directed follow edges; `follower_id` follows `followee_id`.
    follows (follower_id, followee_id) {
        follower_id -> Uuid,
        followee_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(follows, users);
