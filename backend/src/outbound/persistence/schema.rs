//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate them with `diesel print-schema`.

diesel::table! {
    /// Registered users.
    users (id) {
        id -> Int8,
        /// Unique; enforced by `users_name_key`.
        name -> Varchar,
        age -> Int4,
        birthday -> Date,
        height -> Nullable<Float8>,
        zip_code -> Nullable<Varchar>,
        /// Stamped by the service as `yyyy-MM-dd HH:mm:ss`.
        created_at -> Varchar,
        updated_at -> Varchar,
    }
}

diesel::table! {
    /// Career entries owned by a user; removed with their owner.
    career_histories (id) {
        id -> Int8,
        user_id -> Int8,
        title -> Varchar,
        period_from -> Date,
        period_to -> Date,
    }
}

diesel::joinable!(career_histories -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(career_histories, users);
