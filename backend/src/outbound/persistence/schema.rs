//! Diesel table definitions mirroring `backend/migrations`.
//!
//! Keep in step with the migrations; `diesel print-schema` regenerates the
//! column lists from a live database.

diesel::table! {
    /// Registered accounts. `username` carries a unique index.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        password_hash -> Text,
        is_confirmed -> Bool,
        is_active -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogued movies with their rating aggregate.
    movies (id) {
        id -> Uuid,
        title -> Varchar,
        rating_total -> Int8,
        rating_count -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per rated `(user_id, movie_id)` pair.
    user_movie_ratings (user_id, movie_id) {
        user_id -> Uuid,
        movie_id -> Uuid,
        rating -> Int2,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    adding_tasks (id) {
        id -> Uuid,
        creator_id -> Uuid,
        adding_type -> Varchar,
        kinopoisk_id -> Varchar,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Transactional outbox drained by background workers.
    outbox_messages (id) {
        id -> Uuid,
        topic -> Varchar,
        payload -> Jsonb,
        created_at -> Timestamptz,
        processed_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(user_movie_ratings -> users (user_id));
diesel::joinable!(user_movie_ratings -> movies (movie_id));
diesel::joinable!(adding_tasks -> users (creator_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    movies,
    user_movie_ratings,
    adding_tasks,
    outbox_messages,
);
