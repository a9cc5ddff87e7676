//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Normalised login email, unique.
        email -> Varchar,
        /// Argon2 hash in PHC string format.
        password_hash -> Text,
        /// Street address.
        address -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue items and their current owner.
    items (id) {
        /// Primary key.
        id -> Uuid,
        /// Title of the game.
        name -> Varchar,
        /// Publishing company.
        publisher -> Varchar,
        /// Year of first publication.
        year_published -> Int4,
        /// Platform.
        system -> Varchar,
        /// Condition description.
        condition -> Varchar,
        /// Number of earlier owners.
        previous_owners -> Int4,
        /// Current owner, references `users.id`.
        owner_id -> Uuid,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Two-party trade offers.
    trade_offers (id) {
        /// Primary key.
        id -> Uuid,
        /// Proposer, references `users.id`.
        offered_by -> Uuid,
        /// Recipient, references `users.id`.
        offered_to -> Uuid,
        /// Item the proposer wants. No foreign key.
        requested_item -> Uuid,
        /// Item the proposer gives up. No foreign key.
        offered_item -> Uuid,
        /// One of `pending`, `accepted`, `rejected`.
        status -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last transition timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(items -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(users, items, trade_offers);
