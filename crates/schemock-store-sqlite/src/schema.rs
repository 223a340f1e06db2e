//! SQL schema for the schemock SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS owners (
    owner_id    TEXT PRIMARY KEY,
    label       TEXT,
    created_at  TEXT NOT NULL
);

-- Only the SHA-256 hex digest of a bearer token is ever stored.
CREATE TABLE IF NOT EXISTS api_tokens (
    token_hash  TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES owners(owner_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL
);

-- Schemas are never updated after insert.
CREATE TABLE IF NOT EXISTS schemas (
    id                TEXT PRIMARY KEY,
    owner_id          TEXT NOT NULL REFERENCES owners(owner_id) ON DELETE CASCADE,
    name              TEXT NOT NULL,
    description       TEXT,
    schema_definition TEXT NOT NULL,   -- JSON object, field order preserved
    api_slug          TEXT NOT NULL UNIQUE,
    created_at        TEXT NOT NULL    -- RFC 3339 UTC, fixed width
);

CREATE TABLE IF NOT EXISTS generated_data (
    id          TEXT PRIMARY KEY,
    schema_id   TEXT NOT NULL REFERENCES schemas(id) ON DELETE CASCADE,
    data        TEXT NOT NULL,         -- opaque JSON payload
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS schemas_owner_idx        ON schemas(owner_id, created_at);
CREATE INDEX IF NOT EXISTS generated_data_schema_idx ON generated_data(schema_id, created_at);

PRAGMA user_version = 1;
";
