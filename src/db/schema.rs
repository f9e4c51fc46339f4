//! SQL DDL for initializing the campus storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema. Timestamps are RFC3339 TEXT in UTC, booleans are
/// INTEGER 0/1, ids are UUIDv4 TEXT.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    role TEXT NOT NULL,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS auth_tokens (
    token TEXT PRIMARY KEY,
    profile_id TEXT NOT NULL REFERENCES profiles(id),
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS student_teachers (
    student_id TEXT NOT NULL REFERENCES profiles(id),
    teacher_id TEXT NOT NULL REFERENCES profiles(id),
    is_primary INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (student_id, teacher_id)
);

CREATE TABLE IF NOT EXISTS packages (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    sessions_per_month INTEGER NOT NULL,
    monthly_price_cents INTEGER NOT NULL,
    price_id_1m TEXT NOT NULL UNIQUE,
    price_id_3m TEXT NOT NULL UNIQUE,
    price_id_6m TEXT NOT NULL UNIQUE,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS subscriptions (
    id TEXT PRIMARY KEY,
    student_id TEXT NOT NULL REFERENCES profiles(id),
    package_id TEXT NOT NULL REFERENCES packages(id),
    status TEXT NOT NULL,
    duration_months INTEGER NOT NULL,
    starts_at TEXT NOT NULL,
    ends_at TEXT NOT NULL,
    sessions_total INTEGER NOT NULL,
    sessions_used INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_subscriptions_student ON subscriptions(student_id);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    subscription_id TEXT NOT NULL REFERENCES subscriptions(id),
    student_id TEXT NOT NULL REFERENCES profiles(id),
    teacher_id TEXT NOT NULL REFERENCES profiles(id),
    scheduled_at TEXT NOT NULL,
    duration_minutes INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'scheduled',
    meet_link TEXT NULL,
    teacher_notes TEXT NULL,
    reminder_sent_at TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_teacher_time ON sessions(teacher_id, scheduled_at);
CREATE INDEX IF NOT EXISTS idx_sessions_student_time ON sessions(student_id, scheduled_at);

CREATE TABLE IF NOT EXISTS teacher_availability (
    teacher_id TEXT NOT NULL REFERENCES profiles(id),
    weekday INTEGER NOT NULL,
    start_minute INTEGER NOT NULL,
    end_minute INTEGER NOT NULL,
    PRIMARY KEY (teacher_id, weekday, start_minute)
);

CREATE TABLE IF NOT EXISTS holidays (
    day TEXT PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS leads (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    locale TEXT NOT NULL,
    message TEXT NULL,
    consent INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
"#;
