//! v001 -- Initial schema creation.
//!
//! One table per entity. Relationships are plain text columns; the only
//! enforced foreign key is `users.account_id -> accounts(id)`, which removes
//! the signed-in user's profile when the account is deleted.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Accounts
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS accounts (
    id            TEXT PRIMARY KEY NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    phone         TEXT UNIQUE,
    access_token  TEXT NOT NULL,
    refresh_token TEXT,
    created_at    TEXT NOT NULL,              -- RFC-3339
    updated_at    TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id         TEXT PRIMARY KEY NOT NULL,
    account_id TEXT,                          -- nullable FK -> accounts(id)
    name       TEXT NOT NULL,
    email      TEXT NOT NULL UNIQUE,
    phone      TEXT UNIQUE,
    avatar_url TEXT,
    title      TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_users_account_id ON users(account_id);

-- ----------------------------------------------------------------
-- Workspaces
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS workspaces (
    id          TEXT PRIMARY KEY NOT NULL,
    name        TEXT NOT NULL,
    description TEXT,
    owner_id    TEXT NOT NULL,
    avatar_url  TEXT,
    member_ids  TEXT NOT NULL DEFAULT '[]',   -- JSON array of user ids
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Channels
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS channels (
    id           TEXT PRIMARY KEY NOT NULL,
    workspace_id TEXT NOT NULL,
    name         TEXT NOT NULL,
    description  TEXT,
    kind         TEXT NOT NULL,               -- public | private | direct
    member_ids   TEXT NOT NULL DEFAULT '[]',
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_channels_workspace_id ON channels(workspace_id);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id             TEXT PRIMARY KEY NOT NULL,
    channel_id     TEXT NOT NULL,
    sender_id      TEXT NOT NULL,
    content        TEXT NOT NULL,
    attachment_url TEXT,
    reply_to_id    TEXT,
    edited         INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_channel_ts
    ON messages(channel_id, created_at DESC);

-- ----------------------------------------------------------------
-- Epics
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS epics (
    id           TEXT PRIMARY KEY NOT NULL,
    workspace_id TEXT NOT NULL,
    title        TEXT NOT NULL,
    description  TEXT,
    status       TEXT NOT NULL,
    start_date   TEXT,
    due_date     TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_epics_workspace_id ON epics(workspace_id);

-- ----------------------------------------------------------------
-- Sprints
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS sprints (
    id           TEXT PRIMARY KEY NOT NULL,
    workspace_id TEXT NOT NULL,
    name         TEXT NOT NULL,
    goal         TEXT,
    status       TEXT NOT NULL,               -- planned | active | completed
    start_date   TEXT,
    end_date     TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sprints_workspace_id ON sprints(workspace_id);

-- ----------------------------------------------------------------
-- Tasks
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS tasks (
    id           TEXT PRIMARY KEY NOT NULL,
    workspace_id TEXT NOT NULL,
    epic_id      TEXT,
    sprint_id    TEXT,
    title        TEXT NOT NULL,
    description  TEXT,
    status       TEXT NOT NULL,
    priority     TEXT NOT NULL,
    assignee_id  TEXT,
    reporter_id  TEXT NOT NULL,
    due_date     TEXT,
    story_points INTEGER,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_workspace_id ON tasks(workspace_id);
CREATE INDEX IF NOT EXISTS idx_tasks_epic_id ON tasks(epic_id);
CREATE INDEX IF NOT EXISTS idx_tasks_sprint_id ON tasks(sprint_id);

-- ----------------------------------------------------------------
-- Bugs
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS bugs (
    id           TEXT PRIMARY KEY NOT NULL,
    workspace_id TEXT NOT NULL,
    task_id      TEXT,
    title        TEXT NOT NULL,
    description  TEXT,
    severity     TEXT NOT NULL,
    status       TEXT NOT NULL,
    reporter_id  TEXT NOT NULL,
    assignee_id  TEXT,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_bugs_workspace_id ON bugs(workspace_id);
CREATE INDEX IF NOT EXISTS idx_bugs_task_id ON bugs(task_id);

-- ----------------------------------------------------------------
-- Notifications
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS notifications (
    id         TEXT PRIMARY KEY NOT NULL,
    user_id    TEXT NOT NULL,
    kind       TEXT NOT NULL,
    title      TEXT NOT NULL,
    body       TEXT NOT NULL,
    entity_id  TEXT,
    read       INTEGER NOT NULL DEFAULT 0,    -- boolean 0/1
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notifications_user_ts
    ON notifications(user_id, created_at DESC);

-- ----------------------------------------------------------------
-- Invitations
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS invitations (
    id            TEXT PRIMARY KEY NOT NULL,
    workspace_id  TEXT NOT NULL,
    inviter_id    TEXT NOT NULL,
    invitee_email TEXT NOT NULL,
    invitee_id    TEXT,
    status        TEXT NOT NULL,              -- pending | accepted | declined | expired
    expires_at    TEXT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_invitations_workspace_id ON invitations(workspace_id);
CREATE INDEX IF NOT EXISTS idx_invitations_invitee_email ON invitations(invitee_email);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
