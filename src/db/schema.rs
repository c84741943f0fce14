pub const SCHEMA: &str = r#"
-- Households: one row per address identifier
CREATE TABLE IF NOT EXISTS households (
    address_id TEXT PRIMARY KEY,
    owner_name TEXT NOT NULL,
    owner_age INTEGER NOT NULL,
    owner_occupation TEXT NOT NULL DEFAULT '',
    owner_designation TEXT NOT NULL DEFAULT '',
    mobile TEXT NOT NULL,
    address TEXT NOT NULL,
    owner_photo BLOB          -- Raw image file bytes, stored as-is
);

-- Family members: dependents of exactly one household
CREATE TABLE IF NOT EXISTS family_members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    address_id TEXT NOT NULL,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    relation TEXT NOT NULL,
    occupation TEXT NOT NULL,
    designation TEXT NOT NULL,
    mobile TEXT NOT NULL,
    photo BLOB,
    FOREIGN KEY (address_id) REFERENCES households(address_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_family_members_address ON family_members(address_id);
"#;
