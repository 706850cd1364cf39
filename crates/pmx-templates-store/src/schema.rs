use rusqlite_migration::{M, Migrations};

pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "CREATE TABLE templates (
            name            TEXT PRIMARY KEY,
            description     TEXT,
            keywords        TEXT,
            template_type   TEXT,
            image_count     INTEGER NOT NULL DEFAULT 0,
            template_json   TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX idx_templates_type ON templates(template_type);",
    )])
}
