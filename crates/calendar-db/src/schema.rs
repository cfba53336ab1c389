//! DDL for the events table, in the order it has to be applied.
//!
//! Only the extension uses `IF NOT EXISTS`. Re-applying the enum types or
//! the table fails with an "already exists" error; callers report that per
//! statement and carry on.

pub const EVENTS_TABLE: &str = "events";

/// One independently executed DDL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaStatement {
    pub description: &'static str,
    pub sql: &'static str,
}

pub const STATEMENTS: [SchemaStatement; 12] = [
    SchemaStatement {
        description: "Enable uuid-ossp extension",
        sql: r#"CREATE EXTENSION IF NOT EXISTS "uuid-ossp";"#,
    },
    SchemaStatement {
        description: "Create church_category enum type",
        sql: "CREATE TYPE church_category AS ENUM (
  'church',
  'adult',
  'youth',
  'advisory',
  'women',
  'student',
  'children'
);",
    },
    SchemaStatement {
        description: "Create recurring_type enum type",
        sql: "CREATE TYPE recurring_type AS ENUM (
  'daily',
  'weekly',
  'monthly',
  'yearly'
);",
    },
    SchemaStatement {
        description: "Create events table",
        sql: "CREATE TABLE events (
  id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
  title VARCHAR(255) NOT NULL,
  date DATE NOT NULL,
  start_time TIME,
  end_time TIME,
  category church_category NOT NULL DEFAULT 'church',
  description TEXT,
  location VARCHAR(255),
  is_all_day BOOLEAN NOT NULL DEFAULT false,
  reminder INTEGER, -- minutes before event
  recurring recurring_type,
  created_at TIMESTAMP WITH TIME ZONE DEFAULT timezone('utc'::text, now()) NOT NULL,
  updated_at TIMESTAMP WITH TIME ZONE DEFAULT timezone('utc'::text, now()) NOT NULL
);",
    },
    SchemaStatement {
        description: "Create indexes on date, category, created_at",
        sql: "CREATE INDEX idx_events_date ON events(date);
CREATE INDEX idx_events_category ON events(category);
CREATE INDEX idx_events_created_at ON events(created_at);",
    },
    SchemaStatement {
        description: "Create updated_at trigger function",
        sql: "CREATE OR REPLACE FUNCTION update_updated_at_column()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = timezone('utc'::text, now());
    RETURN NEW;
END;
$$ language 'plpgsql';",
    },
    SchemaStatement {
        description: "Attach updated_at trigger",
        sql: "CREATE TRIGGER update_events_updated_at
    BEFORE UPDATE ON events
    FOR EACH ROW
    EXECUTE FUNCTION update_updated_at_column();",
    },
    SchemaStatement {
        description: "Enable row level security",
        sql: "ALTER TABLE events ENABLE ROW LEVEL SECURITY;",
    },
    SchemaStatement {
        description: "Create read policy",
        sql: r#"CREATE POLICY "Enable read access for all users" ON events
    FOR SELECT USING (true);"#,
    },
    SchemaStatement {
        description: "Create insert policy",
        sql: r#"CREATE POLICY "Enable insert for all users" ON events
    FOR INSERT WITH CHECK (true);"#,
    },
    SchemaStatement {
        description: "Create update policy",
        sql: r#"CREATE POLICY "Enable update for all users" ON events
    FOR UPDATE USING (true);"#,
    },
    SchemaStatement {
        description: "Create delete policy",
        sql: r#"CREATE POLICY "Enable delete for all users" ON events
    FOR DELETE USING (true);"#,
    },
];

/// All statements as one script, for pasting into a SQL editor.
pub fn script() -> String {
    STATEMENTS
        .iter()
        .map(|statement| format!("-- {}\n{}", statement.description, statement.sql))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(fragment: &str) -> usize {
        STATEMENTS
            .iter()
            .position(|s| s.sql.contains(fragment))
            .unwrap_or_else(|| panic!("no statement contains {:?}", fragment))
    }

    #[test]
    fn dependencies_come_first() {
        assert!(position("uuid-ossp") < position("CREATE TABLE events"));
        assert!(position("church_category AS ENUM") < position("CREATE TABLE events"));
        assert!(position("recurring_type AS ENUM") < position("CREATE TABLE events"));
        assert!(position("CREATE TABLE events") < position("idx_events_date"));
        assert!(position("FUNCTION update_updated_at_column") < position("CREATE TRIGGER"));
        assert!(position("ENABLE ROW LEVEL SECURITY") < position("FOR SELECT"));
    }

    #[test]
    fn four_permissive_policies() {
        let policies: Vec<_> = STATEMENTS.iter().filter(|s| s.sql.starts_with("CREATE POLICY")).collect();
        assert_eq!(policies.len(), 4);
        assert!(policies.iter().all(|s| s.sql.contains("(true)")));
    }

    #[test]
    fn enum_types_match_domain_values() {
        let category_sql = STATEMENTS[position("church_category AS ENUM")].sql;
        for category in calendar_types::Category::ALL {
            assert!(category_sql.contains(&format!("'{}'", category)));
        }

        let recurrence_sql = STATEMENTS[position("recurring_type AS ENUM")].sql;
        for recurrence in calendar_types::Recurrence::ALL {
            assert!(recurrence_sql.contains(&format!("'{}'", recurrence)));
        }
    }

    #[test]
    fn script_keeps_statement_order() {
        let script = script();
        let table = script.find("CREATE TABLE events").unwrap();
        let trigger = script.find("CREATE TRIGGER").unwrap();
        assert!(table < trigger);
        assert!(script.starts_with("-- Enable uuid-ossp extension"));
    }
}
