use std::fmt::Write;

use calendar_db::schema::{self, EVENTS_TABLE};
use calendar_types::NewEvent;

const DASHBOARD_URL: &str = "https://supabase.com/dashboard";
const RULE: &str = "================================================================";
const SEPARATOR: &str = "----------------------------------------";

/// Step-by-step manual setup through the dashboard SQL editor, including
/// the full schema script and the sample rows.
pub fn render(project_ref: Option<&str>, samples: &[NewEvent]) -> String {
    let project = match project_ref {
        Some(reference) => format!("Open project '{}'", reference),
        None => "Open your project".to_string(),
    };

    let mut text = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(text, "{}", RULE);
    let _ = writeln!(text, "Manual setup (dashboard SQL editor)");
    let _ = writeln!(text, "{}", RULE);
    let _ = writeln!(text, "1. Sign in at {}", DASHBOARD_URL);
    let _ = writeln!(text, "2. {}", project);
    let _ = writeln!(text, "3. Choose 'SQL Editor' in the left menu");
    let _ = writeln!(text, "4. Click 'New query'");
    let _ = writeln!(text, "5. Paste the SQL below:");
    let _ = writeln!(text, "{}", SEPARATOR);
    let _ = writeln!(text, "{}", schema::script());
    if !samples.is_empty() {
        let _ = writeln!(text);
        let _ = writeln!(text, "-- Insert sample data");
        let _ = writeln!(text, "{}", insert_sql(samples));
    }
    let _ = writeln!(text, "{}", SEPARATOR);
    let _ = writeln!(text, "6. Click 'Run'");
    let _ = writeln!(text, "7. Confirm the success message, then run this tool again to verify");
    let _ = writeln!(text, "{}", RULE);
    text
}

/// A single multi-row INSERT for `events`.
pub fn insert_sql(events: &[NewEvent]) -> String {
    let rows: Vec<String> = events
        .iter()
        .map(|event| {
            format!(
                "({}, '{}', {}, {}, '{}', {}, {}, {}, {}, {})",
                quote(&event.title),
                event.date.format("%Y-%m-%d"),
                optional(event.start_time.map(|t| t.format("%H:%M:%S").to_string())),
                optional(event.end_time.map(|t| t.format("%H:%M:%S").to_string())),
                event.category,
                optional(event.description.clone()),
                optional(event.location.clone()),
                event.is_all_day,
                event.reminder.map_or_else(|| "null".to_string(), |minutes| minutes.to_string()),
                optional(event.recurring.map(|r| r.to_string())),
            )
        })
        .collect();

    format!(
        "INSERT INTO {} (title, date, start_time, end_time, category, description, location, is_all_day, reminder, recurring) VALUES\n{};",
        EVENTS_TABLE,
        rows.join(",\n")
    )
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn optional(value: Option<String>) -> String {
    value.as_deref().map(quote).unwrap_or_else(|| "null".to_string())
}
