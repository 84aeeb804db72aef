//! Reminder message composition for both channels.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::models::application::ApplicationRow;

/// `Jan 5, 2026, 03:30 PM`
const DEADLINE_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub fn format_deadline(deadline: DateTime<Utc>, tz: Tz) -> String {
    deadline.with_timezone(&tz).format(DEADLINE_FORMAT).to_string()
}

/// Builds the message for the reminder at `reminder_index` (0-based).
pub fn compose(record: &ApplicationRow, reminder_index: usize, tz: Tz) -> ReminderMessage {
    let ordinal = reminder_index + 1;
    let deadline = record
        .deadline
        .map(|d| format_deadline(d, tz))
        .unwrap_or_else(|| "(no deadline)".to_string());

    let subject = format!("Reminder #{ordinal}: {} at {}", record.role, record.name);

    let mut html = format!(
        "<h2>Application deadline approaching</h2>\
         <p>This is reminder #{ordinal} for your application to <strong>{company}</strong>.</p>\
         <ul>\
         <li><strong>Company:</strong> {company}</li>\
         <li><strong>Role:</strong> {role}</li>\
         <li><strong>Deadline:</strong> {deadline}</li>\
         </ul>",
        company = escape_html(&record.name),
        role = escape_html(&record.role),
        deadline = escape_html(&deadline),
    );
    if let Some(link) = record.link.as_deref().filter(|l| !l.trim().is_empty()) {
        let link = escape_html(link.trim());
        html.push_str(&format!("<p><a href=\"{link}\">Apply here</a></p>"));
    }
    html.push_str(
        "<p>Don't forget to submit your application before the deadline!</p>\
         <p>Good luck!<br/>Placement-Alarm</p>\
         <hr/>\
         <p style=\"font-size: 12px; color: #6B7280;\">\
         This is an automated reminder from Placement Alarm.</p>",
    );

    let mut text = format!(
        "⏰ Reminder #{ordinal}: your application for {role} at {company} is due {deadline}.",
        role = record.role,
        company = record.name,
    );
    if let Some(link) = record.link.as_deref().filter(|l| !l.trim().is_empty()) {
        text.push_str(&format!("\nApply: {}", link.trim()));
    }
    text.push_str("\n\nDon't forget to submit before the deadline!");
    text.push_str("\n\n_Automated reminder from Placement Alarm_");

    ReminderMessage {
        subject,
        html,
        text,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
