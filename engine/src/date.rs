//! Human-readable date formatting.

use chrono::{DateTime, Locale, Utc};

/// Format a timestamp the way profile pages show it, e.g. `05 de março de 2025`.
pub fn format_human_readable(at: &DateTime<Utc>) -> String {
    at.format_localized("%d de %B de %Y", Locale::pt_PT)
        .to_string()
}
