//! Output formatting for CLI operations.

use serde_json::json;

/// Summary printed by the `info` command.
pub struct ArchiveSummary {
    pub path: String,
    pub backend: String,
    pub directio: bool,
    pub used_hint: Option<String>,
    pub members: Option<usize>,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a member listing
    fn format_list(&self, members: &[String]) -> String;

    /// Formats archive information
    fn format_info(&self, summary: &ArchiveSummary) -> String;

    /// Formats the result of a file name search
    fn format_found(&self, filename: &str, found: Option<&str>) -> String;

    /// Formats a detected type
    fn format_type(&self, path: &str, mime: &str) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, members: &[String]) -> String {
        let mut output = String::new();
        for member in members {
            output.push_str(member);
            output.push('\n');
        }
        output.push_str(&format!("{} member(s)\n", members.len()));
        output
    }

    fn format_info(&self, summary: &ArchiveSummary) -> String {
        let mut output = String::new();
        output.push_str(&format!("Path:      {}\n", summary.path));
        output.push_str(&format!("Backend:   {}\n", summary.backend));
        output.push_str(&format!(
            "Direct IO: {}\n",
            if summary.directio { "yes" } else { "no" }
        ));
        if let Some(hint) = &summary.used_hint {
            output.push_str(&format!("Hint:      {}\n", hint));
        }
        match summary.members {
            Some(count) => output.push_str(&format!("Members:   {}\n", count)),
            None => output.push_str("Members:   (not listable)\n"),
        }
        output
    }

    fn format_found(&self, filename: &str, found: Option<&str>) -> String {
        match found {
            Some(path) => format!("{}\n", path),
            None => format!("{}: no such member\n", filename),
        }
    }

    fn format_type(&self, path: &str, mime: &str) -> String {
        format!("{}: {}\n", path, mime)
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, members: &[String]) -> String {
        serde_json::to_string_pretty(members).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_info(&self, summary: &ArchiveSummary) -> String {
        let obj = json!({
            "path": summary.path,
            "backend": summary.backend,
            "directio": summary.directio,
            "used_hint": summary.used_hint,
            "members": summary.members,
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_found(&self, filename: &str, found: Option<&str>) -> String {
        let obj = json!({ "filename": filename, "path": found });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_type(&self, path: &str, mime: &str) -> String {
        let obj = json!({ "path": path, "type": mime });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
