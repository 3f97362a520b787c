//! Document header and assembly.

use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::sections::TextSection;

/// Width of the rule under the document header.
pub const HEADER_RULE_WIDTH: usize = 68;

/// Formats `at` with a strftime pattern, falling back to RFC 3339 when the
/// pattern cannot be rendered.
pub fn format_timestamp(at: &DateTime<Local>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(format)).is_err() {
        return at.to_rfc3339();
    }
    out
}

/// Three header lines: source name, generation time, and a rule.
pub fn render_header(source_name: &str, generated_on: &str) -> String {
    format!(
        "# REPORT DEFINITION: {source_name}\n# GENERATED ON: {generated_on}\n{}\n",
        "=".repeat(HEADER_RULE_WIDTH)
    )
}

/// Concatenates the header and sections in order.
pub fn assemble(header: &str, sections: &[TextSection]) -> String {
    let mut out = String::from(header);
    for section in sections {
        section.render_into(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{NO_GROUPS, NO_PARAMETERS, SectionKind};
    use chrono::TimeZone;

    #[test]
    fn test_header_layout() {
        let header = render_header("orders.rpt", "2024-01-15 10:30:00");
        let lines: Vec<&str> = header.lines().collect();
        assert_eq!(lines[0], "# REPORT DEFINITION: orders.rpt");
        assert_eq!(lines[1], "# GENERATED ON: 2024-01-15 10:30:00");
        assert_eq!(lines[2].len(), HEADER_RULE_WIDTH);
        assert!(lines[2].chars().all(|c| c == '='));
    }

    #[test]
    fn test_format_timestamp_uses_pattern() {
        let at = Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_timestamp(&at, "%Y/%m/%d"), "2024/01/15");
    }

    #[test]
    fn test_format_timestamp_falls_back_on_bad_pattern() {
        let at = Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_timestamp(&at, "%Y-%"), at.to_rfc3339());
    }

    #[test]
    fn test_assemble_keeps_section_order() {
        let mut parameters = TextSection::new(SectionKind::Parameters);
        parameters.push(NO_PARAMETERS);
        let mut grouping = TextSection::new(SectionKind::Grouping);
        grouping.push(NO_GROUPS);

        let text = assemble("# HEADER\n", &[parameters, grouping]);
        assert_eq!(
            text,
            "# HEADER\n\n--- PARAMETERS ---\nNo parameters found.\n\n--- GROUPING ---\nNo groups found.\n"
        );
    }
}
