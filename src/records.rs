//! QA/info records and bounded-string handling.
//!
//! The exchange format bounds every stored string: entity and variable names,
//! QA record fields, info lines, and the store title. Oversized input is
//! truncated with a warning rather than rejected, matching the historic
//! tolerance for oversized metadata. The bounds are enforced here, at the
//! model boundary, while the in-memory representation stays a plain `String`.

use serde::{Deserialize, Serialize};

/// Maximum length of a QA record field.
pub const MAX_STR_LENGTH: usize = 32;
/// Maximum length of an info line and of the store title.
pub const MAX_LINE_LENGTH: usize = 80;
/// Maximum length of an entity, variable, attribute, or coordinate name.
pub const MAX_NAME_LENGTH: usize = 256;

/// Truncate `value` to at most `max` characters, keeping the head.
///
/// Emits a warning when truncation occurs; `context` names the field.
pub(crate) fn bound_string(value: &str, max: usize, context: &str) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    log::warn!("{context} `{value}` exceeds maximum length {max}; it will be truncated");
    value.chars().take(max).collect()
}

/// Truncate a title to [`MAX_LINE_LENGTH`] characters, keeping the *tail*.
///
/// The tail-keeping behavior is a long-standing quirk of the format: titles
/// are commonly prefixed with generator boilerplate, and the suffix carries
/// the distinguishing part.
pub(crate) fn bound_title(value: &str) -> String {
    let len = value.chars().count();
    if len <= MAX_LINE_LENGTH {
        return value.to_string();
    }
    log::warn!(
        "title `{value}` exceeds maximum line length {MAX_LINE_LENGTH}; it will be truncated"
    );
    value.chars().skip(len - MAX_LINE_LENGTH).collect()
}

/// Shorthand for the common name bound.
pub(crate) fn bound_name(value: &str, context: &str) -> String {
    bound_string(value, MAX_NAME_LENGTH, context)
}

/// One QA record: (program, version, date, time), each bounded to
/// [`MAX_STR_LENGTH`] characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub program: String,
    pub version: String,
    pub date: String,
    pub time: String,
}

impl QaRecord {
    /// Builds a record, truncating oversized fields with a warning.
    pub fn new(program: &str, version: &str, date: &str, time: &str) -> Self {
        Self {
            program: bound_string(program, MAX_STR_LENGTH, "QA program field"),
            version: bound_string(version, MAX_STR_LENGTH, "QA version field"),
            date: bound_string(date, MAX_STR_LENGTH, "QA date field"),
            time: bound_string(time, MAX_STR_LENGTH, "QA time field"),
        }
    }
}

/// Append-only QA and info record storage, global to the store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecordLog {
    qa: Vec<QaRecord>,
    info: Vec<String>,
}

impl RecordLog {
    /// Appends QA records in order.
    pub fn append_qa<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = QaRecord>,
    {
        self.qa.extend(records);
    }

    /// Appends info lines in order, truncating oversized lines.
    pub fn append_info<'a, I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.info.extend(
            lines
                .into_iter()
                .map(|line| bound_string(line, MAX_LINE_LENGTH, "info record")),
        );
    }

    /// All QA records in append order.
    #[inline]
    pub fn qa_records(&self) -> &[QaRecord] {
        &self.qa
    }

    /// All info lines in append order.
    #[inline]
    pub fn info_records(&self) -> &[String] {
        &self.info
    }

    /// Number of QA records.
    #[inline]
    pub fn qa_count(&self) -> usize {
        self.qa.len()
    }

    /// Number of info lines.
    #[inline]
    pub fn info_count(&self) -> usize {
        self.info.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qa_fields_truncate_to_str_length() {
        let long = "x".repeat(MAX_STR_LENGTH + 10);
        let rec = QaRecord::new(&long, "1.0", "2026-08-06", "12:00:00");
        assert_eq!(rec.program.len(), MAX_STR_LENGTH);
        assert_eq!(rec.version, "1.0");
    }

    #[test]
    fn info_lines_truncate_to_line_length() {
        let mut log = RecordLog::default();
        let long = "y".repeat(MAX_LINE_LENGTH * 2);
        log.append_info([long.as_str(), "short"]);
        assert_eq!(log.info_records()[0].len(), MAX_LINE_LENGTH);
        assert_eq!(log.info_records()[1], "short");
        assert_eq!(log.info_count(), 2);
    }

    #[test]
    fn title_truncation_keeps_tail() {
        let head = "boilerplate ".repeat(10);
        let title = format!("{head}the part that matters");
        let bounded = bound_title(&title);
        assert_eq!(bounded.chars().count(), MAX_LINE_LENGTH);
        assert!(bounded.ends_with("the part that matters"));
    }

    #[test]
    fn append_order_preserved() {
        let mut log = RecordLog::default();
        log.append_qa([
            QaRecord::new("mesher", "0.1", "2026-01-01", "08:00:00"),
            QaRecord::new("solver", "2.4", "2026-01-02", "09:30:00"),
        ]);
        assert_eq!(log.qa_count(), 2);
        assert_eq!(log.qa_records()[0].program, "mesher");
        assert_eq!(log.qa_records()[1].program, "solver");
    }
}
