use std::io;

use log::debug;

use crate::{
    error::Result, fmt::FormatWriter, line_template::LineTemplate, report::Report,
    token::TokenMap,
};

/// Wraps a `std::io::Write` object to write one line per commit, formatted by
/// a `LineTemplate`
///
/// # Example
///
/// ```no_run
/// # use std::fs::File;
/// # use gitlog::{LineTemplate, Report, fmt::{FormatWriter, TextWriter}};
/// let report = Report::default();
/// let line = LineTemplate::new("%ad %h %an %s");
///
/// let mut file = File::create("CHANGELOG.txt").unwrap();
/// let mut writer = TextWriter::new(&mut file, &line, true);
///
/// writer.write_report(&report).unwrap();
/// ```
pub struct TextWriter<'a> {
    out: &'a mut dyn io::Write,
    line: &'a LineTemplate,
    branch_line: bool,
}

impl<'a> TextWriter<'a> {
    /// Creates a new `TextWriter`. With `branch_line` set the output starts
    /// with `Branch: [..]`.
    pub fn new<T: io::Write>(out: &'a mut T, line: &'a LineTemplate, branch_line: bool) -> TextWriter<'a> {
        TextWriter {
            out,
            line,
            branch_line,
        }
    }
}

impl<'a> FormatWriter for TextWriter<'a> {
    fn write_report(&mut self, report: &Report) -> Result<()> {
        debug!("Writing text report with template {:?}", self.line.as_str());
        if self.branch_line {
            writeln!(self.out, "Branch: {}", report.branches)?;
        }
        for commit in &report.commits {
            let line = self.line.render(&TokenMap::from_record(commit))?;
            writeln!(self.out, "{line}")?;
        }
        self.out.flush().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample;

    fn render(template: &str, branch_line: bool) -> String {
        let line = LineTemplate::new(template);
        let mut buf = Vec::new();
        TextWriter::new(&mut buf, &line, branch_line)
            .write_report(&sample())
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn branch_line_then_one_line_per_commit() {
        let out = render("%ad - %H - %h - %an: %s (%issueUrl). %gitLabUrl", true);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Branch: [master]");
        assert!(lines[1].starts_with("2000-01-01 00:00:00 - 123123123123123123 - 12312312 - suntsovto: JIRA-123 hello "));
        assert!(lines[1].ends_with("(jiraUrl/JIRA-123). gitLabUrl"));
        assert!(lines[2].contains(": JIRA-123 hello2 (jiraUrl/JIRA-123). gitLabUrl"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn branch_line_can_be_left_out() {
        assert_eq!(render("%s", false), "JIRA-123 hello\nJIRA-123 hello2\n");
    }

    #[test]
    fn empty_report_only_has_branch_line() {
        let line = LineTemplate::new("%s");
        let mut buf = Vec::new();
        TextWriter::new(&mut buf, &line, true)
            .write_report(&Report::default())
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Branch: []\n");
    }
}
