use regex::Regex;
use strum::IntoEnumIterator;

use crate::{
    error::Result,
    token::{Token, TokenMap},
};

/// The default line template: `2021-03-08 14:31:52 7d0ab294 tsuntsov JIRA-123 message`
pub const DEFAULT_TEMPLATE_LINE: &str = "%ad %h %an %s";

/// A single-line template with `%`-tokens, such as `"%ad %h %an %s"`.
///
/// # Example
///
/// ```
/// # use gitlog::{LineTemplate, TokenMap, CommitRecord};
/// let record = CommitRecord {
///     full_hash: "7d0ab2941c5a".into(),
///     short_hash: "7d0ab294".into(),
///     author_name: "tsuntsov".into(),
///     author_date: "2021-03-08 14:31:52".into(),
///     subject: "fix the build".into(),
///     subject_with_links: "fix the build".into(),
///     issue_url: String::new(),
///     commit_url: String::new(),
///     issue_id: String::new(),
///     html_subject: None,
/// };
/// let line = LineTemplate::new("%h %an: %s %unknown");
///
/// assert_eq!(
///     "7d0ab294 tsuntsov: fix the build %unknown",
///     line.render(&TokenMap::from_record(&record)).unwrap()
/// );
/// ```
#[derive(Debug, Clone)]
pub struct LineTemplate {
    template: String,
    tokens: Regex,
}

impl LineTemplate {
    pub fn new<S: Into<String>>(template: S) -> LineTemplate {
        LineTemplate {
            template: template.into(),
            tokens: token_regex(),
        }
    }

    pub fn as_str(&self) -> &str { &self.template }

    /// Substitutes every token in the template with its value from `values`.
    ///
    /// Values are inserted literally. Text that merely looks like a token is
    /// kept as is.
    pub fn render(&self, values: &TokenMap) -> Result<String> {
        let mut line = String::with_capacity(self.template.len() * 2);
        let mut cursor = 0;
        for m in self.tokens.find_iter(&self.template) {
            line.push_str(&self.template[cursor..m.start()]);
            // the regex only matches token literals
            if let Some(token) = Token::from_literal(m.as_str()) {
                line.push_str(values.get(token)?);
            }
            cursor = m.end();
        }
        line.push_str(&self.template[cursor..]);
        Ok(line)
    }
}

/// One alternation of every token literal. Longer literals come first so
/// that `%sWithUrl` is never read as `%s` followed by `WithUrl`.
fn token_regex() -> Regex {
    let mut literals: Vec<String> = Token::iter().map(Token::literal).collect();
    literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alternation = literals
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|");
    regex!(&format!("({alternation})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{commit::tests::record, error::Error};

    const SCENARIO: &str = "%ad - %H - %h - %an: %s (%issueUrl). %gitLabUrl";

    #[test]
    fn renders_scenario_line() {
        let line = LineTemplate::new(SCENARIO);
        for subject in ["JIRA-123 hello", "JIRA-123 hello2"] {
            let rendered = line.render(&TokenMap::from_record(&record(subject))).unwrap();
            assert_eq!(
                rendered,
                format!(
                    "2000-01-01 00:00:00 - 123123123123123123 - 12312312 - suntsovto: {subject} \
                     (jiraUrl/JIRA-123). gitLabUrl"
                )
            );
        }
    }

    #[test]
    fn every_token_substituted_in_order() {
        let rec = record("JIRA-123 hello");
        let values = TokenMap::from_record(&rec);
        let template = Token::iter()
            .map(Token::literal)
            .collect::<Vec<_>>()
            .join("|");
        let rendered = LineTemplate::new(template).render(&values).unwrap();

        let expected = values.iter().map(|(_, v)| v).collect::<Vec<_>>().join("|");
        assert_eq!(rendered, expected);
        for t in Token::iter() {
            assert!(!rendered.contains(&t.literal()), "{t} left in {rendered}");
        }
    }

    #[test]
    fn longest_token_wins() {
        let values = TokenMap::from_record(&record("JIRA-123 hello"));
        let rendered = LineTemplate::new("%sWithUrl/%s").render(&values).unwrap();
        assert_eq!(rendered, "jiraUrl/JIRA-123 hello/JIRA-123 hello");
    }

    #[test]
    fn unknown_placeholders_untouched() {
        let values = TokenMap::from_record(&record("x"));
        let rendered = LineTemplate::new("%% %x %AN 100% %an").render(&values).unwrap();
        assert_eq!(rendered, "%% %x %AN 100% suntsovto");
    }

    #[test]
    fn values_inserted_literally() {
        let mut rec = record("price \\$5 $1 ${x}");
        rec.author_name = "%s".into();
        let rendered = LineTemplate::new("%an|%s")
            .render(&TokenMap::from_record(&rec))
            .unwrap();
        assert_eq!(rendered, "%s|price \\$5 $1 ${x}");
    }

    #[test]
    fn template_without_tokens() {
        let values = TokenMap::from_record(&record("x"));
        assert_eq!("", LineTemplate::new("").render(&values).unwrap());
        assert_eq!("static", LineTemplate::new("static").render(&values).unwrap());
    }

    #[test]
    fn missing_value_fails() {
        let mut values = TokenMap::from_record(&record("x"));
        values.remove(Token::AuthorName);
        assert!(matches!(
            LineTemplate::new("%h %an").render(&values),
            Err(Error::MissingToken(Token::AuthorName))
        ));
    }
}
