use serde::{Deserialize, Serialize};
use time::{macros::format_description, OffsetDateTime};

use crate::{
    error::{Error, Result},
    git::RawCommit,
    issue_link::{escape_html, with_end_slash, IssueLinker},
};

/// Number of hash characters kept in `CommitRecord::short_hash`
pub const SHORT_HASH_LEN: usize = 8;

/// The canonical, fully derived view of one commit.
///
/// Field names in serialized form match the bare token names (see
/// `Token::name`) so that the JSON and HTML outputs use the same vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// The 40 char hash
    #[serde(rename = "H")]
    pub full_hash: String,
    #[serde(rename = "h")]
    pub short_hash: String,
    #[serde(rename = "an")]
    pub author_name: String,
    /// `yyyy-MM-dd HH:mm:ss`, UTC
    #[serde(rename = "ad")]
    pub author_date: String,
    /// First line of the message, with `$` escaped as `\$`
    #[serde(rename = "s")]
    pub subject: String,
    #[serde(rename = "sWithUrl")]
    pub subject_with_links: String,
    #[serde(rename = "issueUrl")]
    pub issue_url: String,
    #[serde(rename = "gitLabUrl")]
    pub commit_url: String,
    #[serde(rename = "issueId")]
    pub issue_id: String,
    /// `subject_with_links` with the text around the anchors HTML escaped.
    /// Not part of the serialized record.
    #[serde(skip)]
    pub html_subject: Option<String>,
}

impl CommitRecord {
    /// The linked subject as it may be embedded in HTML. Records built
    /// without the escaped form get all of `subject_with_links` escaped.
    pub fn html_subject_with_links(&self) -> String {
        self.html_subject
            .clone()
            .unwrap_or_else(|| escape_html(&self.subject_with_links))
    }
}

/// Turns raw commits from the repository reader into `CommitRecord`s.
#[derive(Debug, Clone, Default)]
pub struct CommitRecordBuilder {
    linker: IssueLinker,
    /// Base of commit links, ending in `/` unless empty
    commit_url_base: String,
}

impl CommitRecordBuilder {
    pub fn new(linker: IssueLinker, commit_url_base: &str) -> CommitRecordBuilder {
        CommitRecordBuilder {
            linker,
            commit_url_base: with_end_slash(commit_url_base),
        }
    }

    /// Builds the record for `raw`, failing if its timestamp cannot be read.
    pub fn build(&self, raw: &RawCommit) -> Result<CommitRecord> {
        let author_date = format_timestamp(&raw.hash, &raw.timestamp)?;
        let subject = raw.subject.replace('$', "\\$");
        let issue_id = self.linker.issue_id(&subject);

        Ok(CommitRecord {
            full_hash: raw.hash.clone(),
            short_hash: raw.short_hash.clone(),
            author_name: raw.author_name.clone(),
            author_date,
            issue_url: self.linker.issue_url(&issue_id),
            subject_with_links: self.linker.linkify(&subject),
            html_subject: Some(self.linker.linkify_html(&subject)),
            commit_url: format!("{}{}", self.commit_url_base, raw.hash),
            subject,
            issue_id,
        })
    }
}

/// Formats a Unix timestamp (in seconds) as `yyyy-MM-dd HH:mm:ss` UTC
fn format_timestamp(hash: &str, value: &str) -> Result<String> {
    let malformed = || Error::Timestamp {
        hash: hash.to_owned(),
        value: value.to_owned(),
    };
    let secs: i64 = value.trim().parse().map_err(|_| malformed())?;
    let date = OffsetDateTime::from_unix_timestamp(secs).map_err(|_| malformed())?;

    date.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .map_err(Into::into)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::issue_link::DEFAULT_ISSUE_PATTERN;

    /// A record shaped like the fixtures of the rendering tests
    pub(crate) fn record(subject: &str) -> CommitRecord {
        CommitRecord {
            full_hash: "123123123123123123".into(),
            short_hash: "12312312".into(),
            author_name: "suntsovto".into(),
            author_date: "2000-01-01 00:00:00".into(),
            subject: subject.into(),
            subject_with_links: format!("jiraUrl/{subject}"),
            issue_url: "jiraUrl/JIRA-123".into(),
            commit_url: "gitLabUrl".into(),
            issue_id: "JIRA-123".into(),
            html_subject: None,
        }
    }

    pub(crate) fn raw(subject: &str, timestamp: &str) -> RawCommit {
        RawCommit {
            hash: "7d0ab2941c5ac3f7b2b5c1f6f0c9a1e2d3b4c5d6".into(),
            short_hash: "7d0ab294".into(),
            author_name: "tsuntsov".into(),
            timestamp: timestamp.into(),
            subject: subject.into(),
        }
    }

    fn builder() -> CommitRecordBuilder {
        CommitRecordBuilder::new(
            IssueLinker::new(Some(DEFAULT_ISSUE_PATTERN), Some("https://jira/browse")),
            "https://gitlab/proj/commit",
        )
    }

    #[test]
    fn builds_all_fields() {
        let rec = builder()
            .build(&raw("JIRA-123 simples by picture", "1615213912"))
            .unwrap();
        assert_eq!(rec.full_hash, "7d0ab2941c5ac3f7b2b5c1f6f0c9a1e2d3b4c5d6");
        assert_eq!(rec.short_hash, "7d0ab294");
        assert_eq!(rec.author_name, "tsuntsov");
        assert_eq!(rec.author_date, "2021-03-08 14:31:52");
        assert_eq!(rec.issue_id, "JIRA-123");
        assert_eq!(rec.issue_url, "https://jira/browse/JIRA-123");
        assert_eq!(
            rec.subject_with_links,
            "<a href=\"https://jira/browse/JIRA-123\">JIRA-123</a> simples by picture"
        );
        assert_eq!(
            rec.commit_url,
            "https://gitlab/proj/commit/7d0ab2941c5ac3f7b2b5c1f6f0c9a1e2d3b4c5d6"
        );
    }

    #[test]
    fn escapes_dollar_in_subject() {
        let rec = builder().build(&raw("cost $5 and $HOME", "0")).unwrap();
        assert_eq!(rec.subject, "cost \\$5 and \\$HOME");
        assert_eq!(rec.author_date, "1970-01-01 00:00:00");
    }

    #[test]
    fn dates_sort_like_time() {
        let b = builder();
        let older = b.build(&raw("a", "999999999")).unwrap();
        let newer = b.build(&raw("b", "1000000000")).unwrap();
        assert!(older.author_date < newer.author_date);
    }

    #[test]
    fn malformed_timestamp_is_fatal() {
        for ts in ["", "yesterday", "12:30", "99999999999999999999"] {
            assert!(
                matches!(builder().build(&raw("a", ts)), Err(Error::Timestamp { .. })),
                "{ts:?}"
            );
        }
    }

    #[test]
    fn no_tracker_means_plain_subject() {
        let b = CommitRecordBuilder::new(IssueLinker::new(Some(DEFAULT_ISSUE_PATTERN), None), "");
        let rec = b.build(&raw("JIRA-1 x", "0")).unwrap();
        assert_eq!(rec.issue_id, "");
        assert_eq!(rec.issue_url, "");
        assert_eq!(rec.subject_with_links, "JIRA-1 x");
        assert_eq!(rec.commit_url, rec.full_hash);
    }

    #[test]
    fn html_subject_escapes_markup_around_links() {
        let rec = builder().build(&raw("JIRA-9 use Vec<T> & co", "0")).unwrap();
        assert_eq!(
            rec.subject_with_links,
            "<a href=\"https://jira/browse/JIRA-9\">JIRA-9</a> use Vec<T> & co"
        );
        assert_eq!(
            rec.html_subject_with_links(),
            "<a href=\"https://jira/browse/JIRA-9\">JIRA-9</a> use Vec&lt;T&gt; &amp; co"
        );

        let mut plain = record("fix <b>");
        assert_eq!(plain.html_subject_with_links(), "jiraUrl/fix &lt;b&gt;");
        plain.html_subject = Some("kept".into());
        assert_eq!(plain.html_subject_with_links(), "kept");
    }
}
