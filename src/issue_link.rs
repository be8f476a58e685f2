use log::{debug, error};
use regex::Regex;

/// The default pattern used to find an issue number: the first
/// whitespace-delimited word of the subject
pub const DEFAULT_ISSUE_PATTERN: &str = r"^(.[^\s]+)\s*.*";

/// Appends a `/` to a base URL unless it already ends with one. Empty input
/// stays empty.
pub(crate) fn with_end_slash(url: &str) -> String {
    if url.is_empty() || url.ends_with('/') {
        url.to_owned()
    } else {
        format!("{url}/")
    }
}

/// Escapes the characters with a meaning in HTML text and attributes
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Finds issue references in commit subjects and turns them into links to
/// an issue tracker.
///
/// # Example
///
/// ```
/// # use gitlog::IssueLinker;
/// let linker = IssueLinker::new(Some(r"([A-Z]+-\d+)"), Some("https://jira.example.com/browse"));
///
/// assert_eq!("JIRA-7", linker.issue_id("JIRA-7 fix the build"));
/// assert_eq!(
///     "https://jira.example.com/browse/JIRA-7",
///     linker.issue_url("JIRA-7")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct IssueLinker {
    pattern: Option<Regex>,
    /// Tracker base URL, always ending in `/` when set
    tracker_url: Option<String>,
}

impl IssueLinker {
    /// Creates a linker. An empty or invalid pattern, or an empty tracker
    /// URL, yields a linker that never finds anything.
    pub fn new(pattern: Option<&str>, tracker_url: Option<&str>) -> IssueLinker {
        let pattern = match pattern.filter(|p| !p.is_empty()) {
            Some(p) => match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    error!("Invalid issue pattern {p:?}, issue links disabled: {e}");
                    None
                }
            },
            None => None,
        };
        let tracker_url = tracker_url
            .filter(|u| !u.is_empty())
            .map(with_end_slash);
        if pattern.is_some() && tracker_url.is_none() {
            debug!("No bug tracking url configured, issue links disabled");
        }
        IssueLinker {
            pattern,
            tracker_url,
        }
    }

    fn active(&self) -> Option<(&Regex, &str)> {
        match (&self.pattern, &self.tracker_url) {
            (Some(re), Some(url)) => Some((re, url.as_str())),
            _ => None,
        }
    }

    /// The issue number referenced by `subject`, or an empty string
    pub fn issue_id(&self, subject: &str) -> String {
        if subject.is_empty() {
            return String::new();
        }
        let Some((re, _)) = self.active() else {
            return String::new();
        };
        re.captures(subject)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| m.as_str().to_owned())
            .unwrap_or_default()
    }

    /// The tracker link for an issue number, or an empty string if either is
    /// missing
    pub fn issue_url(&self, issue_id: &str) -> String {
        match &self.tracker_url {
            Some(url) if !issue_id.is_empty() => format!("{url}{issue_id}"),
            _ => String::new(),
        }
    }

    /// Replaces every issue reference in `subject` with an HTML anchor
    /// pointing at the tracker.
    ///
    /// Matches are visited once, left to right. Only the captured issue
    /// number is wrapped; the rest of each match is copied verbatim.
    ///
    /// # Example
    ///
    /// ```
    /// # use gitlog::IssueLinker;
    /// let linker = IssueLinker::new(Some(r"(#\d+)"), Some("http://bugs"));
    ///
    /// assert_eq!(
    ///     "fix <a href=\"http://bugs/#1\">#1</a> and <a href=\"http://bugs/#2\">#2</a>",
    ///     linker.linkify("fix #1 and #2")
    /// );
    /// ```
    pub fn linkify(&self, subject: &str) -> String { self.link_matches(subject, false) }

    /// Like `linkify`, but the subject text around the anchors is HTML
    /// escaped, so the result can be embedded in a page as is.
    ///
    /// # Example
    ///
    /// ```
    /// # use gitlog::IssueLinker;
    /// let linker = IssueLinker::new(Some(r"(#\d+)"), Some("http://bugs"));
    ///
    /// assert_eq!(
    ///     "<a href=\"http://bugs/#1\">#1</a> use Vec&lt;T&gt;",
    ///     linker.linkify_html("#1 use Vec<T>")
    /// );
    /// ```
    pub fn linkify_html(&self, subject: &str) -> String { self.link_matches(subject, true) }

    fn link_matches(&self, subject: &str, escape: bool) -> String {
        let text = |s: &str| if escape { escape_html(s) } else { s.to_owned() };
        if subject.is_empty() {
            return subject.to_owned();
        }
        let Some((re, url)) = self.active() else {
            return text(subject);
        };

        let mut out = String::with_capacity(subject.len());
        let mut cursor = 0;
        for caps in re.captures_iter(subject) {
            let Some(id) = caps.get(1).or_else(|| caps.get(0)) else {
                continue;
            };
            // empty captures would produce empty anchors
            if id.as_str().is_empty() {
                continue;
            }
            out.push_str(&text(&subject[cursor..id.start()]));
            out.push_str(&format!("<a href=\"{url}{id}\">{id}</a>", id = text(id.as_str())));
            cursor = id.end();
        }
        out.push_str(&text(&subject[cursor..]));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jira() -> IssueLinker { IssueLinker::new(Some(DEFAULT_ISSUE_PATTERN), Some("jiraUrl")) }

    #[test]
    fn default_pattern_takes_first_word() {
        let linker = jira();
        assert_eq!("JIRA-123", linker.issue_id("JIRA-123 hello"));
        assert_eq!("jiraUrl/JIRA-123", linker.issue_url("JIRA-123"));
    }

    #[test]
    fn issue_id_empty_without_tracker() {
        let linker = IssueLinker::new(Some(DEFAULT_ISSUE_PATTERN), None);
        assert_eq!("", linker.issue_id("JIRA-123 hello"));
        assert_eq!("", linker.issue_url("JIRA-123"));

        let linker = IssueLinker::new(Some(DEFAULT_ISSUE_PATTERN), Some(""));
        assert_eq!("", linker.issue_id("JIRA-123 hello"));
    }

    #[test]
    fn issue_id_empty_without_pattern_or_match() {
        assert_eq!("", IssueLinker::new(None, Some("x")).issue_id("JIRA-1 a"));
        assert_eq!("", IssueLinker::new(Some(""), Some("x")).issue_id("JIRA-1 a"));
        let linker = IssueLinker::new(Some(r"([A-Z]+-\d+)"), Some("x"));
        assert_eq!("", linker.issue_id("no issue here"));
        assert_eq!("", linker.issue_id(""));
    }

    #[test]
    fn invalid_pattern_disables_links() {
        let linker = IssueLinker::new(Some("(unclosed"), Some("jiraUrl"));
        assert_eq!("", linker.issue_id("JIRA-1 a"));
        assert_eq!("JIRA-1 a", linker.linkify("JIRA-1 a"));
    }

    #[test]
    fn url_keeps_existing_slash() {
        let linker = IssueLinker::new(Some(DEFAULT_ISSUE_PATTERN), Some("http://jira/browse/"));
        assert_eq!("http://jira/browse/A-1", linker.issue_url("A-1"));
        assert_eq!("", linker.issue_url(""));
    }

    #[test]
    fn linkify_keeps_rest_of_match() {
        assert_eq!(
            "<a href=\"jiraUrl/JIRA-123\">JIRA-123</a> hello",
            jira().linkify("JIRA-123 hello")
        );
    }

    #[test]
    fn linkify_unchanged_when_nothing_matches() {
        let linker = IssueLinker::new(Some(r"([A-Z]+-\d+)"), Some("jiraUrl"));
        for s in ["plain subject", "lower-1 case", "   "] {
            assert_eq!(s, linker.linkify(s));
        }
        assert_eq!("JIRA-1 a", IssueLinker::new(Some(r"([A-Z]+-\d+)"), None).linkify("JIRA-1 a"));
    }

    #[test]
    fn linkify_links_every_match() {
        let linker = IssueLinker::new(Some(r"([A-Z]+-\d+)"), Some("http://t"));
        assert_eq!(
            "<a href=\"http://t/AB-1\">AB-1</a> and <a href=\"http://t/CD-22\">CD-22</a>",
            linker.linkify("AB-1 and CD-22")
        );
    }

    #[test]
    fn linkify_does_not_touch_repeated_literal_outside_match() {
        // "A-1" also occurs inside "XA-10"; only real matches get wrapped
        let linker = IssueLinker::new(Some(r"\b([A-Z]-\d+)\b"), Some("http://t"));
        assert_eq!(
            "<a href=\"http://t/A-1\">A-1</a> not XA-10",
            linker.linkify("A-1 not XA-10")
        );
    }

    #[test]
    fn linkify_html_escapes_text_but_not_anchors() {
        let linker = IssueLinker::new(Some(r"([A-Z]+-\d+)"), Some("http://t"));
        assert_eq!(
            "<a href=\"http://t/AB-1\">AB-1</a> fix &lt;script&gt; &amp; &quot;q&quot; &#x27;",
            linker.linkify_html("AB-1 fix <script> & \"q\" '")
        );
        assert_eq!("a &lt; b", linker.linkify_html("a < b"));
        assert_eq!("a < b", linker.linkify("a < b"));
    }

    #[test]
    fn linkify_html_escapes_without_tracker() {
        let linker = IssueLinker::new(Some(DEFAULT_ISSUE_PATTERN), None);
        assert_eq!("&lt;b&gt; &amp;", linker.linkify_html("<b> &"));
        assert_eq!("<b> &", linker.linkify("<b> &"));
    }

    #[test]
    fn default_pattern_without_tracker_is_inert() {
        let linker = IssueLinker::new(Some(DEFAULT_ISSUE_PATTERN), None);
        assert_eq!("", linker.issue_id("JIRA-1 a"));
        assert_eq!("JIRA-1 a", linker.linkify("JIRA-1 a"));
    }
}
