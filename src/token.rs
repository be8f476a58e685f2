use std::fmt;

use indexmap::IndexMap;
use strum::{EnumIter, IntoEnumIterator};

use crate::{
    commit::CommitRecord,
    error::{Error, Result},
};

/// The closed set of placeholders available to line templates and HTML
/// templates.
///
/// Each token has two spellings: the `%`-prefixed literal used in a line
/// template (`%an`) and the bare name used as a template context variable
/// and JSON key (`an`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum Token {
    /// `%H` - the full commit hash
    FullHash,
    /// `%h` - the abbreviated commit hash
    ShortHash,
    /// `%an` - the author name
    AuthorName,
    /// `%ad` - the author date
    AuthorDate,
    /// `%s` - the subject line
    Subject,
    /// `%sWithUrl` - the subject line with issue references turned into links
    SubjectWithUrl,
    /// `%issueUrl` - the link to the referenced issue
    IssueUrl,
    /// `%gitLabUrl` - the link to the commit on the VCS host
    CommitUrl,
}

impl Token {
    /// The prefix shared by every line-template literal
    pub const PREFIX: &'static str = "%";

    /// The name of the token without its prefix, as exposed to templates.
    pub fn name(self) -> &'static str {
        match self {
            Token::FullHash => "H",
            Token::ShortHash => "h",
            Token::AuthorName => "an",
            Token::AuthorDate => "ad",
            Token::Subject => "s",
            Token::SubjectWithUrl => "sWithUrl",
            Token::IssueUrl => "issueUrl",
            Token::CommitUrl => "gitLabUrl",
        }
    }

    /// The literal form of the token as written in a line template.
    ///
    /// # Example
    ///
    /// ```
    /// # use gitlog::Token;
    /// assert_eq!("%sWithUrl", Token::SubjectWithUrl.literal());
    /// ```
    pub fn literal(self) -> String { format!("{}{}", Token::PREFIX, self.name()) }

    /// Finds the token whose literal form is exactly `literal`
    pub fn from_literal(literal: &str) -> Option<Token> {
        let name = literal.strip_prefix(Token::PREFIX)?;
        Token::iter().find(|t| t.name() == name)
    }

    /// The value of this token for a given commit
    fn value_of(self, record: &CommitRecord) -> &str {
        match self {
            Token::FullHash => &record.full_hash,
            Token::ShortHash => &record.short_hash,
            Token::AuthorName => &record.author_name,
            Token::AuthorDate => &record.author_date,
            Token::Subject => &record.subject,
            Token::SubjectWithUrl => &record.subject_with_links,
            Token::IssueUrl => &record.issue_url,
            Token::CommitUrl => &record.commit_url,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", Token::PREFIX, self.name())
    }
}

/// The flattened view of one commit: every token mapped to its value, in
/// vocabulary order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMap(IndexMap<Token, String>);

impl TokenMap {
    /// Builds the map for a single commit. The result always holds one entry
    /// per token.
    pub fn from_record(record: &CommitRecord) -> TokenMap {
        TokenMap(
            Token::iter()
                .map(|t| (t, t.value_of(record).to_owned()))
                .collect(),
        )
    }

    /// Looks up the value of `token`, failing if the map has no entry for it
    pub fn get(&self, token: Token) -> Result<&str> {
        self.0
            .get(&token)
            .map(String::as_str)
            .ok_or(Error::MissingToken(token))
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (Token, &str)> {
        self.0.iter().map(|(t, v)| (*t, v.as_str()))
    }

    #[cfg(test)]
    pub(crate) fn remove(&mut self, token: Token) { self.0.shift_remove(&token); }
}
