use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    branch::{resolve_branches, BranchSet},
    commit::{CommitRecord, CommitRecordBuilder},
    error::Result,
    git::RepoReader,
};

/// Build property holding the display form of the current branches
pub const PROP_BRANCH: &str = "git.branch";
/// Build property holding the short hash of the newest commit
pub const PROP_COMMIT_HASH: &str = "git.commit.hash";
/// Build property holding the author date of the newest commit
pub const PROP_COMMIT_DATE: &str = "git.commit.date";

/// Everything a report is rendered from: the current branches and the
/// commits, newest first. Built once per run and only read afterwards.
///
/// Its serialized form is the JSON report document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub branches: BranchSet,
    pub commits: Vec<CommitRecord>,
}

impl Report {
    pub fn new(branches: BranchSet, commits: Vec<CommitRecord>) -> Report {
        Report { branches, commits }
    }

    /// Reads the current branches and up to `max_count` commits from
    /// `reader`.
    ///
    /// A single commit that cannot be built fails the whole report.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitlog::{git::GitCli, CommitRecordBuilder, IssueLinker, Report};
    /// let git = GitCli::discover(".").unwrap();
    /// let builder = CommitRecordBuilder::new(IssueLinker::default(), "https://host/commit/");
    ///
    /// let report = Report::from_reader(&git, &builder, 10).unwrap();
    /// ```
    pub fn from_reader<R>(reader: &R, builder: &CommitRecordBuilder, max_count: usize) -> Result<Report>
    where
        R: RepoReader + ?Sized,
    {
        let current_ref = reader.current_ref()?;
        debug!("current ref: {current_ref}");
        let branches = resolve_branches(&current_ref, reader.refs()?);

        let commits = reader
            .commits(&current_ref, max_count)?
            .iter()
            .map(|raw| builder.build(raw))
            .collect::<Result<Vec<_>>>()?;
        debug!("read {} commits", commits.len());

        Ok(Report { branches, commits })
    }

    /// The newest commit, if any
    pub fn head(&self) -> Option<&CommitRecord> { self.commits.first() }

    /// Values for the host build: the current branches and the hash and
    /// date of the newest commit.
    pub fn properties(&self) -> IndexMap<&'static str, String> {
        let mut props = IndexMap::new();
        props.insert(PROP_BRANCH, self.branches.to_string());
        if let Some(head) = self.head() {
            props.insert(PROP_COMMIT_HASH, head.short_hash.clone());
            props.insert(PROP_COMMIT_DATE, head.author_date.clone());
        }
        props
    }
}
