//! Renders the recent history of a git repository as changelog files.
//!
//! Each run reads the current branches and the newest commits, derives
//! commit and issue links for every commit, and writes one file per
//! requested format:
//!
//! * `txt` (or any unknown extension): one line per commit from a line
//!   template such as `"%ad %h %an %s"`
//! * `json`: the branches and every commit field
//! * `html`: a built-in table, a full document, or a user template
//!
//! ```no_run
//! # use gitlog::GitLog;
//! let gitlog = GitLog::default()
//!     .formats("txt,json,html")
//!     .count_commits(20)
//!     .bug_tracking_url("https://jira.example.com/browse");
//!
//! gitlog.execute().unwrap();
//! ```

#[macro_use]
mod macros;
pub mod branch;
mod commit;
mod config;
mod engine;
pub mod error;
pub mod fmt;
pub mod git;
mod gitlog;
mod issue_link;
mod line_template;
mod report;
mod token;

pub use branch::BranchSet;
pub use commit::{CommitRecord, CommitRecordBuilder, SHORT_HASH_LEN};
pub use engine::{TemplateEngine, TeraEngine};
pub use gitlog::GitLog;
pub use issue_link::{IssueLinker, DEFAULT_ISSUE_PATTERN};
pub use line_template::{LineTemplate, DEFAULT_TEMPLATE_LINE};
pub use report::{Report, PROP_BRANCH, PROP_COMMIT_DATE, PROP_COMMIT_HASH};
pub use token::{Token, TokenMap};

// The default config file
const DEFAULT_CONFIG_FILE: &str = ".gitlog.toml";
