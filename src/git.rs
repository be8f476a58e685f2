use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Command,
};

use indexmap::IndexMap;
use log::debug;

use crate::{
    commit::SHORT_HASH_LEN,
    error::{Error, Result},
};

/// Field and record separators used in the `git log` format string
const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// One commit as read from the repository, before any formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    /// The 40 char hash
    pub hash: String,
    /// The first `SHORT_HASH_LEN` characters of the hash
    pub short_hash: String,
    pub author_name: String,
    /// Author time as seconds since the Unix epoch
    pub timestamp: String,
    /// The first line of the commit message
    pub subject: String,
}

/// A convienience type for multiple commits
pub type RawCommits = Vec<RawCommit>;

/// Read access to a repository, as needed to build a report.
pub trait RepoReader {
    /// The checked out ref: a full ref name such as `refs/heads/main`, or a
    /// commit hash when HEAD is detached
    fn current_ref(&self) -> Result<String>;

    /// Every ref of the repository (including `HEAD`) mapped to the hash it
    /// points at
    fn refs(&self) -> Result<IndexMap<String, String>>;

    /// Up to `max_count` commits reachable from `reference`, newest first
    fn commits(&self, reference: &str, max_count: usize) -> Result<RawCommits>;

    /// The URL of the `origin` remote, if there is one
    fn origin_url(&self) -> Result<Option<String>> { Ok(None) }
}

/// Reads a repository by running the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    /// The git dir with all the meta-data (Typically the `.git` sub-directory
    /// of the project)
    git_dir: PathBuf,
}

impl GitCli {
    /// Uses the given `.git` directory
    pub fn new<P: AsRef<Path>>(git_dir: P) -> GitCli {
        GitCli {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    /// Looks for a `.git` directory in `dir` and up to two of its parents.
    ///
    /// **NOTE:** If `dir` itself ends with `.git` it is used as is.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitlog::git::GitCli;
    /// let git = GitCli::discover("/myproject/module").unwrap();
    /// ```
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<GitCli> {
        let dir = dir.as_ref();
        if dir.ends_with(".git") && dir.is_dir() {
            return Ok(GitCli::new(dir));
        }
        let found = dir
            .ancestors()
            .take(3)
            .map(|d| d.join(".git"))
            .find(|d| d.exists());
        match found {
            Some(git_dir) => {
                debug!("found git folder: {}", git_dir.display());
                Ok(GitCli::new(git_dir))
            }
            None => Err(Error::RepositoryNotFound(dir.display().to_string())),
        }
    }

    pub fn git_dir(&self) -> &Path { &self.git_dir }

    /// Runs `git` with the given arguments against this repository and
    /// returns stdout
    fn run(&self, args: &[&str]) -> Result<String> {
        debug!("running git {}", args.join(" "));
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.git_dir)
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    Error::GitNotFound
                } else {
                    Error::Io(e)
                }
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(Error::Git {
                args: args.join(" "),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}

impl RepoReader for GitCli {
    fn current_ref(&self) -> Result<String> {
        // symbolic-ref fails on a detached HEAD, where the hash is the answer
        match self.run(&["symbolic-ref", "-q", "HEAD"]) {
            Ok(name) => Ok(name.trim().to_owned()),
            Err(Error::Git { .. }) => Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_owned()),
            Err(e) => Err(e),
        }
    }

    fn refs(&self) -> Result<IndexMap<String, String>> {
        let mut refs = IndexMap::new();
        if let Ok(head) = self.run(&["rev-parse", "HEAD"]) {
            refs.insert("HEAD".to_owned(), head.trim().to_owned());
        }
        let listing = self.run(&["for-each-ref", "--format=%(objectname) %(refname)"])?;
        refs.extend(parse_ref_listing(&listing));
        Ok(refs)
    }

    fn commits(&self, reference: &str, max_count: usize) -> Result<RawCommits> {
        let format = format!("--format=%H{FIELD_SEP}%an{FIELD_SEP}%at{FIELD_SEP}%s{RECORD_SEP}");
        let max_count = format!("--max-count={max_count}");
        let output = self.run(&["log", &max_count, &format, reference, "--"])?;
        Ok(parse_log(&output))
    }

    fn origin_url(&self) -> Result<Option<String>> {
        match self.run(&["config", "--get", "remote.origin.url"]) {
            Ok(url) => Ok(Some(url.trim().to_owned()).filter(|u| !u.is_empty())),
            // exit code 1: key not set
            Err(Error::Git { code: 1, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Parses `for-each-ref` output of the form `<hash> <refname>` per line
fn parse_ref_listing(listing: &str) -> impl Iterator<Item = (String, String)> + '_ {
    listing.lines().filter_map(|line| {
        let (hash, name) = line.trim().split_once(' ')?;
        Some((name.to_owned(), hash.to_owned()))
    })
}

/// Parses `git log` output written with the field/record separators above
fn parse_log(output: &str) -> RawCommits {
    output
        .split(RECORD_SEP)
        .map(|rec| rec.trim_start_matches('\n'))
        .filter(|rec| !rec.is_empty())
        .filter_map(|rec| {
            let mut fields = rec.splitn(4, FIELD_SEP);
            let hash = fields.next()?.to_owned();
            let author_name = fields.next()?.to_owned();
            let timestamp = fields.next()?.to_owned();
            let subject = fields.next().unwrap_or("").to_owned();
            Some(RawCommit {
                short_hash: hash.chars().take(SHORT_HASH_LEN).collect(),
                hash,
                author_name,
                timestamp,
                subject,
            })
        })
        .collect()
}
