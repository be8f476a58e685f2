use std::{collections::BTreeSet, fmt};

use log::debug;
use serde::{Deserialize, Serialize};

/// The symbolic "current position" ref, never reported as a branch
pub const HEAD: &str = "HEAD";

/// Fragments removed from ref names to get a display name
const REF_PREFIXES: [&str; 4] = ["refs/", "remotes/", "origin/", "heads/"];

/// The branch names pointing at the checked out ref.
///
/// Displays as `[main, origin-only]`, or `[]` when no branch points at the
/// current ref.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchSet(BTreeSet<String>);

impl BranchSet {
    pub fn new() -> BranchSet { BranchSet::default() }

    pub fn contains(&self, name: &str) -> bool { self.0.contains(name) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(String::as_str) }
}

impl<S: Into<String>> FromIterator<S> for BranchSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        BranchSet(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for BranchSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        let mut it = self.0.iter().peekable();
        while let Some(name) = it.next() {
            write!(f, "{name}")?;
            if it.peek().is_some() {
                write!(f, ", ")?;
            }
        }
        write!(f, "]")
    }
}

/// Strips the well known prefixes from a ref name, e.g.
/// `refs/remotes/origin/main` becomes `main`
pub fn short_ref_name(name: &str) -> String {
    REF_PREFIXES
        .iter()
        .fold(name.to_owned(), |acc, prefix| acc.replace(prefix, ""))
}

/// Collects the names of every ref that is, or points at the same commit as,
/// `current_ref`.
///
/// `refs` maps ref names to the hash they point at. `current_ref` is either a
/// ref name (a branch is checked out) or a hash (detached HEAD).
///
/// # Example
///
/// ```
/// # use gitlog::branch::resolve_branches;
/// let refs = [
///     ("HEAD", "abc"),
///     ("refs/heads/main", "abc"),
///     ("refs/remotes/origin/main", "abc"),
///     ("refs/heads/dev", "def"),
/// ];
/// let branches = resolve_branches("abc", refs);
///
/// assert_eq!("[main]", branches.to_string());
/// ```
pub fn resolve_branches<I, N, H>(current_ref: &str, refs: I) -> BranchSet
where
    I: IntoIterator<Item = (N, H)>,
    N: AsRef<str>,
    H: AsRef<str>,
{
    let branches: BranchSet = refs
        .into_iter()
        .filter(|(name, hash)| name.as_ref() == current_ref || hash.as_ref() == current_ref)
        .map(|(name, _)| short_ref_name(name.as_ref()))
        .filter(|name| name != HEAD)
        .collect();
    debug!("current branches: {branches}");
    branches
}
