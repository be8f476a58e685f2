use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::debug;
use tera::Context;

use crate::{
    engine::{TemplateEngine, DOCUMENT_SOURCE, TABLE_SOURCE},
    error::{Error, Result},
    fmt::FormatWriter,
    report::Report,
    token::{Token, TokenMap},
};

/// Context variable holding the list of commits
pub const COMMITS_VAR: &str = "commits";
/// Context variable holding the display form of the current branches
pub const BRANCH_VAR: &str = "currentBranch";

/// Where the HTML template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// The built-in commit table, either bare (`only_table`) or wrapped in a
    /// full document
    Builtin { only_table: bool },
    /// A user supplied template file
    File(PathBuf),
}

impl Default for TemplateSource {
    fn default() -> Self { TemplateSource::Builtin { only_table: true } }
}

impl TemplateSource {
    /// The template text
    pub fn load(&self) -> Result<String> {
        match self {
            TemplateSource::Builtin { only_table: true } => Ok(TABLE_SOURCE.to_owned()),
            TemplateSource::Builtin { only_table: false } => Ok(DOCUMENT_SOURCE.to_owned()),
            TemplateSource::File(path) => read_template(path),
        }
    }
}

fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::TemplateNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })
}

/// Builds the template context: `commits` is a list of objects with one
/// property per token (`commit.H`, `commit.an`, ...) and `currentBranch` is
/// the branch display string. `sWithUrl` holds the HTML escaped form, with
/// only the issue anchors left as markup.
pub fn template_context(report: &Report) -> Context {
    let commits: Vec<IndexMap<&'static str, String>> = report
        .commits
        .iter()
        .map(|c| {
            let mut fields: IndexMap<_, _> = TokenMap::from_record(c)
                .iter()
                .map(|(t, v)| (t.name(), v.to_owned()))
                .collect();
            fields.insert(Token::SubjectWithUrl.name(), c.html_subject_with_links());
            fields
        })
        .collect();

    let mut context = Context::new();
    context.insert(COMMITS_VAR, &commits);
    context.insert(BRANCH_VAR, &report.branches.to_string());
    context
}

/// Wraps a `std::io::Write` object to write `gitlog` output as HTML through
/// a `TemplateEngine`
///
/// # Example
///
/// ```no_run
/// # use std::fs::File;
/// # use gitlog::{Report, TeraEngine, fmt::{FormatWriter, HtmlWriter, TemplateSource}};
/// let report = Report::default();
/// let mut engine = TeraEngine::new().unwrap();
/// let source = TemplateSource::Builtin { only_table: false };
///
/// let mut file = File::create("CHANGELOG.html").unwrap();
/// let mut writer = HtmlWriter::new(&mut file, &mut engine, &source);
///
/// writer.write_report(&report).unwrap();
/// ```
pub struct HtmlWriter<'a> {
    out: &'a mut dyn io::Write,
    engine: &'a mut dyn TemplateEngine,
    source: &'a TemplateSource,
}

impl<'a> HtmlWriter<'a> {
    pub fn new<T: io::Write>(
        out: &'a mut T,
        engine: &'a mut dyn TemplateEngine,
        source: &'a TemplateSource,
    ) -> HtmlWriter<'a> {
        HtmlWriter {
            out,
            engine,
            source,
        }
    }
}

impl<'a> FormatWriter for HtmlWriter<'a> {
    fn write_report(&mut self, report: &Report) -> Result<()> {
        debug!("Writing HTML report from {:?}", self.source);
        let template = self.source.load()?;
        let html = self.engine.render(&template_context(report), &template)?;
        self.out.write_all(html.as_bytes())?;
        self.out.flush().map_err(Into::into)
    }
}
