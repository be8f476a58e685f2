use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, log, warn, Level};

use crate::{
    commit::CommitRecordBuilder,
    config::RawCfg,
    engine::{TemplateEngine, TeraEngine},
    error::{Error, Result},
    fmt::{FormatWriter, HtmlWriter, JsonWriter, ReportFormat, TemplateSource, TextWriter},
    git::{GitCli, RepoReader},
    issue_link::{IssueLinker, DEFAULT_ISSUE_PATTERN},
    line_template::{LineTemplate, DEFAULT_TEMPLATE_LINE},
    report::Report,
    DEFAULT_CONFIG_FILE,
};

/// The base struct used to set options and generate the reports.
#[derive(Debug, Clone)]
pub struct GitLog {
    /// The git dir with all the meta-data (Defaults to the first `.git`
    /// found in the current directory or up to two of its parents)
    pub git_dir: Option<PathBuf>,
    /// The directory the reports are written to (Defaults to
    /// `target/generated-resources/resources`)
    pub output_folder: PathBuf,
    /// The report file name without extension (Defaults to `CHANGELOG`)
    pub output_file_name: String,
    /// Comma separated output formats: `txt`, `json`, `html`, or any other
    /// extension which is rendered like `txt` (Defaults to `txt`)
    pub formats: String,
    /// The maximum number of commits in a report (Defaults to 10)
    pub count_commits: usize,
    /// The line template for text formats (Defaults to `%ad %h %an %s`)
    pub template_line: String,
    /// Whether text reports start with a `Branch: [..]` line (Defaults to
    /// `true`)
    pub add_branch_line: bool,
    /// The template used for `html` (Defaults to the built-in table)
    pub template: TemplateSource,
    /// The base of commit hyper-links (Defaults to the `origin` remote URL
    /// followed by `/commit/`)
    pub git_lab_url: Option<String>,
    /// The base of issue hyper-links. Without it no issue links are made
    pub bug_tracking_url: Option<String>,
    /// The regex whose first group is the issue number (Defaults to the first
    /// word of the subject)
    pub issue_pattern: Option<String>,
    /// Report errors to stderr instead of returning them (Defaults to `true`)
    pub silent: bool,
    /// Log progress at `info` instead of `debug` level
    pub trace: bool,
}

impl Default for GitLog {
    fn default() -> Self {
        debug!("Creating default gitlog with GitLog::default()");
        GitLog {
            git_dir: None,
            output_folder: PathBuf::from("target/generated-resources/resources"),
            output_file_name: "CHANGELOG".to_owned(),
            formats: "txt".to_owned(),
            count_commits: 10,
            template_line: DEFAULT_TEMPLATE_LINE.to_owned(),
            add_branch_line: true,
            template: TemplateSource::default(),
            git_lab_url: None,
            bug_tracking_url: None,
            issue_pattern: Some(DEFAULT_ISSUE_PATTERN.to_owned()),
            silent: true,
            trace: false,
        }
    }
}

impl GitLog {
    /// Creates a `GitLog` from the default `.gitlog.toml` configuration file
    /// in the current working directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitlog::GitLog;
    /// let gitlog = GitLog::new().unwrap();
    /// ```
    pub fn new() -> Result<Self> {
        debug!("Trying default config file");
        GitLog::from_file(DEFAULT_CONFIG_FILE)
    }

    /// Creates a `GitLog` from a custom TOML configuration file. Relative
    /// paths are resolved against the current working directory.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitlog::GitLog;
    /// let gitlog = GitLog::from_file("/myproject/gitlog.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let cfg_file = if file.as_ref().is_relative() {
            let cwd = env::current_dir().map_err(|_| Error::CurrentDir)?;
            cwd.join(file.as_ref())
        } else {
            file.as_ref().to_path_buf()
        };
        GitLog::default().try_config_file(&cfg_file)
    }

    // Try and apply a config file on top of the current options
    fn try_config_file(mut self, cfg_file: &Path) -> Result<Self> {
        debug!("Trying to use config file: {:?}", cfg_file);
        let toml_s = fs::read_to_string(cfg_file)?;

        let parse_err = |source| Error::ConfigParse {
            path: cfg_file.to_path_buf(),
            source,
        };
        let value: toml::Value = toml_s.parse().map_err(parse_err)?;
        if value.get("gitlog").and_then(toml::Value::as_table).is_none() {
            return Err(Error::ConfigFormat(cfg_file.to_path_buf()));
        }
        let cfg: RawCfg = value.try_into().map_err(parse_err)?;
        let g = cfg.gitlog;

        if g.git_dir.is_some() {
            self.git_dir = g.git_dir;
        }
        if let Some(v) = g.output_folder {
            self.output_folder = v;
        }
        if let Some(v) = g.output_file_name {
            self.output_file_name = v;
        }
        if let Some(v) = g.formats {
            self.formats = v;
        }
        if let Some(v) = g.count_commits {
            self.count_commits = v;
        }
        if let Some(v) = g.template_line {
            self.template_line = v;
        }
        if let Some(v) = g.add_current_branch_first_line {
            self.add_branch_line = v;
        }
        self.template = match (g.use_internal_template, g.template_file) {
            (Some(false), Some(file)) => TemplateSource::File(file),
            (Some(false), None) => {
                warn!("use-internal-template is false but no template-file is set");
                TemplateSource::File(PathBuf::new())
            }
            _ => TemplateSource::Builtin {
                only_table: g.internal_template_only_table.unwrap_or(true),
            },
        };
        if g.git_lab_url.is_some() {
            self.git_lab_url = g.git_lab_url;
        }
        if g.bug_tracking_url.is_some() {
            self.bug_tracking_url = g.bug_tracking_url;
        }
        if g.reg_exp_issue_number.is_some() {
            self.issue_pattern = g.reg_exp_issue_number;
        }
        if let Some(v) = g.silent {
            self.silent = v;
        }
        if let Some(v) = g.trace {
            self.trace = v;
        }

        debug!("Returning gitlog:\n{:?}", self);
        Ok(self)
    }

    /// Sets the `git` metadata directory (typically `.git` child of your
    /// project working tree)
    pub fn git_dir<P: AsRef<Path>>(mut self, d: P) -> GitLog {
        self.git_dir = Some(d.as_ref().to_path_buf());
        self
    }

    /// Sets the directory the reports are written to
    pub fn output_folder<P: AsRef<Path>>(mut self, d: P) -> GitLog {
        self.output_folder = d.as_ref().to_path_buf();
        self
    }

    /// Sets the report file name, without extension
    pub fn output_file_name<S: Into<String>>(mut self, n: S) -> GitLog {
        self.output_file_name = n.into();
        self
    }

    /// Sets the comma separated list of formats to write
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitlog::GitLog;
    /// let gitlog = GitLog::default().formats("txt,json,html");
    /// ```
    pub fn formats<S: Into<String>>(mut self, f: S) -> GitLog {
        self.formats = f.into();
        self
    }

    /// Sets the maximum number of commits per report
    pub fn count_commits(mut self, n: usize) -> GitLog {
        self.count_commits = n;
        self
    }

    /// Sets the line template of text reports
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitlog::GitLog;
    /// let gitlog = GitLog::default().template_line("%ad - %h - %an: %sWithUrl");
    /// ```
    pub fn template_line<S: Into<String>>(mut self, t: S) -> GitLog {
        self.template_line = t.into();
        self
    }

    /// Sets whether text reports start with the current branches
    pub fn add_branch_line(mut self, b: bool) -> GitLog {
        self.add_branch_line = b;
        self
    }

    /// Uses the built-in HTML template, either the bare table or a full
    /// document around it
    pub fn internal_template(mut self, only_table: bool) -> GitLog {
        self.template = TemplateSource::Builtin { only_table };
        self
    }

    /// Uses a template file for HTML reports
    pub fn template_file<P: AsRef<Path>>(mut self, p: P) -> GitLog {
        self.template = TemplateSource::File(p.as_ref().to_path_buf());
        self
    }

    /// Sets the base of commit hyper-links
    pub fn git_lab_url<S: Into<String>>(mut self, u: S) -> GitLog {
        self.git_lab_url = Some(u.into());
        self
    }

    /// Sets the base of issue hyper-links
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitlog::GitLog;
    /// let gitlog = GitLog::default().bug_tracking_url("https://jira.example.com/browse");
    /// ```
    pub fn bug_tracking_url<S: Into<String>>(mut self, u: S) -> GitLog {
        self.bug_tracking_url = Some(u.into());
        self
    }

    /// Sets the regex used to find issue numbers in subjects
    pub fn issue_pattern<S: Into<String>>(mut self, p: S) -> GitLog {
        self.issue_pattern = Some(p.into());
        self
    }

    /// Sets whether errors are only reported (`true`) or returned
    pub fn silent(mut self, s: bool) -> GitLog {
        self.silent = s;
        self
    }

    /// Sets whether progress is logged at `info` level
    pub fn trace(mut self, t: bool) -> GitLog {
        self.trace = t;
        self
    }

    fn level(&self) -> Level {
        if self.trace {
            Level::Info
        } else {
            Level::Debug
        }
    }

    /// The builder for commit records, using the configured links. Without a
    /// configured `git_lab_url` the `origin` remote of `reader` is used.
    pub fn record_builder<R>(&self, reader: &R) -> Result<CommitRecordBuilder>
    where
        R: RepoReader + ?Sized,
    {
        let commit_base = match &self.git_lab_url {
            Some(url) => url.clone(),
            None => match reader.origin_url()? {
                Some(origin) => {
                    log!(self.level(), "origin: {origin}");
                    format!("{}/commit/", origin.strip_suffix(".git").unwrap_or(&origin))
                }
                None => String::new(),
            },
        };
        let linker = IssueLinker::new(
            self.issue_pattern.as_deref(),
            self.bug_tracking_url.as_deref(),
        );
        Ok(CommitRecordBuilder::new(linker, &commit_base))
    }

    /// Reads the report data from `reader`
    pub fn report_from<R>(&self, reader: &R) -> Result<Report>
    where
        R: RepoReader + ?Sized,
    {
        let builder = self.record_builder(reader)?;
        let report = Report::from_reader(reader, &builder, self.count_commits)?;
        for commit in &report.commits {
            log!(self.level(), "{commit:?}");
        }
        Ok(report)
    }

    /// The file a format is written to
    pub fn output_path(&self, format: &ReportFormat) -> PathBuf {
        self.output_folder
            .join(format!("{}.{}", self.output_file_name, format.extension()))
    }

    /// Renders `report` in one format
    pub fn encode(
        &self,
        format: &ReportFormat,
        report: &Report,
        engine: &mut dyn TemplateEngine,
    ) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        match format {
            ReportFormat::Json => JsonWriter::new(&mut buf).write_report(report)?,
            ReportFormat::Html => HtmlWriter::new(&mut buf, engine, &self.template).write_report(report)?,
            ReportFormat::Text(_) => {
                let line = LineTemplate::new(self.template_line.as_str());
                TextWriter::new(&mut buf, &line, self.add_branch_line).write_report(report)?
            }
        }
        log!(self.level(), " *** Result *** \n{}", String::from_utf8_lossy(&buf));
        Ok(buf)
    }

    /// Writes `report` once per configured format and returns the files
    /// written.
    ///
    /// Each format is independent: a failure is logged and the remaining
    /// formats are still written. Unless `silent` is set, failures are
    /// returned together once every format has been tried. A missing HTML
    /// template only means no HTML file, and any file left by an earlier run
    /// is removed.
    pub fn write_reports(&self, report: &Report, engine: &mut dyn TemplateEngine) -> Result<Vec<PathBuf>> {
        let mut written = vec![];
        let mut failures = vec![];
        for format in ReportFormat::parse_list(&self.formats) {
            let path = self.output_path(&format);
            match self.encode(&format, report, engine).and_then(|payload| write_output(&path, &payload)) {
                Ok(true) => {
                    log!(self.level(), "git log written to {}", path.display());
                    written.push(path);
                }
                Ok(false) => debug!("Nothing to write for {}", format.extension()),
                Err(Error::TemplateNotFound(tpl)) => {
                    error!("Template {} not found, no {format} report written", tpl.display());
                    if let Err(e) = remove_stale(&path) {
                        failures.push(format!("{} ({e})", format.extension()));
                    }
                }
                Err(e) => {
                    error!("Failed to write {format} report to {}: {e}", path.display());
                    failures.push(format!("{} ({e})", format.extension()));
                }
            }
        }

        if failures.is_empty() || self.silent {
            Ok(written)
        } else {
            Err(Error::Formats(failures))
        }
    }

    /// Reads `reader` and writes every configured format through `engine`
    pub fn run_with<R>(&self, reader: &R, engine: &mut dyn TemplateEngine) -> Result<Report>
    where
        R: RepoReader + ?Sized,
    {
        let report = self.report_from(reader)?;
        log!(self.level(), "current branches: {}", report.branches);
        self.write_reports(&report, engine)?;
        Ok(report)
    }

    fn reader(&self) -> Result<GitCli> {
        match &self.git_dir {
            Some(dir) if dir.exists() => Ok(GitCli::new(dir)),
            Some(dir) => Err(Error::RepositoryNotFound(dir.display().to_string())),
            None => GitCli::discover(env::current_dir().map_err(|_| Error::CurrentDir)?),
        }
    }

    /// Generates the reports from the git repository, returning any error
    pub fn try_execute(&self) -> Result<Report> {
        let git = self.reader()?;
        log!(self.level(), "using git folder: {}", git.git_dir().display());
        let mut engine = TeraEngine::new()?;
        self.run_with(&git, &mut engine)
    }

    /// Generates the reports from the git repository.
    ///
    /// With `silent` set, errors are written to stderr and `Ok(None)` is
    /// returned so that a surrounding build carries on.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use gitlog::GitLog;
    /// let report = GitLog::default()
    ///     .formats("txt,json")
    ///     .bug_tracking_url("https://jira.example.com/browse")
    ///     .execute()
    ///     .unwrap();
    ///
    /// if let Some(report) = report {
    ///     for (key, value) in report.properties() {
    ///         println!("{key} = {value}");
    ///     }
    /// }
    /// ```
    pub fn execute(&self) -> Result<Option<Report>> {
        match self.try_execute() {
            Ok(report) => Ok(Some(report)),
            Err(e) if self.silent => {
                error!("Error get commits: {e}");
                wlnerr!("gitlog: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Replaces whatever is at `path` with `payload`. An empty payload only
/// removes the old file. Returns whether a file was written.
fn write_output(path: &Path, payload: &[u8]) -> Result<bool> {
    remove_stale(path)?;
    if payload.is_empty() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(payload)?;
    Ok(true)
}

/// Removes the output of an earlier run at `path`, if any
fn remove_stale(path: &Path) -> Result<()> {
    if path.exists() {
        debug!("Output file {} already exists, deleting", path.display());
        fs::remove_file(path)?;
    }
    Ok(())
}
