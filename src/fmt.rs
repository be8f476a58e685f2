mod html_writer;
mod json_writer;
mod txt_writer;

use strum::{Display, EnumString};

pub use self::{
    html_writer::{HtmlWriter, TemplateSource},
    json_writer::JsonWriter,
    txt_writer::TextWriter,
};
use crate::{error::Result, report::Report};

/// An output format requested by the user.
///
/// `json` and `html` (in any case) select their encoders; any other tag is
/// rendered as text and used as the file extension.
///
/// # Example
///
/// ```
/// # use gitlog::fmt::ReportFormat;
/// assert_eq!(ReportFormat::Json, "JSON".parse().unwrap());
/// assert_eq!(ReportFormat::Text("log".into()), "log".parse().unwrap());
/// ```
#[derive(Clone, PartialEq, Eq, Debug, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportFormat {
    Json,
    Html,
    #[strum(default)]
    Text(String),
}

impl ReportFormat {
    /// Parses a comma separated list such as `"txt, json,html"`. Empty
    /// entries are skipped.
    pub fn parse_list(formats: &str) -> Vec<ReportFormat> {
        formats
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .filter_map(|f| f.parse().ok())
            .collect()
    }

    /// The extension of the file this format is written to
    pub fn extension(&self) -> &str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
            ReportFormat::Text(ext) => ext,
        }
    }
}

impl Default for ReportFormat {
    fn default() -> Self { ReportFormat::Text("txt".to_owned()) }
}

/// A trait that allows writing a `Report` in an arbitrary format. The
/// single required function `write_report()` receives the branches and
/// commits of the run.
///
/// `gitlog` provides three implementors of this trait,
/// `gitlog::fmt::TextWriter`, `gitlog::fmt::JsonWriter` and
/// `gitlog::fmt::HtmlWriter`.
pub trait FormatWriter {
    /// Writes the report
    fn write_report(&mut self, report: &Report) -> Result<()>;
}
