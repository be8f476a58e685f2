use std::io;

use log::debug;

use crate::{error::Result, fmt::FormatWriter, report::Report};

/// Wraps a `std::io::Write` object to write `gitlog` output in a JSON format
///
/// The document has a `branches` array and a `commits` array; every commit
/// object carries the keys `H`, `h`, `an`, `ad`, `s`, `sWithUrl`, `issueUrl`,
/// `gitLabUrl` and `issueId`.
///
/// # Example
///
/// ```no_run
/// # use std::fs::File;
/// # use gitlog::{Report, fmt::{FormatWriter, JsonWriter}};
/// let report = Report::default();
///
/// // Create a file to hold our results, which the JsonWriter will wrap (note, .unwrap() is only
/// // used to keep the example short and concise)
/// let mut file = File::create("CHANGELOG.json").unwrap();
///
/// let mut writer = JsonWriter::new(&mut file);
/// writer.write_report(&report).unwrap();
/// ```
pub struct JsonWriter<'a>(&'a mut dyn io::Write);

impl<'a> JsonWriter<'a> {
    /// Creates a new instance of the `JsonWriter` struct using a
    /// `std::io::Write` object.
    pub fn new<T: io::Write>(writer: &'a mut T) -> JsonWriter<'a> { JsonWriter(writer) }
}

impl<'a> FormatWriter for JsonWriter<'a> {
    fn write_report(&mut self, report: &Report) -> Result<()> {
        debug!("Writing JSON report with {} commits", report.commits.len());
        serde_json::to_writer_pretty(&mut self.0, report)?;
        writeln!(self.0)?;
        self.0.flush().map_err(Into::into)
    }
}
