use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RawCfg {
    pub gitlog: RawGitlogCfg,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawGitlogCfg {
    pub git_dir: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
    pub output_file_name: Option<String>,
    pub formats: Option<String>,
    pub count_commits: Option<usize>,
    pub template_line: Option<String>,
    pub add_current_branch_first_line: Option<bool>,
    pub use_internal_template: Option<bool>,
    pub internal_template_only_table: Option<bool>,
    pub template_file: Option<PathBuf>,
    pub git_lab_url: Option<String>,
    pub bug_tracking_url: Option<String>,
    pub reg_exp_issue_number: Option<String>,
    pub silent: Option<bool>,
    pub trace: Option<bool>,
}
