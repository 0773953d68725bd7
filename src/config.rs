//! Configuration documents: JSON objects mapping parameter names to values.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::GuifyError;

pub const INPUT_FILES_KEY: &str = "input files";
pub const OUTPUT_FOLDER_KEY: &str = "output folder";
pub const VERSION_KEY: &str = "version";

/// Keys carrying pipeline context rather than parameter values.
pub const RESERVED_KEYS: [&str; 3] = [INPUT_FILES_KEY, OUTPUT_FOLDER_KEY, VERSION_KEY];

/// A parsed configuration document.
pub type ConfigDocument = Map<String, Value>;

/// Where a preloaded configuration comes from: a path, or the document itself
/// when the argument starts with `{`.
pub fn read_config_arg(arg: &str) -> Result<ConfigDocument, GuifyError> {
    if arg.trim_start().starts_with('{') {
        parse_config(arg)
    } else {
        read_config(Path::new(arg))
    }
}

pub fn parse_config(text: &str) -> Result<ConfigDocument, GuifyError> {
    into_document(serde_json::from_str(text)?)
}

pub fn read_config(path: &Path) -> Result<ConfigDocument, GuifyError> {
    let reader = BufReader::new(File::open(path)?);
    into_document(serde_json::from_reader(reader)?)
}

fn into_document(value: Value) -> Result<ConfigDocument, GuifyError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(GuifyError::NotAnObject(
            crate::types::json_type_name(&other).to_string(),
        )),
    }
}

/// Writes `doc` next to `path` without overwriting anything: `cfg.json`
/// becomes `cfg (0).json`, `cfg (1).json`, ... when taken. Each candidate is
/// opened with `create_new`, so a file appearing meanwhile is skipped, not
/// truncated. Returns the path actually written.
pub fn write_config(path: &Path, doc: &ConfigDocument) -> Result<PathBuf, GuifyError> {
    for target in candidate_paths(path) {
        let file = match File::options().write(true).create_new(true).open(&target) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, doc)?;
        writer.flush()?;
        tracing::info!("configuration saved to {}", target.display());
        return Ok(target);
    }
    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free file name next to {}", path.display()),
    )
    .into())
}

/// `path` itself, then its numbered siblings.
fn candidate_paths(path: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    std::iter::once(path.to_path_buf()).chain(
        (0..u32::MAX).map(move |attempt| parent.join(format!("{} ({}){}", stem, attempt, ext))),
    )
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    match (path.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with(['/', '\\']) => {
            PathBuf::from(home).join(rest.trim_start_matches(['/', '\\']))
        }
        _ => PathBuf::from(path),
    }
}

/// What happened to each key of a loaded document.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Parameters that received a value, by declared name.
    pub applied: Vec<String>,
    /// Keys matching no parameter or reserved key.
    pub unrecognized: Vec<String>,
    /// Keys whose value did not fit the parameter.
    pub rejected: Vec<(String, GuifyError)>,
    /// Reserved context keys present while the form has no pipeline context.
    pub ignored_context: Vec<String>,
    pub version: Option<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.unrecognized.is_empty() && self.rejected.is_empty()
    }

    /// One-line summary for the status bar.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} parameter(s) loaded", self.applied.len())];
        if !self.unrecognized.is_empty() {
            parts.push(format!("not recognised: {}", self.unrecognized.join(", ")));
        }
        for (key, err) in &self.rejected {
            parts.push(format!("{} rejected ({})", key, err));
        }
        parts.join("; ")
    }
}
