//! The form launcher: builds one row per parameter and runs the callback.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{
    self, ConfigDocument, LoadReport, INPUT_FILES_KEY, OUTPUT_FOLDER_KEY, VERSION_KEY,
};
use crate::dialogs::FileChooser;
use crate::error::GuifyError;
use crate::event_loop::Action;
use crate::params::Signature;
use crate::types::{ParamKind, ParamValue};
use crate::widgets::{BoundWidget, WidgetKind};

/// File name of the configuration snapshot written into the output folder on
/// every run when the pipeline context is enabled.
pub const RUN_CONFIG_FILE: &str = "guify-config.json";

pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;
pub type Callback = Box<dyn FnMut(&Arguments) -> Result<(), CallbackError>>;

#[derive(Debug, Clone, Default)]
pub struct FormOptions {
    /// Window title; the function name when unset.
    pub title: Option<String>,
    /// Show `snake_case` names as "Snake case".
    pub capitalize: bool,
    /// Carry input files and an output folder beside the parameters.
    pub pipeline_context: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Unbuilt,
    Built,
    Closed,
}

impl FormPhase {
    fn name(self) -> &'static str {
        match self {
            FormPhase::Unbuilt => "unbuilt",
            FormPhase::Built => "built",
            FormPhase::Closed => "closed",
        }
    }
}

impl fmt::Display for FormPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Input files and output folder travelling with a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineContext {
    pub input_files: Vec<PathBuf>,
    pub output_folder: Option<PathBuf>,
}

/// Named arguments handed to the callback, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Arguments {
    values: Vec<(String, ParamValue)>,
    context: Option<PipelineContext>,
}

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ParamValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn paths(&self, name: &str) -> Option<&[String]> {
        match self.get(name)? {
            ParamValue::Paths(p) => Some(p),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&PipelineContext> {
        self.context.as_ref()
    }

    /// JSON object of the arguments, context keys included when present.
    pub fn to_json(&self) -> Value {
        let mut doc: ConfigDocument = self
            .values
            .iter()
            .map(|(n, v)| (n.clone(), v.to_json()))
            .collect();
        if let Some(ctx) = &self.context {
            insert_context(&mut doc, ctx);
        }
        Value::Object(doc)
    }
}

fn insert_context(doc: &mut ConfigDocument, ctx: &PipelineContext) {
    doc.insert(
        INPUT_FILES_KEY.to_string(),
        Value::Array(
            ctx.input_files
                .iter()
                .map(|p| Value::String(p.to_string_lossy().into_owned()))
                .collect(),
        ),
    );
    if let Some(folder) = &ctx.output_folder {
        doc.insert(
            OUTPUT_FOLDER_KEY.to_string(),
            Value::String(folder.to_string_lossy().into_owned()),
        );
    }
}

/// A form for one signature. Starts unbuilt; `build` creates the rows and
/// `close` disposes of them.
pub struct Form {
    signature: Signature,
    options: FormOptions,
    phase: FormPhase,
    rows: Vec<BoundWidget>,
    context: PipelineContext,
    callback: Callback,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("function", &self.signature.function)
            .field("phase", &self.phase)
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl Form {
    pub fn new<F>(signature: Signature, callback: F) -> Self
    where
        F: FnMut(&Arguments) -> Result<(), CallbackError> + 'static,
    {
        Self {
            signature,
            options: FormOptions::default(),
            phase: FormPhase::Unbuilt,
            rows: Vec::new(),
            context: PipelineContext::default(),
            callback: Box::new(callback),
        }
    }

    pub fn with_options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn function(&self) -> &str {
        &self.signature.function
    }

    pub fn title(&self) -> &str {
        self.options
            .title
            .as_deref()
            .unwrap_or(&self.signature.function)
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn rows(&self) -> &[BoundWidget] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [BoundWidget] {
        &mut self.rows
    }

    /// Row for `name`, matched case-insensitively.
    pub fn row(&self, name: &str) -> Option<&BoundWidget> {
        let wanted = name.to_lowercase();
        self.rows.iter().find(|r| r.name().to_lowercase() == wanted)
    }

    pub fn row_mut(&mut self, name: &str) -> Option<&mut BoundWidget> {
        let wanted = name.to_lowercase();
        self.rows
            .iter_mut()
            .find(|r| r.name().to_lowercase() == wanted)
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    fn expect_phase(&self, expected: FormPhase) -> Result<(), GuifyError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GuifyError::InvalidPhase {
                expected: expected.name(),
                actual: self.phase.name(),
            })
        }
    }

    /// Resolves the signature and creates one row per parameter, in
    /// declaration order. Nothing is built if any parameter fails.
    pub fn build(&mut self) -> Result<(), GuifyError> {
        self.expect_phase(FormPhase::Unbuilt)?;
        let params = self.signature.resolve()?;
        if self.options.pipeline_context {
            for param in &params {
                let lowered = param.name.to_lowercase();
                if let Some(key) = config::RESERVED_KEYS.iter().find(|k| **k == lowered) {
                    return Err(GuifyError::ReservedName {
                        param: param.name.clone(),
                        function: self.signature.function.clone(),
                        key: *key,
                    });
                }
            }
        }
        let rows = params
            .into_iter()
            .map(|param| BoundWidget::bind(param, self.options.capitalize))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(
            "form for `{}` built with {} parameter(s)",
            self.signature.function,
            rows.len()
        );
        self.rows = rows;
        self.phase = FormPhase::Built;
        Ok(())
    }

    pub fn close(&mut self) {
        if self.phase != FormPhase::Closed {
            tracing::info!("form for `{}` closed", self.signature.function);
        }
        self.rows.clear();
        self.phase = FormPhase::Closed;
    }

    /// Pushes the values of `doc` into matching rows. Keys match parameter
    /// names case-insensitively; unknown keys and ill-typed values are
    /// reported, never fatal.
    pub fn apply_config(&mut self, doc: &ConfigDocument) -> Result<LoadReport, GuifyError> {
        self.expect_phase(FormPhase::Built)?;
        let mut report = LoadReport::default();
        for (key, value) in doc {
            if let Some(row) = self.row_mut(key) {
                let name = row.name().to_string();
                match row.holder_mut().set_json(value) {
                    Ok(()) => report.applied.push(name),
                    Err(e) => {
                        tracing::warn!("{}", e);
                        report.rejected.push((key.clone(), e));
                    }
                }
                continue;
            }
            match key.to_lowercase().as_str() {
                INPUT_FILES_KEY | OUTPUT_FOLDER_KEY if !self.options.pipeline_context => {
                    tracing::info!("`{}` ignored, form has no pipeline context", key);
                    report.ignored_context.push(key.clone());
                }
                INPUT_FILES_KEY => match ParamKind::Files.value_from_json(key, value) {
                    Ok(ParamValue::Paths(paths)) => {
                        self.context.input_files = paths.into_iter().map(PathBuf::from).collect();
                    }
                    Ok(_) => {}
                    Err(e) => report.rejected.push((key.clone(), e)),
                },
                OUTPUT_FOLDER_KEY => match value {
                    Value::String(folder) => {
                        self.context.output_folder = Some(config::expand_home(folder));
                    }
                    Value::Null => self.context.output_folder = None,
                    other => report.rejected.push((
                        key.clone(),
                        GuifyError::TypeMismatch {
                            param: key.clone(),
                            expected: ParamKind::Directory,
                            found: crate::types::json_type_name(other).to_string(),
                        },
                    )),
                },
                VERSION_KEY => {
                    let version = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    tracing::info!("parameter file version: {}", version);
                    report.version = Some(version);
                }
                _ => {
                    tracing::warn!("parameter not recognised: {}", key);
                    report.unrecognized.push(key.clone());
                }
            }
        }
        Ok(report)
    }

    pub fn load_config_file(&mut self, path: &Path) -> Result<LoadReport, GuifyError> {
        self.expect_phase(FormPhase::Built)?;
        let doc = config::read_config(path)?;
        tracing::info!("loading configuration from {}", path.display());
        self.apply_config(&doc)
    }

    /// Snapshot of the current values, keyed by declared parameter name.
    pub fn to_config(&self) -> ConfigDocument {
        let mut doc: ConfigDocument = self
            .rows
            .iter()
            .map(|r| (r.name().to_string(), r.value().to_json()))
            .collect();
        if self.options.pipeline_context {
            insert_context(&mut doc, &self.context);
            doc.insert(
                VERSION_KEY.to_string(),
                Value::String(env!("CARGO_PKG_VERSION").to_string()),
            );
        }
        doc
    }

    /// Writes the snapshot to `path`, or a numbered sibling if `path` exists.
    pub fn save_config(&self, path: &Path) -> Result<PathBuf, GuifyError> {
        self.expect_phase(FormPhase::Built)?;
        config::write_config(path, &self.to_config())
    }

    /// Sets the input files; the output folder follows the first file's
    /// directory unless one was already chosen.
    pub fn set_input_files(&mut self, files: Vec<PathBuf>) {
        if self.context.output_folder.is_none() {
            self.context.output_folder = files
                .first()
                .and_then(|f| f.parent())
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf);
        }
        self.context.input_files = files;
    }

    pub fn set_output_folder(&mut self, folder: PathBuf) {
        self.context.output_folder = Some(folder);
    }

    /// Current values as callback arguments. Fails on the first row whose
    /// text does not parse.
    pub fn arguments(&self) -> Result<Arguments, GuifyError> {
        self.expect_phase(FormPhase::Built)?;
        let values = self
            .rows
            .iter()
            .map(|r| r.check().map(|()| (r.name().to_string(), r.value().clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arguments {
            values,
            context: self
                .options
                .pipeline_context
                .then(|| self.context.clone()),
        })
    }

    /// Invokes the callback with the current values, on the calling thread.
    pub fn run(&mut self) -> Result<(), GuifyError> {
        let args = self.arguments()?;
        if self.options.pipeline_context {
            if let Some(folder) = &self.context.output_folder {
                std::fs::create_dir_all(folder)?;
                config::write_config(&folder.join(RUN_CONFIG_FILE), &self.to_config())?;
            }
        }
        tracing::info!("running `{}`", self.signature.function);
        (self.callback)(&args).map_err(|e| GuifyError::Callback {
            function: self.signature.function.clone(),
            message: e.to_string(),
        })
    }

    /// Carries out a queued action. Returns a status line for the user, if
    /// there is anything to say.
    pub fn handle(
        &mut self,
        action: Action,
        chooser: &dyn FileChooser,
    ) -> Result<Option<String>, GuifyError> {
        self.expect_phase(FormPhase::Built)?;
        match action {
            Action::PickPath { row } => {
                let Some(bound) = self.rows.get_mut(row) else {
                    return Ok(None);
                };
                let title = bound.label().to_string();
                let picked = match bound.widget() {
                    WidgetKind::FileButton => chooser.pick_file(&title).map(|p| vec![p]),
                    WidgetKind::FilesButton => chooser.pick_files(&title),
                    WidgetKind::DirectoryButton => {
                        let start = match bound.value() {
                            ParamValue::Str(s) if !s.is_empty() => Some(PathBuf::from(s)),
                            _ => None,
                        };
                        chooser.pick_folder(&title, start.as_deref()).map(|p| vec![p])
                    }
                    WidgetKind::TextEntry | WidgetKind::Checkbox => None,
                };
                if let Some(paths) = picked {
                    bound.apply_paths(paths)?;
                }
                Ok(None)
            }
            Action::LoadConfig => match chooser.pick_config() {
                Some(path) => Ok(Some(self.load_config_file(&path)?.summary())),
                None => Ok(None),
            },
            Action::SaveConfig => match chooser.save_config() {
                Some(path) => {
                    let written = self.save_config(&path)?;
                    Ok(Some(format!("configuration saved to {}", written.display())))
                }
                None => Ok(None),
            },
            Action::ChooseInputFiles if self.options.pipeline_context => {
                match chooser.pick_files("Choose input files") {
                    Some(files) => {
                        let count = files.len();
                        self.set_input_files(files);
                        Ok(Some(format!("{} input file(s) selected", count)))
                    }
                    None => Ok(None),
                }
            }
            Action::ChooseOutputFolder if self.options.pipeline_context => {
                let start = self.context.output_folder.clone();
                match chooser.pick_folder("Choose output folder", start.as_deref()) {
                    Some(folder) => {
                        let status = format!("output folder: {}", folder.display());
                        self.set_output_folder(folder);
                        Ok(Some(status))
                    }
                    None => Ok(None),
                }
            }
            Action::ChooseInputFiles | Action::ChooseOutputFolder => Ok(None),
            Action::Run => {
                self.run()?;
                Ok(Some(format!("`{}` finished", self.signature.function)))
            }
        }
    }
}
