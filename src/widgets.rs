//! Input controls for each parameter kind.

use std::path::PathBuf;

use eframe::egui;

use crate::error::GuifyError;
use crate::event_loop::Action;
use crate::params::Param;
use crate::types::{ParamKind, ParamValue, ValueHolder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    TextEntry,
    Checkbox,
    FileButton,
    FilesButton,
    DirectoryButton,
}

impl WidgetKind {
    pub fn for_kind(kind: ParamKind) -> Self {
        match kind {
            ParamKind::Bool => WidgetKind::Checkbox,
            ParamKind::FilePath => WidgetKind::FileButton,
            ParamKind::Files => WidgetKind::FilesButton,
            ParamKind::Directory => WidgetKind::DirectoryButton,
            ParamKind::Float | ParamKind::Int | ParamKind::Str => WidgetKind::TextEntry,
        }
    }

    /// Whether the widget is filled from a file dialog.
    pub fn picks_paths(self) -> bool {
        matches!(
            self,
            WidgetKind::FileButton | WidgetKind::FilesButton | WidgetKind::DirectoryButton
        )
    }
}

/// Row label for a parameter name; `capitalize` turns `smooth_radius` into
/// "Smooth radius".
pub fn format_label(name: &str, capitalize: bool) -> String {
    if !capitalize {
        return name.to_string();
    }
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A parameter, its value holder and the control editing it.
#[derive(Debug, Clone)]
pub struct BoundWidget {
    param: Param,
    holder: ValueHolder,
    widget: WidgetKind,
    label: String,
    text: String,
    seen_revision: u64,
    error: Option<String>,
}

impl BoundWidget {
    pub fn bind(param: Param, capitalize: bool) -> Result<Self, GuifyError> {
        let holder = ValueHolder::new(&param.name, param.kind, param.default.clone())?;
        let text = holder.get().display_text();
        Ok(Self {
            widget: WidgetKind::for_kind(param.kind),
            label: format_label(&param.name, capitalize),
            seen_revision: holder.revision(),
            param,
            holder,
            text,
            error: None,
        })
    }

    pub fn param(&self) -> &Param {
        &self.param
    }

    pub fn name(&self) -> &str {
        &self.param.name
    }

    pub fn widget(&self) -> WidgetKind {
        self.widget
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &ParamValue {
        self.holder.get()
    }

    pub fn holder_mut(&mut self) -> &mut ValueHolder {
        &mut self.holder
    }

    /// Text currently shown in the control.
    pub fn text(&mut self) -> &str {
        self.sync();
        &self.text
    }

    /// Parse error left by the last edit, if the text did not parse.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fails with the parse error when the entry holds text that does not
    /// parse as the parameter's kind.
    pub fn check(&self) -> Result<(), GuifyError> {
        if self.error.is_none() {
            return Ok(());
        }
        self.param.kind.parse_text(&self.param.name, &self.text).map(|_| ())
    }

    /// Applies text typed by the user. Unparsable text is kept in the entry
    /// and flagged; the holder keeps its last valid value.
    pub fn edit_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.commit_text();
    }

    /// Stores paths returned by a dialog.
    pub fn apply_paths(&mut self, paths: Vec<PathBuf>) -> Result<(), GuifyError> {
        let mut paths: Vec<String> = paths
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let value = match self.param.kind {
            ParamKind::Files => ParamValue::Paths(paths),
            _ if paths.is_empty() => return Ok(()),
            _ => ParamValue::Str(paths.swap_remove(0)),
        };
        self.holder.set(value)
    }

    fn commit_text(&mut self) {
        match self.holder.set_text(&self.text) {
            Ok(()) => self.error = None,
            Err(e) => self.error = Some(e.to_string()),
        }
        self.seen_revision = self.holder.revision();
    }

    fn sync(&mut self) {
        if self.holder.revision() != self.seen_revision {
            self.text = self.holder.get().display_text();
            self.error = None;
            self.seen_revision = self.holder.revision();
        }
    }

    /// Draws the control. Returns the action to queue when a dialog button
    /// was pressed.
    pub fn show(&mut self, ui: &mut egui::Ui, row: usize) -> Option<Action> {
        self.sync();
        let mut action = None;
        ui.horizontal(|ui| match self.widget {
            WidgetKind::TextEntry => {
                let edit = egui::TextEdit::singleline(&mut self.text).desired_width(220.0);
                if ui.add(edit).changed() {
                    self.commit_text();
                }
                if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::RED, "!").on_hover_text(err);
                }
            }
            WidgetKind::Checkbox => {
                let mut checked = matches!(self.holder.get(), ParamValue::Bool(true));
                if ui.checkbox(&mut checked, "").changed() {
                    if let Err(e) = self.holder.set(ParamValue::Bool(checked)) {
                        tracing::warn!("{}", e);
                    }
                    self.seen_revision = self.holder.revision();
                }
            }
            WidgetKind::FileButton | WidgetKind::DirectoryButton => {
                let caption = if self.widget == WidgetKind::FileButton {
                    "Choose file…"
                } else {
                    "Choose folder…"
                };
                if ui.button(caption).clicked() {
                    action = Some(Action::PickPath { row });
                }
                if self.text.is_empty() {
                    ui.weak("(none)");
                } else {
                    ui.label(&self.text);
                }
            }
            WidgetKind::FilesButton => {
                if ui.button("Choose files…").clicked() {
                    action = Some(Action::PickPath { row });
                }
                let count = match self.holder.get() {
                    ParamValue::Paths(paths) => paths.len(),
                    _ => 0,
                };
                ui.label(format!("{} file(s)", count))
                    .on_hover_text(self.text.replace("; ", "\n"));
            }
        });
        action
    }
}
