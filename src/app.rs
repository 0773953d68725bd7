//! Desktop window around a [`Form`].

use eframe::{egui, App, NativeOptions};

use crate::config::ConfigDocument;
use crate::dialogs::{FileChooser, NativeDialogs};
use crate::error::GuifyError;
use crate::event_loop::{Action, EventLoop};
use crate::form::{Form, FormPhase};

enum Status {
    Info(String),
    Error(String),
}

pub struct FormApp {
    form: Form,
    events: EventLoop,
    chooser: Box<dyn FileChooser>,
    status: Option<Status>,
}

impl FormApp {
    pub fn new(form: Form, chooser: Box<dyn FileChooser>) -> Self {
        Self {
            form,
            events: EventLoop::new(),
            chooser,
            status: None,
        }
    }

    fn post(&mut self, action: Action) {
        if let Err(e) = self.events.post(action) {
            tracing::warn!("{:?} dropped: {}", action, e);
        }
    }

    fn drain(&mut self) {
        while let Some(action) = self.events.next_action() {
            match self.form.handle(action, self.chooser.as_ref()) {
                Ok(Some(message)) => {
                    tracing::info!("{}", message);
                    self.status = Some(Status::Info(message));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("{:?} failed: {}", action, e);
                    self.status = Some(Status::Error(e.to_string()));
                }
            }
        }
    }

    /// Tears down on a close request. Returns whether the app has stopped,
    /// in which case nothing more is drawn or handled.
    fn handle_close(&mut self, close_requested: bool) -> bool {
        if close_requested && self.events.is_running() {
            tracing::info!("window closed, dropping {} pending action(s)", self.events.pending());
            self.events.shutdown();
            self.form.close();
        }
        !self.events.is_running()
    }

    fn toolbar(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            if ui.button("Load config").clicked() {
                actions.push(Action::LoadConfig);
            }
            if ui.button("Save config").clicked() {
                actions.push(Action::SaveConfig);
            }
            if self.form.options().pipeline_context {
                if ui.button("Choose input files").clicked() {
                    actions.push(Action::ChooseInputFiles);
                }
                if ui.button("Choose output folder").clicked() {
                    actions.push(Action::ChooseOutputFolder);
                }
            }
            if ui.button("Run").clicked() {
                actions.push(Action::Run);
            }
        });
    }
}

impl App for FormApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let close_requested = ctx.input(|i| i.viewport().close_requested());
        if self.handle_close(close_requested) {
            return;
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| match &self.status {
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            Some(Status::Error(msg)) => {
                ui.colored_label(egui::Color32::RED, msg);
            }
            None => {
                ui.weak("Ready");
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Parameters");
            ui.separator();
            egui::Grid::new("parameters")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .striped(true)
                .show(ui, |ui| {
                    for (row, bound) in self.form.rows_mut().iter_mut().enumerate() {
                        ui.label(bound.label());
                        if let Some(action) = bound.show(ui, row) {
                            actions.push(action);
                        }
                        ui.end_row();
                    }
                });

            if self.form.options().pipeline_context {
                ui.separator();
                let context = self.form.context();
                ui.label(format!("Input files: {}", context.input_files.len()));
                match &context.output_folder {
                    Some(folder) => ui.label(format!("Output folder: {}", folder.display())),
                    None => ui.weak("Output folder: (none)"),
                };
            }

            ui.separator();
            self.toolbar(ui, &mut actions);
        });

        for action in actions {
            self.post(action);
        }
        self.drain();
    }
}

/// Builds `form` if needed, applies `preload`, and runs the window until it
/// is closed.
pub fn launch(mut form: Form, preload: Option<ConfigDocument>) -> Result<(), GuifyError> {
    if form.phase() == FormPhase::Unbuilt {
        form.build()?;
    }
    let mut app = FormApp::new(form, Box::new(NativeDialogs));
    if let Some(doc) = preload {
        let report = app.form.apply_config(&doc)?;
        let summary = report.summary();
        app.status = Some(if report.is_clean() {
            Status::Info(summary)
        } else {
            Status::Error(summary)
        });
    }

    let title = app.form.title().to_string();
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 360.0])
            .with_min_inner_size([360.0, 200.0]),
        ..Default::default()
    };
    eframe::run_native(&title, options, Box::new(|_cc| Box::new(app)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogs::scripted::ScriptedChooser;
    use crate::params::{ParamSpec, Signature};
    use crate::types::{ParamKind, ParamValue};
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_app() -> (FormApp, Rc<Cell<usize>>) {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let sig = Signature::new("f")
            .param(ParamSpec::new("count").kind(ParamKind::Int).default_value(ParamValue::Int(3)));
        let mut form = Form::new(sig, move |_args| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        form.build().unwrap();
        (FormApp::new(form, Box::new(ScriptedChooser::default())), runs)
    }

    #[test]
    fn test_close_drops_pending_actions() {
        let (mut app, runs) = counting_app();
        app.post(Action::Run);
        assert_eq!(app.events.pending(), 1);

        assert!(app.handle_close(true));
        assert_eq!(app.events.pending(), 0);
        assert_eq!(app.form.phase(), FormPhase::Closed);

        app.post(Action::Run);
        app.drain();
        assert_eq!(runs.get(), 0);
        assert!(app.handle_close(false));
    }

    #[test]
    fn test_running_app_keeps_going_without_close() {
        let (mut app, runs) = counting_app();
        assert!(!app.handle_close(false));
        app.post(Action::Run);
        app.drain();
        assert_eq!(runs.get(), 1);
        assert_eq!(app.form.phase(), FormPhase::Built);
        assert!(app.status.is_some());
    }
}
