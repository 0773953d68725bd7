//! File dialogs used by the form's path widgets and toolbar.

use std::path::{Path, PathBuf};

/// Source of user-chosen paths. `None` means the user cancelled.
pub trait FileChooser {
    fn pick_file(&self, title: &str) -> Option<PathBuf>;
    fn pick_files(&self, title: &str) -> Option<Vec<PathBuf>>;
    fn pick_folder(&self, title: &str, start: Option<&Path>) -> Option<PathBuf>;
    fn pick_config(&self) -> Option<PathBuf>;
    fn save_config(&self) -> Option<PathBuf>;
}

/// Native dialogs backed by rfd.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDialogs;

impl FileChooser for NativeDialogs {
    fn pick_file(&self, title: &str) -> Option<PathBuf> {
        let picked = rfd::FileDialog::new().set_title(title).pick_file();
        log_choice(title, picked.as_deref());
        picked
    }

    fn pick_files(&self, title: &str) -> Option<Vec<PathBuf>> {
        let picked = rfd::FileDialog::new().set_title(title).pick_files();
        match &picked {
            Some(paths) => tracing::info!("{}: {} file(s) selected", title, paths.len()),
            None => tracing::info!("{}: cancelled", title),
        }
        picked
    }

    fn pick_folder(&self, title: &str, start: Option<&Path>) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().set_title(title);
        if let Some(dir) = start.filter(|d| d.is_dir()) {
            dialog = dialog.set_directory(dir);
        }
        let picked = dialog.pick_folder();
        log_choice(title, picked.as_deref());
        picked
    }

    fn pick_config(&self) -> Option<PathBuf> {
        let picked = rfd::FileDialog::new()
            .add_filter("JSON configuration", &["json"])
            .add_filter("All files", &["*"])
            .set_title("Load configuration")
            .pick_file();
        log_choice("Load configuration", picked.as_deref());
        picked
    }

    fn save_config(&self) -> Option<PathBuf> {
        let picked = rfd::FileDialog::new()
            .add_filter("JSON configuration", &["json"])
            .set_file_name("config.json")
            .set_title("Save configuration")
            .save_file();
        log_choice("Save configuration", picked.as_deref());
        picked
    }
}

fn log_choice(title: &str, picked: Option<&Path>) {
    match picked {
        Some(path) => tracing::info!("{}: {}", title, path.display()),
        None => tracing::info!("{}: cancelled", title),
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Answers dialogs from a queue, in order, regardless of which dialog asks.
    #[derive(Default)]
    pub struct ScriptedChooser {
        answers: RefCell<VecDeque<Option<Vec<PathBuf>>>>,
    }

    impl ScriptedChooser {
        pub fn answer(self, paths: &[&Path]) -> Self {
            self.answers
                .borrow_mut()
                .push_back(Some(paths.iter().map(|p| p.to_path_buf()).collect()));
            self
        }

        pub fn cancel(self) -> Self {
            self.answers.borrow_mut().push_back(None);
            self
        }

        fn next(&self) -> Option<Vec<PathBuf>> {
            self.answers.borrow_mut().pop_front().flatten()
        }

        fn next_one(&self) -> Option<PathBuf> {
            self.next().and_then(|paths| paths.into_iter().next())
        }
    }

    impl FileChooser for ScriptedChooser {
        fn pick_file(&self, _title: &str) -> Option<PathBuf> {
            self.next_one()
        }

        fn pick_files(&self, _title: &str) -> Option<Vec<PathBuf>> {
            self.next()
        }

        fn pick_folder(&self, _title: &str, _start: Option<&Path>) -> Option<PathBuf> {
            self.next_one()
        }

        fn pick_config(&self) -> Option<PathBuf> {
            self.next_one()
        }

        fn save_config(&self) -> Option<PathBuf> {
            self.next_one()
        }
    }
}
