//! Desktop parameter forms built from declarative signatures.
//!
//! A [`Signature`] lists a function's parameters (name, kind, default). A
//! [`Form`] turns it into one input row per parameter, loads and saves JSON
//! configuration documents, and calls back with the collected values on
//! "Run". [`launch`] shows the form in an eframe window.

pub mod app;
pub mod config;
pub mod dialogs;
pub mod error;
pub mod event_loop;
pub mod form;
pub mod form_def;
pub mod params;
pub mod types;
pub mod widgets;

pub use app::launch;
pub use error::GuifyError;
pub use form::{Arguments, Form, FormOptions};
pub use form_def::FormDefinition;
pub use params::{ParamSpec, Signature};
pub use types::{ParamKind, ParamValue};

/// Wraps `callback` in an unbuilt form for `signature`.
pub fn guify<F>(signature: Signature, callback: F) -> Form
where
    F: FnMut(&Arguments) -> Result<(), form::CallbackError> + 'static,
{
    Form::new(signature, callback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guify_builds_declared_form() {
        let sig = Signature::new("resize")
            .param(ParamSpec::new("width").default_value(ParamValue::Int(640)))
            .param(ParamSpec::new("keep_aspect").default_value(ParamValue::Bool(true)));
        let mut form = guify(sig, |args: &Arguments| {
            assert_eq!(args.len(), 2);
            Ok(())
        });
        assert_eq!(form.phase(), crate::form::FormPhase::Unbuilt);
        form.build().unwrap();
        assert_eq!(form.rows().len(), 2);
        form.run().unwrap();
    }
}
