use crate::error::{TrainingError, TrainingErrorExt};
use campus_kernel::prelude::Translator;
use minijinja::{Environment, Value, path_loader};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// HTML templates loaded from the catalog's templates directory.
///
/// Templates translate with `{{ _("msgid") }}` and see the page language as `lang`.
pub(crate) struct Renderer {
    env: Environment<'static>,
    translator: Translator,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    pub(crate) fn new(directory: &Path, translator: Translator) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(directory));
        Self { env, translator }
    }

    /// Renders `<name>.html` in `lang`.
    ///
    /// # Errors
    /// [`TrainingError::Render`] for a missing or failing template.
    pub(crate) fn render<S: Serialize>(&self, name: &str, lang: &str, ctx: S) -> Result<String, TrainingError> {
        let file = format!("{name}.html");
        let template = self.env.get_template(&file).context(file.clone())?;

        let translator = self.translator.clone();
        let language = lang.to_owned();
        let gettext = Value::from_function(move |msgid: String| -> String {
            translator.gettext(&language, &msgid).to_owned()
        });

        let serde_json::Value::Object(fields) = serde_json::to_value(&ctx).context("Template context")? else {
            return Err(TrainingError::Internal { message: "context is not a map".into(), context: Some(file.into()) });
        };
        let globals: Value = fields
            .into_iter()
            .map(|(key, value)| (key, Value::from_serialize(value)))
            .chain([("lang".to_owned(), Value::from(lang)), ("_".to_owned(), gettext)])
            .collect();

        template.render(globals).context(file)
    }
}
