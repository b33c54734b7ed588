use crate::error::{DashboardError, Result};
use handlebars::{Handlebars, handlebars_helper};
use log::{error, info};
use serde::Serialize;
use std::path::Path;

const TEMPLATE_EXTENSION: &str = ".html";

handlebars_helper!(add: |a: u64, b: u64| a + b);
handlebars_helper!(sub: |a: u64, b: u64| a.saturating_sub(b));
handlebars_helper!(html_id: |label: str| to_html_id(label));

/// Turns a label into a usable HTML id
///
/// Spaces become hyphens, anything other than letters, digits and hyphens is
/// dropped, and ids that would not start with a letter get an `id-` prefix.
pub fn to_html_id(label: &str) -> String {
    let id: String = label
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect();

    match id.chars().next() {
        Some(first) if !first.is_alphabetic() => format!("id-{}", id),
        _ => id,
    }
}

/// Registry of named view templates
///
/// Views are registered once at start-up and only read afterwards, so a
/// registry can be shared across concurrent requests.
pub struct ViewRegistry {
    handlebars: Handlebars<'static>,
}

impl ViewRegistry {
    fn engine() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_helper("add", Box::new(add));
        handlebars.register_helper("sub", Box::new(sub));
        handlebars.register_helper("html_id", Box::new(html_id));
        handlebars
    }

    /// Loads every `*.html` file below `dir`
    ///
    /// Each template is named after its path relative to `dir` without the
    /// extension, so `views/tableCell/status.html` becomes `tableCell/status`.
    ///
    /// # Arguments
    /// * `dir` - Root of the views directory
    ///
    /// # Returns
    /// * `Result<ViewRegistry>` - The registry, or an error if the directory is
    ///   missing or a template fails to parse
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(DashboardError::Config(format!(
                "views directory {} does not exist",
                dir.display()
            )));
        }

        let mut handlebars = Self::engine();
        handlebars
            .register_templates_directory(TEMPLATE_EXTENSION, dir)
            .map_err(|e| {
                error!("Failed to parse templates in {}: {}", dir.display(), e);
                e
            })?;

        let registry = ViewRegistry { handlebars };
        info!(
            "Loaded {} views from {}",
            registry.view_names().len(),
            dir.display()
        );
        Ok(registry)
    }

    /// Builds a registry from in-memory `(name, source)` pairs
    pub fn from_templates<'a>(
        templates: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        let mut handlebars = Self::engine();
        for (name, source) in templates {
            handlebars.register_template_string(name, source)?;
        }
        Ok(ViewRegistry { handlebars })
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Registered view names, sorted
    pub fn view_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlebars.get_templates().keys().cloned().collect();
        names.sort();
        names
    }

    /// Fails with `ViewNotFound` for the first name that is not registered
    pub fn require(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|name| !self.has_view(name)) {
            Some(missing) => Err(DashboardError::ViewNotFound(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Renders a named view
    ///
    /// # Arguments
    /// * `name` - Registered view name
    /// * `data` - Serializable view model
    ///
    /// # Returns
    /// * `Result<String>` - Rendered fragment, `ViewNotFound` if the view is not
    ///   registered, or `Render` if the template fails
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        if !self.has_view(name) {
            error!("View {} is not registered", name);
            return Err(DashboardError::ViewNotFound(name.to_string()));
        }
        self.handlebars.render(name, data).map_err(|source| {
            error!("Error executing view {}: {}", name, source);
            DashboardError::Render {
                view: name.to_string(),
                source,
            }
        })
    }
}
