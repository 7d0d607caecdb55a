//! Ingress fixture rendering
//!
//! Fixtures are Handlebars templates. The binding always carries
//! `namespace` and `ingress_name`; tests add whatever else their fixture
//! references (`domain`, `host`, ...).
//!
//! ```yaml
//! apiVersion: networking.k8s.io/v1
//! kind: Ingress
//! metadata:
//!   name: {{ingress_name}}
//!   namespace: {{namespace}}
//!   annotations:
//!     external-dns.alpha.kubernetes.io/hostname: {{domain}}
//! ```

use handlebars::Handlebars;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Error type for template rendering
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Failed to read template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template: {0}")]
    Render(String),
}

/// Variables available to a fixture template
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TemplateBinding {
    values: BTreeMap<String, String>,
}

impl TemplateBinding {
    /// Binding for an ingress in `namespace`
    pub fn new(namespace: impl Into<String>, ingress_name: impl Into<String>) -> Self {
        Self::default()
            .set("namespace", namespace)
            .set("ingress_name", ingress_name)
    }

    /// Add or replace a variable
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

fn registry() -> Handlebars<'static> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    // Manifests are YAML, not HTML
    hb.register_escape_fn(handlebars::no_escape);
    hb
}

/// Render a template string
pub fn render_str(template: &str, binding: &TemplateBinding) -> Result<String, TemplateError> {
    registry()
        .render_template(template, binding)
        .map_err(|e| TemplateError::Render(e.to_string()))
}

/// Render a template file
pub async fn render_file(
    path: impl AsRef<Path>,
    binding: &TemplateBinding,
) -> Result<String, TemplateError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    if !path.exists() {
        return Err(TemplateError::NotFound(display));
    }

    let template = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| TemplateError::Read {
            path: display,
            source,
        })?;

    render_str(&template, binding)
}
