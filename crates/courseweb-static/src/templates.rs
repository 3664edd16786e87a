//! Template discovery and rendering.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior, Value};
use walkdir::WalkDir;

use crate::builder::BuildError;

/// File extension marking a template.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// A template found under the template root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Loader name: path relative to the template root, `/`-separated
    pub name: String,

    /// Output path relative to the output directory
    pub output_name: PathBuf,
}

/// Whether a file name carries the template extension.
///
/// Only the name is checked, never the content.
pub fn is_template(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext == TEMPLATE_EXTENSION)
}

/// Strip the template extension from a template name.
///
/// Returns `None` when nothing would be left.
pub fn output_name(name: &str) -> Option<&str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if ext != TEMPLATE_EXTENSION || stem.is_empty() || stem.ends_with('/') {
        return None;
    }
    Some(stem)
}

/// Template engine using minijinja, loading templates from a directory.
pub struct TemplateEngine {
    env: Environment<'static>,
    root: PathBuf,
}

impl TemplateEngine {
    /// Create an engine rooted at the template directory.
    pub fn new(root: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(dir_loader(root.to_path_buf()));
        env.set_trim_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        Self {
            env,
            root: root.to_path_buf(),
        }
    }

    /// Find every template under the root, sorted by name.
    pub fn discover(&self) -> Result<Vec<TemplateFile>, BuildError> {
        let mut templates = Vec::new();

        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| BuildError::Filesystem {
                path: e
                    .path()
                    .unwrap_or(&self.root)
                    .display()
                    .to_string(),
                message: e.to_string(),
            })?;

            if !entry.path().is_file() {
                continue;
            }

            if !is_template(&entry.file_name().to_string_lossy()) {
                continue;
            }

            let relative = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            let name = loader_name(relative).ok_or_else(|| BuildError::TemplateRender {
                template: relative.display().to_string(),
                message: "template path is not valid UTF-8".to_string(),
            })?;

            let output = output_name(&name).ok_or_else(|| BuildError::TemplateRender {
                template: name.clone(),
                message: "template name is empty once the extension is removed".to_string(),
            })?;

            templates.push(TemplateFile {
                output_name: PathBuf::from(output),
                name,
            });
        }

        templates.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(templates)
    }

    /// Render a template by loader name.
    pub fn render(&self, name: &str, context: &Value) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(name)?;
        tmpl.render(context)
    }
}

/// Join path components with `/`, the separator the loader expects.
///
/// Returns `None` for paths that are not valid UTF-8.
fn loader_name(relative: &Path) -> Option<String> {
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Load templates by `/`-separated name from a directory.
///
/// Dot-prefixed files and directories load like any other; only names that
/// could leave the root are refused.
fn dir_loader(
    root: PathBuf,
) -> impl Fn(&str) -> Result<Option<String>, minijinja::Error> + Send + Sync + 'static {
    move |name| {
        if name.contains('\\') || name.split('/').any(|segment| segment == "..") {
            return Err(minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("template name {name:?} points outside the template directory"),
            ));
        }

        let path = name
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(root.clone(), |path, segment| path.join(segment));

        match fs::read_to_string(&path) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template {}", path.display()),
            )
            .with_source(e)),
        }
    }
}
