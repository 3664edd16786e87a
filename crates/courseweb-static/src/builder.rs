//! Course site builder.

use std::error::Error as _;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use crate::assets;
use crate::config::CourseConfig;
use crate::templates::{TemplateEngine, TemplateFile};

/// Configuration for building a course site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Course configuration file (TOML)
    pub config_file: PathBuf,

    /// Template directory
    pub templates_dir: PathBuf,

    /// Static asset directory, copied as-is
    pub static_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages rendered
    pub pages: usize,

    /// Number of static files copied
    pub assets: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to parse config: {path}: {message}")]
    ConfigFormat { path: String, message: String },

    #[error("Missing required config keys: {}", .0.join(", "))]
    MissingConfigKey(Vec<String>),

    #[error("Failed to render template: {template}: {message}")]
    TemplateRender { template: String, message: String },

    #[error("Filesystem error: {path}: {message}")]
    Filesystem { path: String, message: String },
}

/// Course site builder.
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    /// Create a new site builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Build the site.
    ///
    /// The configuration is loaded and validated before anything is written,
    /// and every template is rendered before any page is written.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let course = CourseConfig::load(&self.config.config_file)?;
        course.validate()?;

        fs::create_dir_all(&self.config.output_dir).map_err(|e| BuildError::Filesystem {
            path: self.config.output_dir.display().to_string(),
            message: e.to_string(),
        })?;

        let engine = TemplateEngine::new(&self.config.templates_dir);
        let templates = engine.discover()?;
        tracing::info!(
            "Rendering {} templates from {}",
            templates.len(),
            self.config.templates_dir.display()
        );

        let context = course.to_context();
        let rendered: Vec<(&TemplateFile, String)> = templates
            .par_iter()
            .map(|template| {
                self.render_template(&engine, template, &context)
                    .map(|html| (template, html))
            })
            .collect::<Result<_, _>>()?;

        for (template, html) in &rendered {
            self.write_page(template, html)?;
        }

        let assets = assets::copy_static(&self.config.static_dir, &self.config.output_dir)?;
        tracing::info!(
            "Copied {} static files from {}",
            assets,
            self.config.static_dir.display()
        );

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: rendered.len(),
            assets,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Render a single template against the course context.
    fn render_template(
        &self,
        engine: &TemplateEngine,
        template: &TemplateFile,
        context: &minijinja::Value,
    ) -> Result<String, BuildError> {
        tracing::debug!("Rendering {}", template.name);

        engine.render(&template.name, context).map_err(|e| {
            tracing::debug!("{}", e.display_debug_info());
            BuildError::TemplateRender {
                template: template.name.clone(),
                message: describe(&e),
            }
        })
    }

    /// Write a rendered page under the output directory.
    fn write_page(&self, template: &TemplateFile, html: &str) -> Result<(), BuildError> {
        let output_path = self.config.output_dir.join(&template.output_name);

        // Nested templates land in matching subdirectories
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::Filesystem {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }

        fs::write(&output_path, html).map_err(|e| BuildError::Filesystem {
            path: output_path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!("Wrote {}", output_path.display());
        Ok(())
    }
}

/// Error message including the causes, e.g. an error inside an included template.
fn describe(err: &minijinja::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}
