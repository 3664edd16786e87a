//! Static site builder for course websites.
//!
//! Renders a directory of Jinja templates against a course configuration and
//! copies the static assets next to the rendered pages.

pub mod assets;
pub mod builder;
pub mod config;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, SiteBuilder};
pub use config::{CourseConfig, REQUIRED_KEYS};
pub use templates::{TemplateEngine, TemplateFile, TEMPLATE_EXTENSION};
