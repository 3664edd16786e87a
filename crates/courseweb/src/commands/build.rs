//! Site build command.

use std::path::PathBuf;

use anyhow::Result;
use courseweb_static::{BuildConfig, SiteBuilder};

/// Run the build command.
pub fn run(
    config_file: PathBuf,
    templates_dir: PathBuf,
    static_dir: PathBuf,
    output_dir: PathBuf,
) -> Result<()> {
    tracing::info!("Building course site...");

    let config = BuildConfig {
        config_file,
        templates_dir,
        static_dir,
        output_dir,
    };

    let result = SiteBuilder::new(config).build()?;

    tracing::info!(
        "Built {} pages with {} static files in {}ms",
        result.pages,
        result.assets,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
