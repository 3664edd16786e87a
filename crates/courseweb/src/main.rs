//! courseweb CLI - build a course website from its configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

/// Build the course website: render the templates with the course
/// configuration and copy the static files to the output directory.
#[derive(Parser)]
#[command(name = "courseweb")]
#[command(version)]
pub struct Cli {
    /// Course configuration file (TOML)
    #[arg(value_parser = existing_file)]
    config_file: PathBuf,

    /// Directory with the Jinja templates (*.tmpl)
    #[arg(value_parser = existing_dir)]
    templates: PathBuf,

    /// Directory with static files, copied to the output directory
    #[arg(value_name = "STATIC", value_parser = existing_dir)]
    static_dir: PathBuf,

    /// Output directory, created when missing
    #[arg(value_parser = output_dir)]
    output_path: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(format!("File '{value}' does not exist."));
    }
    if !path.is_file() {
        return Err(format!("File '{value}' is a directory."));
    }
    Ok(path)
}

fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(format!("Directory '{value}' does not exist."));
    }
    if !path.is_dir() {
        return Err(format!("Directory '{value}' is a file."));
    }
    Ok(path)
}

fn output_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() && !path.is_dir() {
        return Err(format!("Directory '{value}' is a file."));
    }
    Ok(path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    commands::build::run(cli.config_file, cli.templates, cli.static_dir, cli.output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_positional_paths() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("course.toml");
        fs::write(&config, "").unwrap();
        let dir = temp.path().to_str().unwrap();
        let out = temp.path().join("site");

        let cli = Cli::try_parse_from([
            "courseweb",
            config.to_str().unwrap(),
            dir,
            dir,
            out.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(cli.config_file, config);
        assert_eq!(cli.output_path, out);
        assert!(!cli.verbose);
    }

    #[test]
    fn rejects_missing_config_file() {
        let temp = tempdir().unwrap();
        let dir = temp.path().to_str().unwrap();
        let missing = temp.path().join("missing.toml");

        let result =
            Cli::try_parse_from(["courseweb", missing.to_str().unwrap(), dir, dir, dir]);

        assert!(result.is_err());
    }

    #[test]
    fn rejects_directory_as_config_file() {
        let temp = tempdir().unwrap();

        assert!(existing_file(temp.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn rejects_file_as_template_dir() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("course.toml");
        fs::write(&file, "").unwrap();

        assert!(existing_dir(file.to_str().unwrap()).is_err());
        assert!(output_dir(file.to_str().unwrap()).is_err());
    }

    #[test]
    fn accepts_missing_output_dir() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("not/yet/there");

        assert_eq!(output_dir(out.to_str().unwrap()).unwrap(), out);
    }
}
