//! Subcommands of the `invparse` binary.

pub mod batch;
pub mod config;
pub mod due;
pub mod process;
pub mod reconcile;

use std::io::Read;
use std::path::Path;

use invparse_core::models::config::InvparseConfig;
use tracing::debug;

/// Load the configuration from `--config`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvparseConfig> {
    if let Some(path) = config_path {
        return Ok(InvparseConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(InvparseConfig::from_file(&default_path)?)
    } else {
        Ok(InvparseConfig::default())
    }
}

/// Read document text from a file, or from stdin when the path is `-`.
pub fn read_input(input: &Path) -> anyhow::Result<String> {
    if is_stdin(input) {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    Ok(std::fs::read_to_string(input)?)
}

pub fn is_stdin(input: &Path) -> bool {
    input.as_os_str() == "-"
}
