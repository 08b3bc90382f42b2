// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates flotilla.yml template files.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

pub fn init_config(dir: &Path, group: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(group.unwrap_or("storage"));
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(group: &str) -> String {
    format!(
        r#"group: {}
namespace: default
backend: memory
releases:
  - name: {}-minio
    chart: stable/minio
    # values: |
    #   replicas: 3
suppressed_kinds:
  - Secret
context_lines: 3
retry:
  max_attempts: 3
  backoff: 1s
"#,
        group, group
    )
}
