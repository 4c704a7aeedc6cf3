use async_trait::async_trait;

use super::command;
use crate::application::ports::outbound::{PackageError, PackagePort};

/// Installed packages as reported by `cmd package list packages`
pub struct CommandPackageSource {
    program: String,
}

impl CommandPackageSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

fn parse_packages(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl PackagePort for CommandPackageSource {
    async fn installed_package_names(&self) -> Result<Vec<String>, PackageError> {
        let output = command::run(&self.program, &["package", "list", "packages"])
            .await
            .map_err(|e| PackageError::Query(e.to_string()))?;

        if !output.success {
            return Err(PackageError::Query(output.stderr.trim().to_string()));
        }

        Ok(parse_packages(&output.stdout))
    }
}
