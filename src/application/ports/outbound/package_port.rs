use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("Package query failed: {0}")]
    Query(String),
}

#[async_trait]
pub trait PackagePort: Send + Sync {
    /// Package names currently installed on the device
    async fn installed_package_names(&self) -> Result<Vec<String>, PackageError>;
}
