use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use nads_central_store::{connect_and_migrate, BackendTarget};
use std::process::ExitCode;

pub async fn execute(config: &AppConfig) -> CliResult<ExitCode> {
    let url = match &config.backend {
        BackendTarget::Sqlite { url } => url,
        BackendTarget::Rest { .. } => {
            return Err(CliError::InvalidConfig(
                "the hosted backend manages its own schema; migrations apply to SQL databases only"
                    .to_string(),
            ))
        }
        BackendTarget::Memory => {
            return Err(CliError::InvalidConfig(
                "the in-memory backend has no schema to migrate".to_string(),
            ))
        }
    };

    println!("🔧 Applying migrations to {}", url);
    connect_and_migrate(url).await?;
    println!("✅ Schema is up to date");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nads_central_store::sqlite_url;

    #[tokio::test]
    async fn test_migrates_sqlite_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            backend: BackendTarget::Sqlite {
                url: sqlite_url(dir.path().join("members.db")).unwrap(),
            },
            ..Default::default()
        };

        execute(&config).await.unwrap();
        // Running again is a no-op
        execute(&config).await.unwrap();
        assert!(dir.path().join("members.db").exists());
    }

    #[tokio::test]
    async fn test_rejects_non_sql_backends() {
        let config = AppConfig {
            backend: BackendTarget::Memory,
            ..Default::default()
        };
        assert!(matches!(
            execute(&config).await,
            Err(CliError::InvalidConfig(_))
        ));
    }
}
