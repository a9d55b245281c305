use std::path::{Path, PathBuf};

use assetd_utils::DEPLOYMENT_RECORD_SUFFIX;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::{management::InstanceSpec, AssetdResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The last instance successfully launched under a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// The spec the instance was launched with.
    pub spec: InstanceSpec,

    /// When the handover completed.
    pub deployed_at: DateTime<Utc>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DeploymentRecord {
    /// Creates a record for a spec that just went live.
    pub fn new(spec: InstanceSpec) -> Self {
        Self {
            spec,
            deployed_at: Utc::now(),
        }
    }

    /// Where the record for `name` lives inside `state_dir`.
    pub fn path(state_dir: &Path, name: &str) -> PathBuf {
        state_dir.join(format!("{name}.{DEPLOYMENT_RECORD_SUFFIX}"))
    }

    /// Loads the record for `name`, if one was saved.
    pub async fn load(state_dir: &Path, name: &str) -> AssetdResult<Option<Self>> {
        let path = Self::path(state_dir, name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Saves the record, replacing any previous one for the same name.
    pub async fn save(&self, state_dir: &Path) -> AssetdResult<()> {
        fs::create_dir_all(state_dir).await?;

        let path = Self::path(state_dir, &self.spec.name);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(self)?).await?;
        fs::rename(&tmp_path, &path).await?;

        tracing::debug!("saved deployment record to {}", path.display());
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::management::{PathPair, PortPair};

    use super::*;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        assert!(DeploymentRecord::load(dir.path(), "assetd")
            .await
            .unwrap()
            .is_none());

        let record = DeploymentRecord::new(InstanceSpec {
            name: "assetd".to_string(),
            image: "assetd:1".to_string(),
            env_file: PathBuf::from("/etc/assetd/.env"),
            mount: PathPair {
                host: PathBuf::from("/srv/static"),
                container: "/app/static".to_string(),
            },
            port: PortPair {
                host: 8000,
                container: 8000,
            },
        });
        record.save(&dir.path().join("state")).await.unwrap();

        let loaded = DeploymentRecord::load(&dir.path().join("state"), "assetd")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, record);
        assert!(DeploymentRecord::path(&dir.path().join("state"), "assetd").exists());
    }
}
