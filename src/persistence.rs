use std::{
    fs,
    io::{BufWriter, Write},
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

use crate::proxy::{
    error::{ProxyError, persistence_error},
    facade::FacadeSnapshot,
};

const SNAPSHOT_VERSION: u64 = 1;

#[derive(Debug, Clone)]
pub struct FacadePersistence {
    path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedFacade {
    version: u64,
    facade: FacadeSnapshot,
}

impl FacadePersistence {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// `<path>.tmp`, next to the snapshot so the final rename stays on one
    /// filesystem.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    pub fn load(&self) -> Result<Option<FacadeSnapshot>, ProxyError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(persistence_error(format!(
                    "failed to read facade snapshot '{}': {err}",
                    self.path.display()
                )));
            }
        };

        let parsed: PersistedFacade = serde_json::from_str(&content).map_err(|err| {
            persistence_error(format!(
                "failed to parse facade snapshot '{}': {err}",
                self.path.display()
            ))
        })?;
        if parsed.version != SNAPSHOT_VERSION {
            return Err(persistence_error(format!(
                "unsupported facade snapshot version {} at '{}'",
                parsed.version,
                self.path.display()
            )));
        }

        Ok(Some(parsed.facade))
    }

    pub fn save(&self, snapshot: &FacadeSnapshot) -> Result<(), ProxyError> {
        let parent = self.path.parent().ok_or_else(|| {
            persistence_error(format!(
                "facade snapshot path '{}' has no parent",
                self.path.display()
            ))
        })?;
        fs::create_dir_all(parent).map_err(|err| {
            persistence_error(format!(
                "failed to create snapshot directory '{}': {err}",
                parent.display()
            ))
        })?;

        let persisted = PersistedFacade {
            version: SNAPSHOT_VERSION,
            facade: snapshot.clone(),
        };

        let tmp_path = self.temp_path();
        let file = fs::File::create(&tmp_path).map_err(|err| {
            persistence_error(format!(
                "failed to create snapshot temp file '{}': {err}",
                tmp_path.display()
            ))
        })?;
        {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &persisted).map_err(|err| {
                persistence_error(format!(
                    "failed to serialize facade snapshot '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.write_all(b"\n").map_err(|err| {
                persistence_error(format!(
                    "failed to finalize facade snapshot '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.flush().map_err(|err| {
                persistence_error(format!(
                    "failed to flush facade snapshot '{}': {err}",
                    tmp_path.display()
                ))
            })?;
        }

        let tmp_file = fs::OpenOptions::new()
            .read(true)
            .open(&tmp_path)
            .map_err(|err| {
                persistence_error(format!(
                    "failed to reopen snapshot temp file '{}': {err}",
                    tmp_path.display()
                ))
            })?;
        tmp_file.sync_all().map_err(|err| {
            persistence_error(format!(
                "failed to sync snapshot temp file '{}': {err}",
                tmp_path.display()
            ))
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|err| {
            persistence_error(format!(
                "failed to replace facade snapshot '{}' from '{}': {err}",
                self.path.display(),
                tmp_path.display()
            ))
        })?;

        if let Ok(parent_file) = fs::File::open(parent) {
            let _ = parent_file.sync_all();
        }

        Ok(())
    }
}
