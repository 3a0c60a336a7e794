//! Static design-data tables.
//!
//! Loaded once at startup from a JSON file and lookup-only afterwards. The
//! command framework consults these tables for per-item quantity caps; no
//! other behavior lives here.

use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// One material row: id, display key, and the per-item give cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRow {
    pub id: u32,
    pub name: String,
    pub quantity_limit: u64,
}

/// One avatar-fragment row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentRow {
    pub id: u32,
    pub avatar_id: u32,
    pub quantity_limit: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DataFile {
    #[serde(default)]
    materials: Vec<MaterialRow>,
    #[serde(default)]
    fragments: Vec<FragmentRow>,
}

/// Indexed design-data tables.
#[derive(Debug, Default)]
pub struct GameData {
    materials: HashMap<u32, MaterialRow>,
    fragments: HashMap<u32, FragmentRow>,
}

impl GameData {
    /// Loads the tables from a JSON file, creating a seed file when absent.
    ///
    /// A missing file is not fatal at first run; an unreadable or malformed
    /// file is, since the server cannot give items it has no caps for.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            let seed = Self::seed_file();
            let json = serde_json::to_string_pretty(&seed)
                .map_err(|e| ServerError::Config(format!("serialize seed game data: {e}")))?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ServerError::Config(format!("create data dir: {e}")))?;
            }
            std::fs::write(path, json)
                .map_err(|e| ServerError::Config(format!("write seed game data: {e}")))?;
            info!("📄 Wrote seed game data to {}", path.display());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("read game data {}: {e}", path.display())))?;
        let file: DataFile = serde_json::from_str(&raw)
            .map_err(|e| ServerError::Config(format!("parse game data {}: {e}", path.display())))?;
        Ok(Self::from_rows(file.materials, file.fragments))
    }

    pub fn from_rows(materials: Vec<MaterialRow>, fragments: Vec<FragmentRow>) -> Self {
        Self {
            materials: materials.into_iter().map(|m| (m.id, m)).collect(),
            fragments: fragments.into_iter().map(|f| (f.id, f)).collect(),
        }
    }

    pub fn material(&self, id: u32) -> Option<&MaterialRow> {
        self.materials.get(&id)
    }

    pub fn fragment(&self, id: u32) -> Option<&FragmentRow> {
        self.fragments.get(&id)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    fn seed_file() -> DataFile {
        DataFile {
            materials: vec![
                MaterialRow {
                    id: 100,
                    name: "Coin".into(),
                    quantity_limit: 9_999,
                },
                MaterialRow {
                    id: 201,
                    name: "Crystal".into(),
                    quantity_limit: 9_999,
                },
                MaterialRow {
                    id: 3401,
                    name: "TwinSoulFragment".into(),
                    quantity_limit: 500,
                },
            ],
            fragments: vec![FragmentRow {
                id: 501,
                avatar_id: 101,
                quantity_limit: 999,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_creates_seed_and_reads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gamedata.json");
        let data = GameData::load(&path).expect("load");
        assert!(path.exists());
        assert!(data.material(100).is_some());
        // Second load reads the persisted file.
        let again = GameData::load(&path).expect("reload");
        assert_eq!(again.material_count(), data.material_count());
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gamedata.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(GameData::load(&path).is_err());
    }
}
