use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, error};

use crate::domain::FlightInventory;

use super::format::{format_inventory, parse_inventory};

/// Reads and writes the flight inventory file.
#[derive(Debug, Clone)]
pub struct FlightStore {
    path: PathBuf,
}

impl FlightStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the inventory. A missing file is logged and loads as empty.
    pub async fn load(&self) -> Result<FlightInventory> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!(path = %self.path.display(), "Flights file not found");
                return Ok(FlightInventory::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read flights file: {}", self.path.display())
                });
            }
        };

        let inventory = parse_inventory(&content);
        debug!(
            path = %self.path.display(),
            flights = inventory.len(),
            "Loaded flight inventory"
        );
        Ok(inventory)
    }

    /// Overwrite the inventory file with `inventory`.
    pub async fn save(&self, inventory: &FlightInventory) -> Result<()> {
        fs::write(&self.path, format_inventory(inventory))
            .await
            .with_context(|| format!("Failed to save flights file: {}", self.path.display()))?;
        debug!(
            path = %self.path.display(),
            flights = inventory.len(),
            "Saved flight inventory"
        );
        Ok(())
    }
}
