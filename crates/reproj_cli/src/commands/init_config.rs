//! Init-config command implementation

use std::path::Path;

use anyhow::{Context, Result};
use reproj_core::config::ConfigManager;

pub fn execute(path: &Path, force: bool) -> Result<()> {
    let existed = path.exists();
    let mut manager = ConfigManager::new(path);

    if force {
        manager
            .save()
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        // Creates the file, or fills in missing settings and drops unknown sections
        manager
            .load_or_create()
            .with_context(|| format!("Failed to update {}", path.display()))?;
    }

    if existed && !force {
        println!("Checked {} and filled in any missing settings", path.display());
    } else {
        println!("Wrote default configuration to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reproj_core::config::Settings;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_loadable_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reproj.toml");

        execute(&path, false).unwrap();

        let mut manager = ConfigManager::new(&path);
        manager.load().unwrap();
        assert_eq!(manager.settings(), &Settings::default());
    }

    #[test]
    fn existing_file_is_completed_not_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reproj.toml");
        fs::write(&path, "[job]\ninput_folder = \"mine\"\n\n[legacy]\nkey = 1\n").unwrap();

        execute(&path, false).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("input_folder = \"mine\""));
        assert!(content.contains("[naming]"));
        assert!(content.contains("raster_name_limit = 8"));
        assert!(!content.contains("[legacy]"));
    }

    #[test]
    fn force_replaces_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reproj.toml");
        fs::write(&path, "[job]\ninput_folder = \"mine\"\n").unwrap();

        execute(&path, true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("mine"));
        assert!(content.contains("input_folder = \"input\""));
    }
}
