use std::path::{Path, PathBuf};

/// Where the JSON document lives on disk.
#[derive(Debug, Clone)]
pub struct JsonFileConfig {
    /// Location of the JSON document.
    pub path: PathBuf,
}

impl JsonFileConfig {
    /// Configuration targeting `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling file the document is staged in before the atomic rename.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "store.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Directory holding the document, created on first save.
    pub fn parent(&self) -> Option<&Path> {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_a_sibling() {
        let config = JsonFileConfig::new("/var/relay/data.json");
        assert_eq!(config.temp_path(), PathBuf::from("/var/relay/data.json.tmp"));
    }

    #[test]
    fn bare_file_name_has_no_parent() {
        let config = JsonFileConfig::new("data.json");
        assert!(config.parent().is_none());
    }
}
