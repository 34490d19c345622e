use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use cg_graph::value::Value;

use crate::StoreError;

/// The extension of config documents, appended on save when missing.
pub const CONFIG_EXTENSION: &str = "yml";

/// Appends `.yml` unless `path` already ends with it.
///
/// ```
/// use std::path::Path;
/// use cg_store::with_config_extension;
///
/// assert_eq!(with_config_extension(Path::new("runs/agent")), Path::new("runs/agent.yml"));
/// assert_eq!(with_config_extension(Path::new("agent.yml")), Path::new("agent.yml"));
/// assert_eq!(with_config_extension(Path::new("agent.v2")), Path::new("agent.v2.yml"));
/// ```
pub fn with_config_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == CONFIG_EXTENSION) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(CONFIG_EXTENSION);
    PathBuf::from(name)
}

// -----------------------------------------------------------------------------
// DocumentStore

/// Persists config documents.
///
/// No transactions: the last write to a path wins.
pub trait DocumentStore {
    /// Reads the document at `path` as given.
    fn load(&self, path: &Path) -> Result<Value, StoreError>;

    /// Writes `document`, returning the path actually written.
    fn save(&self, document: &Value, path: &Path) -> Result<PathBuf, StoreError>;
}

// -----------------------------------------------------------------------------
// YamlStore

/// Block-style YAML files, keys in document order.
#[derive(Clone, Copy, Debug, Default)]
pub struct YamlStore;

impl DocumentStore for YamlStore {
    fn load(&self, path: &Path) -> Result<Value, StoreError> {
        let file = File::open(path).map_err(StoreError::io(path))?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(StoreError::yaml(path))
    }

    fn save(&self, document: &Value, path: &Path) -> Result<PathBuf, StoreError> {
        let path = with_config_extension(path);
        let file = File::create(&path).map_err(StoreError::io(&path))?;

        let mut writer = BufWriter::new(file);
        serde_yaml::to_writer(&mut writer, document).map_err(StoreError::yaml(&path))?;
        writer.flush().map_err(StoreError::io(&path))?;

        log::debug!("wrote config document `{}`", path.display());
        Ok(path)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::fs;

    use cg_graph::value::{Mapping, Value};

    use super::{DocumentStore, YamlStore};
    use crate::StoreError;

    #[test]
    fn keys_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = Mapping::default();
        map.insert("zeta".into(), Value::Int(1));
        map.insert("alpha".into(), Value::Seq(vec![Value::Float(0.5), Value::Null]));
        map.insert("mid".into(), Value::from("cuda:0"));

        let path = YamlStore.save(&Value::Map(map.clone()), &dir.path().join("doc")).unwrap();
        assert_eq!(path.file_name().unwrap(), "doc.yml");

        let text = fs::read_to_string(&path).unwrap();
        let zeta = text.find("zeta").unwrap();
        let alpha = text.find("alpha").unwrap();
        assert!(zeta < alpha);

        assert_eq!(YamlStore.load(&path).unwrap(), Value::Map(map));
    }

    #[test]
    fn last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.yml");
        YamlStore.save(&Value::Int(1), &path).unwrap();
        YamlStore.save(&Value::Int(2), &path).unwrap();
        assert_eq!(YamlStore.load(&path).unwrap(), Value::Int(2));
    }

    #[test]
    fn failures_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yml");
        assert!(matches!(YamlStore.load(&missing), Err(StoreError::Io { path, .. }) if path == missing));

        let broken = dir.path().join("broken.yml");
        fs::write(&broken, "a: [1, 2\n").unwrap();
        assert!(matches!(YamlStore.load(&broken), Err(StoreError::Yaml { .. })));
    }
}
