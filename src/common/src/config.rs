use crate::MinibaseError;
use std::fs;
use std::path::Path;

/// What a scan does with a row that does not match its relation's types.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRowPolicy {
    /// Log the row and continue with the next one.
    Skip,
    /// Abort the evaluation with a data format error.
    Fail,
}

impl Default for MalformedRowPolicy {
    fn default() -> Self {
        MalformedRowPolicy::Skip
    }
}

/// Engine settings shared by the database loader and the planner.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub on_malformed_row: MalformedRowPolicy,
    /// Schema file name inside the database directory.
    pub schema_file: String,
    /// Directory inside the database directory holding the relation files.
    pub data_dir: String,
    pub data_extension: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            on_malformed_row: MalformedRowPolicy::default(),
            schema_file: String::from("schema.txt"),
            data_dir: String::from("files"),
            data_extension: String::from("csv"),
        }
    }
}

impl EngineConfig {
    /// Reads a JSON config file. Missing keys keep their defaults.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the JSON file.
    pub fn from_file(path: &Path) -> Result<Self, MinibaseError> {
        let contents = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&contents)?;
        debug!("Loaded engine config {:?} from {:?}", config, path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() -> Result<(), MinibaseError> {
        let config: EngineConfig = serde_json::from_str(r#"{"on_malformed_row": "fail"}"#)?;
        assert_eq!(MalformedRowPolicy::Fail, config.on_malformed_row);
        assert_eq!("schema.txt", config.schema_file);
        assert_eq!("files", config.data_dir);
        assert_eq!("csv", config.data_extension);
        Ok(())
    }

    #[test]
    fn test_bad_json_is_configuration_error() {
        let err = serde_json::from_str::<EngineConfig>(r#"{"on_malformed_row": "explode"}"#)
            .map_err(MinibaseError::from);
        assert!(matches!(err, Err(MinibaseError::ConfigurationError(_))));
    }

    #[test]
    fn test_missing_file() {
        let res = EngineConfig::from_file(Path::new("/nonexistent/minibase/config.json"));
        assert!(matches!(res, Err(MinibaseError::IOError(_))));
    }
}
