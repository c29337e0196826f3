use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TASK_FILE: &str = "tasks.json";
pub const CONFIG_FILE: &str = "task-cli.toml";
pub const ENV_PREFIX: &str = "TASK_CLI";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Path of the backing file holding every task.
    #[serde(default = "default_file")]
    pub file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: default_file(),
        }
    }
}

impl Config {
    /// Loads configuration from `task-cli.toml` in the working directory,
    /// overlaid with `TASK_CLI_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Like [`Config::load`] but reads the given config file, which may be absent.
    pub fn load_from(config_file: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(config_file).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Replaces the task file when one was given on the command line.
    pub fn with_file(self, file: Option<PathBuf>) -> Self {
        match file {
            Some(file) => Self { file },
            None => self,
        }
    }
}

fn default_file() -> PathBuf {
    PathBuf::from(DEFAULT_TASK_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    mod deser_tests {
        use super::*;

        #[test]
        fn test_config_deserialize_from_toml() {
            let config: Config = toml::from_str(r#"file = "/home/me/tasks.json""#).unwrap();

            assert_eq!(config.file, PathBuf::from("/home/me/tasks.json"));
        }

        #[test]
        fn test_config_defaults_file_when_absent() {
            let config: Config = toml::from_str("").unwrap();

            assert_eq!(config, Config::default());
            assert_eq!(config.file, PathBuf::from("tasks.json"));
        }
    }

    #[test]
    fn test_load_from_missing_file_uses_default() {
        let dir = TempDir::new().unwrap();

        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.file, PathBuf::from(DEFAULT_TASK_FILE));
    }

    #[test]
    fn test_load_from_reads_config_file() {
        let dir = TempDir::new().unwrap();
        let config_file = dir.child("task-cli.toml");
        config_file.write_str("file = \"work/tasks.json\"\n").unwrap();

        let config = Config::load_from(config_file.path()).unwrap();

        assert_eq!(config.file, PathBuf::from("work/tasks.json"));
    }

    #[test]
    fn test_load_from_rejects_malformed_config() {
        let dir = TempDir::new().unwrap();
        let config_file = dir.child("task-cli.toml");
        config_file.write_str("file = [").unwrap();

        assert!(Config::load_from(config_file.path()).is_err());
    }

    #[test]
    fn test_command_line_file_overrides_config() {
        let config = Config::default();

        assert_eq!(config.clone().with_file(None), config);
        assert_eq!(
            config.with_file(Some(PathBuf::from("other.json"))).file,
            PathBuf::from("other.json")
        );
    }
}
