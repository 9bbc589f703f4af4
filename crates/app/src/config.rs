use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use quiz_core::model::QuestionCount;
use serde::Deserialize;
use server::RouterOptions;
use services::ServicesConfig;
use storage::sqlite::PoolSettings;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config invalid: {0}")]
    Invalid(String),
}

/// Server settings. Every key is optional; a missing file means defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub quiz: QuizConfig,
    pub sketch: SketchConfig,
    pub static_files: StaticFilesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            body_limit_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let pool = PoolSettings::default();
        Self {
            url: "sqlite://sketchquiz.sqlite3".into(),
            max_connections: pool.max_connections,
            acquire_timeout_secs: pool.acquire_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizConfig {
    pub max_count: u32,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            max_count: services::DEFAULT_MAX_COUNT.value(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SketchConfig {
    pub output_path: PathBuf,
    /// Program and leading arguments; the image path is appended.
    pub command: Vec<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("sketch_images").join("sketch.png"),
            command: vec!["python".into(), "predict.py".into()],
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticFilesConfig {
    pub dir: PathBuf,
    pub index: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("react-app").join("dist"),
            index: "index.html".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl ServerConfig {
    /// Read the TOML file at `path`, or start from defaults when `None`.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                Self::from_toml(&content)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PORT` and `SKETCHQUIZ_DB_URL` from `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("invalid PORT value: {port}")))?;
        }
        if let Some(url) = lookup("SKETCHQUIZ_DB_URL").filter(|v| !v.trim().is_empty()) {
            self.database.url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".into(),
            ));
        }
        if self.quiz.max_count == 0 {
            return Err(ConfigError::Invalid(
                "quiz.max_count must be at least 1".into(),
            ));
        }
        if self.sketch.output_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "sketch.output_path must not be empty".into(),
            ));
        }
        if self.sketch.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "sketch.timeout_secs must be positive when set".into(),
            ));
        }
        if self.static_files.index.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "static_files.index must not be empty".into(),
            ));
        }
        if self.http.body_limit_bytes == 0 {
            return Err(ConfigError::Invalid(
                "http.body_limit_bytes must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http.host, self.http.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("invalid http bind: {e}")))
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.database.max_connections,
            acquire_timeout: Duration::from_secs(self.database.acquire_timeout_secs),
        }
    }

    pub fn services(&self) -> ServicesConfig {
        // A blank program is treated like no command at all.
        let command = if self
            .sketch
            .command
            .first()
            .is_some_and(|program| !program.trim().is_empty())
        {
            self.sketch.command.clone()
        } else {
            Vec::new()
        };

        ServicesConfig {
            database_url: self.database.url.clone(),
            pool: self.pool_settings(),
            max_quiz_count: QuestionCount::new(self.quiz.max_count),
            sketch_path: self.sketch.output_path.clone(),
            processor_command: command,
            processor_timeout: self.sketch.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            static_dir: self.static_files.dir.clone(),
            index_file: self.static_files.index.clone(),
            body_limit_bytes: self.http.body_limit_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.database.url, "sqlite://sketchquiz.sqlite3");
        assert_eq!(config.quiz.max_count, 100);
        assert_eq!(config.sketch.command, vec!["python", "predict.py"]);
        assert_eq!(config.sketch.output_path, Path::new("sketch_images/sketch.png"));
        assert_eq!(config.router_options().index_path(), Path::new("react-app/dist/index.html"));
        config.validate().unwrap();
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            [http]
            port = 9000

            [sketch]
            command = ["python3", "model/predict.py", "--quiet"]
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "0.0.0.0");

        let services = config.services();
        assert_eq!(services.processor_command.len(), 3);
        assert_eq!(services.processor_timeout, Some(Duration::from_secs(30)));
        assert_eq!(services.pool, PoolSettings::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ServerConfig::from_toml("[http]\nprot = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_port_and_database() {
        let mut config = ServerConfig::default();
        config
            .apply_env(env(&[("PORT", "3000"), ("SKETCHQUIZ_DB_URL", "sqlite://other.db")]))
            .unwrap();
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.database.url, "sqlite://other.db");
        assert_eq!(config.bind_addr().unwrap().port(), 3000);
    }

    #[test]
    fn invalid_port_env_is_rejected() {
        let mut config = ServerConfig::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn empty_command_disables_processing() {
        let mut config = ServerConfig::default();
        config.sketch.command = vec![" ".into()];
        config.validate().unwrap();
        assert!(config.services().processor_command.is_empty());

        config.sketch.command.clear();
        assert!(config.services().processor_command.is_empty());
    }

    #[test]
    fn validation_catches_unusable_values() {
        let mut config = ServerConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.sketch.output_path = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.sketch.timeout_secs = Some(0);
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.quiz.max_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("sketchquiz-{}.toml", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "[quiz]\nmax_count = 7\n").await.unwrap();

        let config = ServerConfig::load(Some(&path)).await.unwrap();
        assert_eq!(config.quiz.max_count, 7);

        let _ = tokio::fs::remove_file(&path).await;
        assert!(matches!(
            ServerConfig::load(Some(&path)).await,
            Err(ConfigError::Io(_))
        ));
    }
}
