//! Configuration module
//!
//! Loads the demo dev server's configuration from a TOML file plus
//! `RESPIPE_`-prefixed environment variables, with defaults for every
//! setting. Targets declared here are the purely data-driven subset;
//! targets with transform stages are built in code via [`Target`]'s
//! builder API.

use regex::Regex;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::middleware::MiddlewareConfig;
use crate::target::{Target, UrlMatcher};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub middleware: MiddlewareSection,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MiddlewareSection {
    pub root: String,
    pub index_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
}

/// One declaratively configured target.
#[derive(Debug, Deserialize, Clone)]
pub struct TargetSpec {
    /// Exact path, or a regular expression when `regex` is set.
    pub url: String,
    #[serde(default)]
    pub regex: bool,
    pub files: Option<Vec<String>>,
    pub mime_type: Option<String>,
    #[serde(default)]
    pub cache: bool,
}

impl TargetSpec {
    /// Build the runtime target this spec describes.
    pub fn build(&self) -> Result<Target, regex::Error> {
        let matcher = if self.regex {
            UrlMatcher::Pattern(Regex::new(&self.url)?)
        } else {
            UrlMatcher::Exact(self.url.clone())
        };

        let mut target = Target::new(matcher);
        if let Some(files) = &self.files {
            target = target.files(files.clone());
        }
        if let Some(mime_type) = &self.mime_type {
            target = target.mime_type(mime_type.clone());
        }
        Ok(target.cache(self.cache))
    }
}

impl Config {
    /// Load configuration from `respipe.toml` in the working directory.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("respipe")
    }

    /// Load configuration from the specified file path (without extension).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("RESPIPE"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("middleware.root", ".")?
            .set_default("middleware.index_file", "index.html")?
            .set_default("logging.access_log", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub fn middleware_config(&self) -> MiddlewareConfig {
        MiddlewareConfig {
            root: PathBuf::from(&self.middleware.root),
            index_file: self.middleware.index_file.clone(),
        }
    }
}
