use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Command-line flags; each one overrides the matching config file value.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "logged-users-exporter",
    about = "Exports logged-in users and per-process container attribution"
)]
pub struct Cli {
    /// Config file (defaults to $CONFIG_FILE, then ./config.toml if present)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// Port number to start the server on
    #[arg(short = 'p', long)]
    pub port: Option<u16>,
    /// InfluxDB token
    #[arg(short = 't', long)]
    pub token: Option<String>,
    /// InfluxDB URL
    #[arg(short = 'u', long)]
    pub url: Option<String>,
    /// InfluxDB organization
    #[arg(short = 'o', long)]
    pub org: Option<String>,
    /// InfluxDB bucket
    #[arg(short = 'b', long)]
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub push: Option<PushConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    /// Upper bound for each raw sample command.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    /// Upper bound for each container name lookup.
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    /// Cgroup/container lookups in flight per dataset.
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: default_command_timeout_ms(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
            proc_root: default_proc_root(),
        }
    }
}

fn default_command_timeout_ms() -> u64 {
    10_000
}

fn default_lookup_timeout_ms() -> u64 {
    2_000
}

fn default_max_concurrent_lookups() -> usize {
    8
}

fn default_proc_root() -> PathBuf {
    PathBuf::from("/proc")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "default_push_interval_secs")]
    pub interval_secs: u64,
    /// Upper bound for one write request.
    #[serde(default = "default_push_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_push_interval_secs() -> u64 {
    5
}

fn default_push_timeout_ms() -> u64 {
    10_000
}

impl AppConfig {
    /// Loads the config file named by `--config`, `$CONFIG_FILE` or
    /// `./config.toml`, then applies CLI overrides. A missing default file
    /// means built-in defaults; an explicitly named file must exist.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let explicit = cli
            .config
            .clone()
            .or_else(|| std::env::var_os("CONFIG_FILE").map(PathBuf::from));
        let s = match explicit {
            Some(path) => std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?,
            None => match std::fs::read_to_string(DEFAULT_CONFIG_FILE) {
                Ok(s) => s,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
                Err(e) => return Err(anyhow::anyhow!("reading {}: {}", DEFAULT_CONFIG_FILE, e)),
            },
        };
        Self::load_with_overrides(&s, cli)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        Self::load_with_overrides(s, &Cli::default())
    }

    pub fn load_with_overrides(s: &str, cli: &Cli) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(s)?;
        config.apply(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        let any_push_flag =
            cli.url.is_some() || cli.token.is_some() || cli.org.is_some() || cli.bucket.is_some();
        if any_push_flag {
            let push = self.push.get_or_insert_with(|| PushConfig {
                interval_secs: default_push_interval_secs(),
                timeout_ms: default_push_timeout_ms(),
                ..Default::default()
            });
            if let Some(url) = &cli.url {
                push.url = url.clone();
            }
            if let Some(token) = &cli.token {
                push.token = token.clone();
            }
            if let Some(org) = &cli.org {
                push.org = org.clone();
            }
            if let Some(bucket) = &cli.bucket {
                push.bucket = bucket.clone();
            }
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.collection.command_timeout_ms > 0,
            "collection.command_timeout_ms must be > 0, got {}",
            self.collection.command_timeout_ms
        );
        anyhow::ensure!(
            self.collection.lookup_timeout_ms > 0,
            "collection.lookup_timeout_ms must be > 0, got {}",
            self.collection.lookup_timeout_ms
        );
        anyhow::ensure!(
            self.collection.max_concurrent_lookups > 0,
            "collection.max_concurrent_lookups must be > 0, got {}",
            self.collection.max_concurrent_lookups
        );
        if let Some(push) = &self.push {
            anyhow::ensure!(!push.url.is_empty(), "push.url must be non-empty");
            anyhow::ensure!(!push.token.is_empty(), "push.token must be non-empty");
            anyhow::ensure!(!push.org.is_empty(), "push.org must be non-empty");
            anyhow::ensure!(!push.bucket.is_empty(), "push.bucket must be non-empty");
            anyhow::ensure!(
                push.interval_secs > 0,
                "push.interval_secs must be > 0, got {}",
                push.interval_secs
            );
            anyhow::ensure!(
                push.timeout_ms > 0,
                "push.timeout_ms must be > 0, got {}",
                push.timeout_ms
            );
        }
        Ok(())
    }
}
