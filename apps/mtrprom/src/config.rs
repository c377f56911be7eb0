use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use mtrprom_model::Protocol;
use serde::Deserialize;

/// Batch-mode configuration file:
///
/// ```yaml
/// global:
///   output_dir: /var/lib/node_exporter/textfile
///   mtr_cycles: 10
/// probes:
///   - name: cloudflare_dns
///     target: 1.1.1.1
///     port: 53
///     protocol: udp
///     labels:
///       service: dns
/// ```
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub probes: Vec<ProbeConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub output_dir: String,
    pub mtr_cycles: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_dir: "./output".to_string(),
            mtr_cycles: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProbeConfig {
    pub name: String,
    pub target: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: Protocol,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

fn default_port() -> u16 {
    443
}

fn default_protocol() -> Protocol {
    Protocol::Icmp
}

pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path:?}"))?;
    let config: ConfigFile = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {path:?}"))?;

    if config.probes.is_empty() {
        return Err(anyhow!("no probes defined in {path:?}"));
    }

    Ok(config)
}
