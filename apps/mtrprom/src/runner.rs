use std::process::Command;

use anyhow::{anyhow, Context, Result};
use mtrprom_model::Protocol;
use tracing::{debug, info};

/// Settings for one mtr invocation.
#[derive(Debug, Clone)]
pub struct MtrSettings {
    pub cycles: u32,
    pub interval_secs: u32,
    pub protocol: Protocol,
    pub port: u16,
}

impl Default for MtrSettings {
    fn default() -> Self {
        Self {
            cycles: 10,
            interval_secs: 1,
            protocol: Protocol::Icmp,
            port: 443,
        }
    }
}

/// Seam for the external diagnostic tool, so the pipeline can be exercised
/// against canned output in tests.
pub trait MtrRunner {
    /// Returns the raw report bytes for `target`, structured or textual.
    fn run(&self, target: &str, settings: &MtrSettings) -> Result<String>;
}

/// Runs the real `mtr` binary. JSON report mode (`-j`) is attempted first;
/// builds without JSON support either exit non-zero (retried with
/// `--report`) or print text anyway, which the parser re-disambiguates.
pub struct SystemMtrRunner;

impl MtrRunner for SystemMtrRunner {
    fn run(&self, target: &str, settings: &MtrSettings) -> Result<String> {
        info!(
            target,
            protocol = %settings.protocol,
            cycles = settings.cycles,
            "running mtr"
        );

        match run_mtr(target, settings, "-j") {
            Ok(raw) => Ok(raw),
            Err(err) => {
                debug!(target, %err, "json report mode failed, retrying as text");
                run_mtr(target, settings, "--report")
            }
        }
    }
}

fn run_mtr(target: &str, settings: &MtrSettings, mode_flag: &str) -> Result<String> {
    let mut cmd = Command::new("mtr");
    cmd.arg(mode_flag)
        .arg("--report-cycles")
        .arg(settings.cycles.to_string())
        .arg("--interval")
        .arg(settings.interval_secs.to_string());

    match settings.protocol {
        Protocol::Tcp => {
            cmd.arg("--tcp").arg("--port").arg(settings.port.to_string());
        }
        Protocol::Udp => {
            cmd.arg("--udp").arg("--port").arg(settings.port.to_string());
        }
        // ICMP is mtr's default and takes no port.
        Protocol::Icmp => {}
    }

    cmd.arg(target);

    let output = cmd
        .output()
        .with_context(|| format!("failed to spawn mtr for {target}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "mtr failed for {target} (status: {}): {}",
            output.status,
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
