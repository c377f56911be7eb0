use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use mtrprom_model::{PathReport, Protocol};
use mtrprom_render::{render_report, validate_exposition, write_atomic};
use mtrprom_report::{parse_report, summarize};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod runner;

use config::load_config;
use runner::{MtrRunner, MtrSettings, SystemMtrRunner};

#[derive(Parser)]
#[command(name = "mtrprom", version, about = "MTR path-quality exporter for the Prometheus textfile collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single probe and write its metrics file.
    Probe(ProbeArgs),
    /// Run every probe from a config file and write one combined file.
    Batch(BatchArgs),
}

#[derive(Args)]
struct ProbeArgs {
    /// Target hostname or IP address.
    target: String,

    #[arg(short, long, default_value_t = 443)]
    port: u16,

    #[arg(short, long, default_value_t = 10)]
    cycles: u32,

    /// Seconds between probe rounds.
    #[arg(short, long, default_value_t = 1)]
    interval: u32,

    #[arg(long, default_value = "icmp")]
    protocol: Protocol,

    #[arg(long, default_value = "default")]
    probe_name: String,

    /// Custom label in key=value form; repeatable.
    #[arg(long = "label")]
    labels: Vec<String>,

    #[arg(short, long, default_value = "mtr_metrics.prom")]
    out: PathBuf,
}

#[derive(Args)]
struct BatchArgs {
    #[arg(long)]
    config: PathBuf,

    /// Override the config file's output directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe(args) => run_probe_mode(args),
        Commands::Batch(args) => run_batch_mode(args),
    }
}

fn run_probe_mode(args: ProbeArgs) -> Result<()> {
    let labels = parse_labels(&args.labels)?;
    let settings = MtrSettings {
        cycles: args.cycles,
        interval_secs: args.interval,
        protocol: args.protocol,
        port: args.port,
    };

    let metrics = probe_metrics(
        &SystemMtrRunner,
        &args.probe_name,
        &args.target,
        labels,
        &settings,
    )?;

    validate_exposition(&metrics)?;
    write_atomic(&args.out, &metrics)?;
    info!(out = ?args.out, "wrote probe metrics");
    Ok(())
}

fn run_batch_mode(args: BatchArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.global.output_dir));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory {output_dir:?}"))?;

    let mut blocks: Vec<String> = Vec::new();

    // Probes are independent: one failure is logged and its contribution
    // dropped, the rest still make it into the combined file.
    for probe in &config.probes {
        let settings = MtrSettings {
            cycles: config.global.mtr_cycles,
            interval_secs: 1,
            protocol: probe.protocol,
            port: probe.port,
        };

        match probe_metrics(
            &SystemMtrRunner,
            &probe.name,
            &probe.target,
            probe.labels.clone(),
            &settings,
        ) {
            Ok(metrics) => blocks.push(metrics),
            Err(err) => warn!(probe = %probe.name, "probe failed: {err:#}"),
        }
    }

    if blocks.is_empty() {
        return Err(anyhow!("no successful probe results"));
    }

    let combined = blocks.join("\n");
    validate_exposition(&combined)?;

    let output_file = output_dir.join("mtr_all_probes.prom");
    write_atomic(&output_file, &combined)?;
    info!(out = ?output_file, probes = blocks.len(), "wrote combined metrics");
    Ok(())
}

/// One probe's full pipeline: run the tool, decode, score, render.
fn probe_metrics(
    runner: &dyn MtrRunner,
    probe_name: &str,
    target: &str,
    labels: BTreeMap<String, String>,
    settings: &MtrSettings,
) -> Result<String> {
    let raw = runner.run(target, settings)?;
    let parsed = parse_report(&raw)
        .with_context(|| format!("failed to decode mtr report for {target}"))?;

    let report = PathReport {
        target: target.to_string(),
        protocol: settings.protocol,
        port: settings.port,
        probe: probe_name.to_string(),
        labels,
        hops: parsed.hops,
    };

    let summary = summarize(&report.hops);
    if let Some(summary) = &summary {
        info!(
            probe = probe_name,
            target,
            status = %summary.health_status,
            score = summary.health_score,
            hops = summary.hop_count,
            responding = summary.responding_hop_count,
            "path health"
        );
    }

    Ok(render_report(&report, summary.as_ref()))
}

fn parse_labels(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut labels = BTreeMap::new();
    for item in raw {
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid label {item:?}, expected key=value"))?;
        labels.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedRunner(&'static str);

    impl MtrRunner for CannedRunner {
        fn run(&self, _target: &str, _settings: &MtrSettings) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingRunner;

    impl MtrRunner for FailingRunner {
        fn run(&self, target: &str, _settings: &MtrSettings) -> Result<String> {
            Err(anyhow!("mtr unavailable for {target}"))
        }
    }

    const TEXT_REPORT: &str = "\
Start: 2024-05-14T09:12:01+0000
HOST: probe-host        Loss%   Snt   Last   Avg  Best  Wrst StDev
  1.|-- _gateway         0.0%    10    1.6   1.6   1.6   1.8   0.1
  2.|-- 1.1.1.1          0.0%    10   15.0  15.1  14.7  15.9   0.3
";

    #[test]
    fn probe_pipeline_renders_valid_metrics() {
        let metrics = probe_metrics(
            &CannedRunner(TEXT_REPORT),
            "dns",
            "1.1.1.1",
            BTreeMap::new(),
            &MtrSettings::default(),
        )
        .unwrap();

        assert!(validate_exposition(&metrics).is_ok());
        assert!(metrics.contains("mtr_hop_count{target=\"1.1.1.1\",probe=\"dns\"} 2"));
        assert!(metrics.contains("mtr_path_health_score{target=\"1.1.1.1\",probe=\"dns\"}"));
    }

    #[test]
    fn probe_pipeline_is_deterministic() {
        let run = || {
            probe_metrics(
                &CannedRunner(TEXT_REPORT),
                "dns",
                "1.1.1.1",
                BTreeMap::from([("env".to_string(), "prod".to_string())]),
                &MtrSettings::default(),
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn runner_failure_surfaces_as_error() {
        let result = probe_metrics(
            &FailingRunner,
            "dns",
            "1.1.1.1",
            BTreeMap::new(),
            &MtrSettings::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn unparseable_output_is_no_hops() {
        let result = probe_metrics(
            &CannedRunner("mtr: unknown flag\n"),
            "dns",
            "1.1.1.1",
            BTreeMap::new(),
            &MtrSettings::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn parse_labels_accepts_key_value_pairs() {
        let labels =
            parse_labels(&["service=dns".to_string(), "env = prod".to_string()]).unwrap();
        assert_eq!(labels["service"], "dns");
        assert_eq!(labels["env"], "prod");
        assert!(parse_labels(&["oops".to_string()]).is_err());
    }
}
