use std::net::Ipv4Addr;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use sparhund_capture::PcapFileSource;
use sparhund_config::{AnalysisConfig, ConfigError};
use sparhund_core::{MacAddr, Protocol, RangeComparison, TcpFlags};
use sparhund_engine::Analyzer;
use sparhund_telemetry::{EventLogger, MetricsRecorder};

#[derive(Parser)]
#[command(name = "sparhund", version, about)]
pub struct Cli {
    /// Configuration file (YAML, or JSON by extension)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides telemetry.log_level; RUST_LOG still wins
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an offline capture file and print the security report
    Analyze(AnalyzeArgs),
    /// Print the effective configuration as YAML
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Capture file (pcap)
    pub capture: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Run the detectors on the blocking thread pool
    #[arg(long)]
    pub concurrent: bool,

    /// Print Prometheus metrics to stderr after the report
    #[arg(long)]
    pub metrics: bool,
}

/// Per-run overrides of the `filters` configuration section.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub source_ip: Option<Ipv4Addr>,
    #[arg(long)]
    pub dest_port: Option<u16>,
    #[arg(long)]
    pub mac: Option<MacAddr>,
    #[arg(long)]
    pub range_start: Option<Ipv4Addr>,
    #[arg(long)]
    pub range_end: Option<Ipv4Addr>,
    #[arg(long, value_enum)]
    pub comparison: Option<ComparisonArg>,
    #[arg(long, value_enum)]
    pub protocol: Option<ProtocolArg>,
    #[arg(long)]
    pub max_payload: Option<usize>,
    /// TCP flag mask, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_tcp_flags)]
    pub tcp_flags: Option<TcpFlags>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ComparisonArg {
    Numeric,
    Lexicographic,
}

impl From<ComparisonArg> for RangeComparison {
    fn from(arg: ComparisonArg) -> Self {
        match arg {
            ComparisonArg::Numeric => RangeComparison::Numeric,
            ComparisonArg::Lexicographic => RangeComparison::Lexicographic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProtocolArg {
    Ethernet,
    Dot11,
    Dot11Beacon,
    Arp,
    Ipv4,
    Tcp,
    Udp,
    Icmp,
    Dns,
}

impl From<ProtocolArg> for Protocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Ethernet => Protocol::Ethernet,
            ProtocolArg::Dot11 => Protocol::Dot11,
            ProtocolArg::Dot11Beacon => Protocol::Dot11Beacon,
            ProtocolArg::Arp => Protocol::Arp,
            ProtocolArg::Ipv4 => Protocol::Ipv4,
            ProtocolArg::Tcp => Protocol::Tcp,
            ProtocolArg::Udp => Protocol::Udp,
            ProtocolArg::Icmp => Protocol::Icmp,
            ProtocolArg::Dns => Protocol::Dns,
        }
    }
}

fn parse_tcp_flags(value: &str) -> Result<TcpFlags, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse::<u8>(),
    };
    parsed
        .map(TcpFlags)
        .map_err(|e| format!("invalid TCP flag mask '{value}': {e}"))
}

impl FilterArgs {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        let filters = &mut config.filters;
        if let Some(ip) = self.source_ip {
            filters.source_ip = ip;
        }
        if let Some(port) = self.dest_port {
            filters.destination_port = port;
        }
        if let Some(mac) = self.mac {
            filters.mac_address = mac;
        }
        if let Some(start) = self.range_start {
            filters.ip_range.start = start;
            filters.network = None;
        }
        if let Some(end) = self.range_end {
            filters.ip_range.end = end;
            filters.network = None;
        }
        if let Some(comparison) = self.comparison {
            filters.ip_range.comparison = comparison.into();
        }
        if let Some(protocol) = self.protocol {
            filters.protocol = protocol.into();
        }
        if let Some(max) = self.max_payload {
            filters.max_payload_size = max;
        }
        if let Some(flags) = self.tcp_flags {
            filters.tcp_flags = flags;
        }
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = AnalysisConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.telemetry.log_level = level;
    }

    match cli.command {
        Commands::Analyze(args) => {
            args.filters.apply(&mut config);
            config.validate().map_err(ConfigError::from)?;
            EventLogger::init(&config.telemetry.log_level, config.telemetry.json)?;
            run_analyze(args, &config).await
        }
        Commands::Config => {
            config.validate().map_err(ConfigError::from)?;
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

async fn run_analyze(args: AnalyzeArgs, config: &AnalysisConfig) -> anyhow::Result<()> {
    let metrics = MetricsRecorder::new()?;
    let analyzer = Analyzer::from_config(config)?.with_metrics(metrics.clone());
    let source = PcapFileSource::new(&args.capture);

    info!(capture = %args.capture.display(), concurrent = args.concurrent, "Starting analysis");
    let report = if args.concurrent {
        analyzer.analyze_source_concurrent(source).await
    } else {
        analyzer.analyze_source(source)
    }
    .with_context(|| format!("failed to analyze {}", args.capture.display()))?;

    println!("{}", render(&report, args.format)?);
    if args.metrics {
        eprint!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| anyhow!(e)),
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| anyhow!(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_tcp_flag_parsing() {
        assert_eq!(parse_tcp_flags("0x12").unwrap(), TcpFlags(0x12));
        assert_eq!(parse_tcp_flags("2").unwrap(), TcpFlags::SYN);
        assert!(parse_tcp_flags("0x100").is_err());
        assert!(parse_tcp_flags("syn").is_err());
    }

    #[test]
    fn test_analyze_overrides() {
        let cli = parse(&[
            "sparhund",
            "analyze",
            "capture.pcap",
            "--source-ip",
            "10.0.0.7",
            "--dest-port",
            "443",
            "--mac",
            "aa:bb:cc:dd:ee:ff",
            "--range-start",
            "10.0.0.1",
            "--range-end",
            "10.0.0.9",
            "--comparison",
            "lexicographic",
            "--protocol",
            "udp",
            "--tcp-flags",
            "0x10",
            "--format",
            "yaml",
            "--concurrent",
        ]);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.format, OutputFormat::Yaml);
        assert!(args.concurrent);
        assert!(!args.metrics);

        let mut config = AnalysisConfig::default();
        args.filters.apply(&mut config);
        let filters = &config.filters;
        assert_eq!(filters.source_ip, Ipv4Addr::new(10, 0, 0, 7));
        assert_eq!(filters.destination_port, 443);
        assert_eq!(filters.mac_address.to_string(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(filters.ip_range.start, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(filters.ip_range.comparison, RangeComparison::Lexicographic);
        assert_eq!(filters.protocol, Protocol::Udp);
        assert_eq!(filters.tcp_flags, TcpFlags::ACK);
        assert_eq!(filters.max_payload_size, 1024);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = AnalysisConfig::default();
        FilterArgs::default().apply(&mut config);
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = parse(&["sparhund", "config", "--config", "sparhund.yaml"]);
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.config, Some(PathBuf::from("sparhund.yaml")));
    }

    #[test]
    fn test_render_formats() {
        let config = AnalysisConfig::default();
        let json = render(&config, OutputFormat::Json).unwrap();
        assert!(json.contains("\"destination_port\": 80"));
        let yaml = render(&config, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("destination_port: 80"));
    }
}
