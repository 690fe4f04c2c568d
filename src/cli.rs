//! Command-line front end: serve, scan, inspect, fit-scaler.

use crate::config::ServiceConfig;
use crate::features::{extract, FeatureVector};
use crate::heuristics::OverrideRule;
use crate::logging::{ScanRecord, StructuredLogger};
use crate::model::{LabelMap, RobustScaler};
use crate::pipeline::{format_percent, PredictionResult, ServiceState};
use crate::server;
use clap::{Parser, Subcommand};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Scaled magnitudes above this usually mean the scaler was fitted on different data
const EXTREME_SCALED: f32 = 10.0;

#[derive(Debug, Parser)]
#[command(name = "url-shield", version, about = "Classify URLs as benign, malware, phishing or defacement")]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, env = "URL_SHIELD_CONFIG", default_value = "config.json", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve POST /predict over HTTP
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Classify one or more URLs
    Scan {
        #[arg(required = true)]
        urls: Vec<String>,
        /// One JSON line per URL instead of the report
        #[arg(long)]
        json: bool,
    },
    /// Print raw and scaled features for one or more URLs
    Inspect {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Fit a robust scaler on the URLs listed in a file (one per line)
    FitScaler {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Also write the default label mapping here
        #[arg(long)]
        labels: Option<PathBuf>,
    },
}

/// Scanner input convenience: bare hosts are treated as https
pub fn normalize_input(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn rule_suffix(rule: Option<OverrideRule>) -> &'static str {
    match rule {
        Some(OverrideRule::TrustedDomain) => " (Verified Trusted Domain)",
        Some(OverrideRule::LowSuspicion) => " (Low Suspicion)",
        Some(OverrideRule::LowConfidence) => " (Low Confidence)",
        None => "",
    }
}

fn write_report(out: &mut impl Write, r: &PredictionResult) -> std::io::Result<()> {
    let rule = "=".repeat(40);
    writeln!(out, "{rule}")?;
    writeln!(out, "ANALYZING: {}", r.url)?;
    writeln!(out, "{}", "-".repeat(40))?;
    writeln!(
        out,
        "DETECTION RESULT : {}{}",
        r.final_prediction,
        rule_suffix(r.override_rule)
    )?;
    writeln!(out, "CONFIDENCE SCORE : {}", format_percent(r.confidence))?;
    match r.raw_index {
        Some(i) => writeln!(out, "RAW INDEX        : {i}")?,
        None => writeln!(out, "RAW INDEX        : -")?,
    }
    for (class, pct) in r.confidences.formatted() {
        writeln!(out, "  {:<11}: {pct}", class.as_str())?;
    }
    writeln!(out, "{rule}")
}

fn scan(config: &ServiceConfig, urls: &[String], json: bool) -> CliResult<()> {
    let state = ServiceState::load(config);
    let pipeline = state.pipeline()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0usize;

    for raw in urls {
        let url = normalize_input(raw);
        let ts = chrono::Utc::now().to_rfc3339();
        match pipeline.infer(&url) {
            Ok(r) if json => {
                let record = ScanRecord {
                    ts,
                    url: &r.url,
                    final_prediction: Some(r.final_prediction.as_str()),
                    confidence: Some(r.confidence),
                    override_rule: r.override_rule.map(|o| o.as_str()),
                    confidences: Some(&r.confidences),
                    error: None,
                };
                StructuredLogger::emit_json(&record, &mut out)?;
            }
            Ok(r) => write_report(&mut out, &r)?,
            Err(e) => {
                failed += 1;
                if json {
                    let record = ScanRecord {
                        ts,
                        url: &url,
                        final_prediction: None,
                        confidence: None,
                        override_rule: None,
                        confidences: None,
                        error: Some(e.to_string()),
                    };
                    StructuredLogger::emit_json(&record, &mut out)?;
                } else {
                    writeln!(out, "ERROR {url}: {e}")?;
                }
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} URLs failed", urls.len()).into());
    }
    Ok(())
}

fn write_inspection(
    out: &mut impl Write,
    url: &str,
    raw: &FeatureVector,
    scaled: &[f32],
) -> std::io::Result<usize> {
    writeln!(out, "--- {url} ---")?;
    writeln!(out, "{:<28} {:>12} {:>12}", "feature", "raw", "scaled")?;
    let mut extreme = 0;
    for ((name, value), s) in raw.named().zip(scaled) {
        let mark = if s.abs() > EXTREME_SCALED {
            extreme += 1;
            " !"
        } else {
            ""
        };
        writeln!(out, "{name:<28} {value:>12.4} {s:>12.4}{mark}")?;
    }
    Ok(extreme)
}

fn inspect(config: &ServiceConfig, urls: &[String]) -> CliResult<()> {
    let scaler = RobustScaler::load(&config.artifacts.scaler_path())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for raw in urls {
        let url = normalize_input(raw);
        let features = extract(&url);
        let scaled = scaler.transform(&features)?;
        let extreme = write_inspection(&mut out, &url, &features, &scaled)?;
        if extreme > 0 {
            writeln!(
                out,
                "WARNING: {extreme} scaled values exceed ±{EXTREME_SCALED}; the scaler may not match this extractor"
            )?;
        }
    }
    Ok(())
}

fn fit_scaler(input: &Path, output: &Path, labels: Option<&Path>) -> CliResult<()> {
    let file = std::fs::File::open(input)?;
    let mut samples = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        samples.push(extract(url));
    }

    let scaler = RobustScaler::fit(&samples)?;
    scaler.save(output)?;
    tracing::info!(samples = samples.len(), output = %output.display(), "scaler fitted");
    println!("fitted scaler on {} URLs -> {}", samples.len(), output.display());

    if let Some(path) = labels {
        LabelMap::default().save(path)?;
        println!("label mapping -> {}", path.display());
    }
    Ok(())
}

fn serve(config: &ServiceConfig, bind: Option<String>) -> CliResult<()> {
    let state = ServiceState::load(config);
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(state, &bind))?;
    Ok(())
}

pub fn run(cli: Cli, config: &ServiceConfig) -> CliResult<()> {
    match cli.command {
        Command::Serve { bind } => serve(config, bind),
        Command::Scan { urls, json } => scan(config, &urls, json),
        Command::Inspect { urls } => inspect(config, &urls),
        Command::FitScaler {
            input,
            output,
            labels,
        } => fit_scaler(&input, &output, labels.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hosts_get_https() {
        assert_eq!(normalize_input("example.com/x"), "https://example.com/x");
        assert_eq!(normalize_input(" http://example.com "), "http://example.com");
        assert_eq!(normalize_input("https://example.com"), "https://example.com");
    }

    #[test]
    fn parses_scan_command() {
        let cli = Cli::parse_from(["url-shield", "scan", "--json", "a.com", "b.com"]);
        match cli.command {
            Command::Scan { urls, json } => {
                assert!(json);
                assert_eq!(urls, vec!["a.com", "b.com"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn inspection_marks_extreme_values() {
        let fv = extract("https://example.com");
        let mut scaled = vec![0.0f32; fv.values.len()];
        scaled[0] = 25.0;
        let mut out = Vec::new();
        let extreme = write_inspection(&mut out, "https://example.com", &fv, &scaled).unwrap();
        assert_eq!(extreme, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("url_len"));
        assert!(text.contains(" !"));
    }

    #[test]
    fn fit_scaler_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("urls.txt");
        std::fs::write(&input, "https://google.com\n\nhttp://bit.ly/x\nhttp://a.b.c.xyz/login?x=1\n").unwrap();
        let output = dir.path().join("scaler.json");
        let labels = dir.path().join("encoder.json");
        fit_scaler(&input, &output, Some(labels.as_path())).unwrap();
        assert!(RobustScaler::load(&output).is_ok());
        assert_eq!(LabelMap::load(&labels).unwrap(), LabelMap::default());
    }
}
