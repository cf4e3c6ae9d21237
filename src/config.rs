use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::match_dataset::SeasonManifest;
use crate::team_stats::DEFAULT_TOP_N;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const PLOTS_SUBDIR: &str = "plots";
const MAX_TOP_N: usize = 50;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub top_n: usize,
    pub render_charts: bool,
    pub manifest: SeasonManifest,
}

impl Default for RunConfig {
    fn default() -> Self {
        let output_dir = PathBuf::from(DEFAULT_OUTPUT_DIR);
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            plots_dir: output_dir.join(PLOTS_SUBDIR),
            output_dir,
            top_n: DEFAULT_TOP_N,
            render_charts: true,
            manifest: SeasonManifest::default(),
        }
    }
}

impl RunConfig {
    /// Process args first, then `EPL_*` environment variables, then defaults.
    pub fn from_env_and_args() -> Result<Self> {
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::resolve(&args, |key| std::env::var(key).ok())
    }

    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let opt_env = |key: &str| {
            env(key).and_then(|val| {
                let trimmed = val.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let mut cfg = RunConfig::default();

        if let Some(dir) = arg_value(args, "--data").or_else(|| opt_env("EPL_DATA_DIR")) {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = arg_value(args, "--out").or_else(|| opt_env("EPL_OUTPUT_DIR")) {
            cfg.output_dir = PathBuf::from(dir);
        }
        cfg.plots_dir = arg_value(args, "--plots")
            .or_else(|| opt_env("EPL_PLOTS_DIR"))
            .map(PathBuf::from)
            .unwrap_or_else(|| cfg.output_dir.join(PLOTS_SUBDIR));

        if let Some(raw) = arg_value(args, "--top").or_else(|| opt_env("EPL_TOP_N")) {
            let n = raw
                .parse::<usize>()
                .with_context(|| format!("invalid top-n value {raw:?}"))?;
            cfg.top_n = n.clamp(1, MAX_TOP_N);
        }

        if has_flag(args, "--no-charts") {
            cfg.render_charts = false;
        } else if let Some(raw) = opt_env("EPL_RENDER_CHARTS") {
            cfg.render_charts = parse_bool(&raw)
                .with_context(|| format!("invalid EPL_RENDER_CHARTS value {raw:?}"))?;
        }

        if let Some(raw) = arg_value(args, "--seasons").or_else(|| opt_env("EPL_SEASONS")) {
            cfg.manifest = SeasonManifest::parse(&raw).context("invalid season manifest")?;
        }

        Ok(cfg)
    }
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(val) = arg.strip_prefix(&prefix) {
            let trimmed = val.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
