// src/bin/govtune.rs
//
// Thin CLI harness around the tuner's two entry points, wired to the
// deterministic mock engine. Real engines plug in through the
// BacktestEngine trait at the library level.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use govtune::config::{DataSource, EvalConfig, Mode, TrainConfig};
use govtune::engine::MockBacktestEngine;
use govtune::rl::{evaluate, train};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeArg {
    Basic,
    Extreme,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Basic => Mode::Basic,
            ModeArg::Extreme => Mode::Extreme,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "govtune",
    about = "RL-based governance threshold tuner",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Train a policy against the mock backtest engine.
    Train {
        /// Experiment name; keys the checkpoint path.
        #[arg(long, default_value = "default")]
        experiment: String,

        /// Number of training episodes.
        #[arg(long, default_value_t = 100)]
        episodes: usize,

        /// Steps per episode.
        #[arg(long, default_value_t = 10)]
        steps: usize,

        /// Agent RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Backtest data source (mock or finmind).
        #[arg(long, default_value = "mock", value_parser = parse_source)]
        source: DataSource,

        /// Initial governance mode.
        #[arg(long, value_enum, default_value_t = ModeArg::Basic)]
        mode: ModeArg,

        /// Root directory for checkpoints.
        #[arg(long, default_value = "models/govtune")]
        models_dir: PathBuf,

        /// Optional path for the JSON training summary.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Evaluate a saved policy deterministically.
    Eval {
        /// Experiment name (for logs).
        #[arg(long, default_value = "default")]
        experiment: String,

        /// Policy checkpoint to load.
        #[arg(long)]
        policy: PathBuf,

        /// Backtest data source (mock or finmind).
        #[arg(long, default_value = "mock", value_parser = parse_source)]
        source: DataSource,

        /// Number of evaluation episodes.
        #[arg(long, default_value_t = 5)]
        episodes: usize,

        /// Steps per episode.
        #[arg(long, default_value_t = 10)]
        steps: usize,

        /// Engine seed (mock engine).
        #[arg(long, default_value_t = 0)]
        engine_seed: u64,

        /// Optional path for the JSON evaluation summary.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_source(s: &str) -> Result<DataSource, String> {
    DataSource::parse(s).ok_or_else(|| format!("unknown data source: {s}"))
}

fn write_summary<T: serde::Serialize>(out: Option<&PathBuf>, summary: &T) -> anyhow::Result<()> {
    let Some(path) = out else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let payload = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, payload).with_context(|| format!("writing {}", path.display()))?;
    println!("govtune: wrote {}", path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Train {
            experiment,
            episodes,
            steps,
            seed,
            source,
            mode,
            models_dir,
            out,
        } => {
            let config = TrainConfig {
                experiment_name: experiment,
                data_source: source,
                mode: mode.into(),
                episodes,
                max_steps_per_episode: steps,
                seed,
                models_dir,
                ..TrainConfig::default()
            };

            let mut engine = MockBacktestEngine::new(seed);
            let result = train(&config, &mut engine).context("training failed")?;
            write_summary(out.as_ref(), &result)?;
        }
        Command::Eval {
            experiment,
            policy,
            source,
            episodes,
            steps,
            engine_seed,
            out,
        } => {
            let config = EvalConfig {
                experiment_name: experiment,
                data_source: source,
                eval_episodes: episodes,
                max_steps_per_episode: steps,
                policy_path: policy,
                ..EvalConfig::default()
            };

            let mut engine = MockBacktestEngine::new(engine_seed);
            let result = evaluate(&config, &mut engine).context("evaluation failed")?;
            write_summary(out.as_ref(), &result)?;
        }
    }

    Ok(())
}
