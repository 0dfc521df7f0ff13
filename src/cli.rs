//! CLI definition and dispatch.

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvCandleAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{limits_from_config, log_level_from_config, risk_from_config};
use crate::domain::context::Context;
use crate::domain::engine::{Engine, StrategyEngine, VisualEngine};
use crate::domain::error::KuriError;
use crate::domain::ir::IrProgram;
use crate::domain::limits::RuntimeLimits;
use crate::domain::pipeline::{self, Compilation};
use crate::domain::side_channel::{PlotRecord, StrategyEvent};
use crate::domain::signal::{latest_signals, RiskDefaults, Signal};
use crate::domain::templates;
use crate::ports::candle_port::CandlePort;

#[derive(Parser, Debug)]
#[command(name = "kuri", about = "Sandboxed indicator scripting for OHLCV data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    Visual,
    Strategy,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report diagnostics for a script
    Check { script: PathBuf },
    /// Print editor markers for a script as JSON
    Markers { script: PathBuf },
    /// Compile a script to an IR document
    Compile {
        script: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Disable constant folding and propagation
        #[arg(long)]
        no_opt: bool,
    },
    /// Execute a script, IR document or template against candle data
    #[command(group(ArgGroup::new("program").required(true).args(["script", "ir", "template"])))]
    Run {
        script: Option<PathBuf>,
        #[arg(long)]
        ir: Option<PathBuf>,
        #[arg(long)]
        template: Option<String>,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long, value_enum, default_value_t = EngineKind::Visual)]
        engine: EngineKind,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List built-in strategy templates
    Templates {
        /// Print the source of one template
        #[arg(long)]
        show: Option<String>,
    },
}

impl Cli {
    /// Log level from the run config, if any. Errors are reported later by the
    /// command itself.
    pub fn log_level(&self) -> Option<String> {
        match &self.command {
            Command::Run {
                config: Some(path), ..
            } => FileConfigAdapter::from_file(path)
                .ok()
                .and_then(|adapter| log_level_from_config(&adapter).ok().flatten()),
            _ => None,
        }
    }
}

/// stderr subscriber; `RUST_LOG` wins over `level`, which wins over `info`.
pub fn init_tracing(level: Option<&str>) {
    let default = format!("kuri={}", level.unwrap_or("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    ExitCode::from(status(cli))
}

/// Dispatch and report; returns the process exit status.
pub fn status(cli: Cli) -> u8 {
    let result = match cli.command {
        Command::Check { script } => run_check(&script),
        Command::Markers { script } => run_markers(&script),
        Command::Compile {
            script,
            output,
            no_opt,
        } => run_compile(&script, output.as_deref(), no_opt),
        Command::Run {
            script,
            ir,
            template,
            data,
            engine,
            config,
            output,
        } => {
            let source = match (script, ir, template) {
                (Some(path), _, _) => ProgramSource::Script(path),
                (_, Some(path), _) => ProgramSource::Ir(path),
                (_, _, Some(id)) => ProgramSource::Template(id),
                _ => {
                    eprintln!("error: one of <SCRIPT>, --ir or --template is required");
                    return 2;
                }
            };
            run_program(&source, &data, engine, config.as_deref(), output.as_deref())
        }
        Command::Templates { show } => run_templates(show.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_status()
        }
    }
}

enum ProgramSource {
    Script(PathBuf),
    Ir(PathBuf),
    Template(String),
}

fn read_script(path: &Path) -> Result<String, KuriError> {
    tracing::debug!(file = %path.display(), "reading script");
    Ok(fs::read_to_string(path)?)
}

fn emit(json: &str, output: Option<&Path>) -> Result<(), KuriError> {
    match output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Compile, printing compile-time problems with source context.
fn compile_reported(source: &str, optimize: bool) -> Result<Compilation, KuriError> {
    let result = if optimize {
        pipeline::compile(source)
    } else {
        pipeline::compile_unoptimized(source)
    };
    if let Err(err) = &result {
        match err {
            KuriError::Lex(e) => eprintln!("{}", e.display_with_context(source)),
            KuriError::Parse(e) => eprintln!("{}", e.display_with_context(source)),
            KuriError::Semantic(diagnostics) => eprintln!("{}", diagnostics.render_console()),
            _ => {}
        }
    }
    result
}

fn run_check(script: &Path) -> Result<u8, KuriError> {
    let source = read_script(script)?;
    let diagnostics = pipeline::check(&source);
    if diagnostics.is_empty() {
        println!("{}: no problems found", script.display());
    } else {
        println!("{}", diagnostics.render_console());
    }

    if diagnostics.has_errors() {
        println!(
            "{}: {} error(s), {} warning(s)",
            script.display(),
            diagnostics.error_count(),
            diagnostics.warnings().count()
        );
        return Ok(KuriError::Semantic(diagnostics).exit_status());
    }
    Ok(0)
}

fn run_markers(script: &Path) -> Result<u8, KuriError> {
    let source = read_script(script)?;
    let markers = pipeline::check(&source).to_markers();
    println!("{}", serde_json::to_string_pretty(&markers)?);
    Ok(0)
}

fn run_compile(script: &Path, output: Option<&Path>, no_opt: bool) -> Result<u8, KuriError> {
    let source = read_script(script)?;
    let compilation = compile_reported(&source, !no_opt)?;
    for warning in compilation.diagnostics.warnings() {
        eprintln!("{}", warning.render());
    }
    emit(&compilation.program.to_json_pretty()?, output)?;
    Ok(0)
}

fn load_program(source: &ProgramSource) -> Result<IrProgram, KuriError> {
    match source {
        ProgramSource::Script(path) => Ok(compile_reported(&read_script(path)?, true)?.program),
        ProgramSource::Ir(path) => IrProgram::from_json(&fs::read_to_string(path)?),
        ProgramSource::Template(id) => {
            let template = templates::find(id).ok_or_else(|| KuriError::Data {
                reason: format!(
                    "unknown template '{}' (available: {})",
                    id,
                    templates::all().iter().map(|t| t.id).collect::<Vec<_>>().join(", ")
                ),
            })?;
            Ok(compile_reported(template.source, true)?.program)
        }
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    engine: &'static str,
    candles: usize,
    operations: u64,
    bindings: &'a Context,
    #[serde(skip_serializing_if = "Option::is_none")]
    plots: Option<Vec<PlotRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<StrategyEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signals: Option<Vec<Signal>>,
}

fn run_program(
    source: &ProgramSource,
    data: &Path,
    engine: EngineKind,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<u8, KuriError> {
    let (limits, risk) = match config {
        Some(path) => {
            let adapter = FileConfigAdapter::from_file(path)?;
            (limits_from_config(&adapter)?, risk_from_config(&adapter)?)
        }
        None => (RuntimeLimits::default(), RiskDefaults::default()),
    };

    let program = load_program(source)?;
    let bars = CsvCandleAdapter::new(data).load_candles()?;
    let mut context = Context::from_bars(&bars);
    tracing::info!(candles = bars.len(), statements = program.statements.len(), "starting run");

    let json = match engine {
        EngineKind::Visual => {
            let engine = VisualEngine::new(limits);
            let out = engine.run(&program, &mut context)?;
            serde_json::to_string_pretty(&RunReport {
                engine: engine.name(),
                candles: bars.len(),
                operations: out.stats.operations,
                bindings: &context,
                plots: Some(out.plots),
                events: None,
                signals: None,
            })?
        }
        EngineKind::Strategy => {
            let engine = StrategyEngine::new(limits);
            let out = engine.run(&program, &mut context)?;
            let close = context.series("close").cloned().unwrap_or_default();
            let signals = latest_signals(&out.events, &close, &risk);
            serde_json::to_string_pretty(&RunReport {
                engine: engine.name(),
                candles: bars.len(),
                operations: out.stats.operations,
                bindings: &context,
                plots: None,
                events: Some(out.events),
                signals: Some(signals),
            })?
        }
    };
    emit(&json, output)?;
    Ok(0)
}

fn run_templates(show: Option<&str>) -> Result<u8, KuriError> {
    if let Some(id) = show {
        return match templates::find(id) {
            Some(template) => {
                print!("{}", template.source);
                Ok(0)
            }
            None => Err(KuriError::Data {
                reason: format!("unknown template '{}'", id),
            }),
        };
    }
    for template in templates::all() {
        println!("{:<20} {:<20} {}", template.id, template.name, template.description);
    }
    Ok(0)
}
