//! Unitgate CLI - 命令行入口
//!
//! Compiles source files through one shared gate and loader, spreading the
//! work over a pool of scoped threads. Only parsing, logging setup and
//! reporting live here.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tracing::Level;

mod config;
mod logging;

use crate::config::{level_from_config, read_project, resolve_sources, LogConfig};
use crate::logging::{init_with_file, LogFormat};
use unitgate::{
    BackendRegistry, CompileGate, Compiled, GateError, MemoryLoader, UnitManifest,
};
use unitgate_config::ProjectConfig;

type Loader = MemoryLoader<UnitManifest>;

#[derive(Parser)]
#[command(
    name = "unitgate",
    about = "Compile source units through a compile-once gate",
    version = "0.1.0"
)]
struct Cli {
    /// Source files to compile
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Project file (JSON) listing sources and defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend name (default: from project file, else "declaration")
    #[arg(long)]
    backend: Option<String>,

    /// Worker threads
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Compile every file this many times
    #[arg(long, default_value_t = 1)]
    repeat: usize,

    /// 日志级别 (-v=info, -vv=debug, -vvv=trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Extract phase log level
    #[arg(long, value_enum)]
    log_extract: Option<LogLevelArg>,

    /// Lock phase log level
    #[arg(long, value_enum)]
    log_lock: Option<LogLevelArg>,

    /// Resolve phase log level
    #[arg(long, value_enum)]
    log_resolve: Option<LogLevelArg>,

    /// Compile phase log level
    #[arg(long, value_enum)]
    log_compile: Option<LogLevelArg>,

    /// 日志输出格式
    #[arg(long, value_enum, default_value = "pretty")]
    format: LogFormatArg,

    /// 日志输出到文件
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// One compile request and its outcome
struct Outcome {
    path: PathBuf,
    result: Result<Compiled<UnitManifest>, GateError>,
}

fn main() {
    let cli = Cli::parse();

    let project = match &cli.config {
        Some(path) => match read_project(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => ProjectConfig::default(),
    };

    let log_config = build_log_config(&cli, &project);
    let format = match cli.format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    if let Err(e) = init_with_file(&log_config, format, cli.log_file.as_ref()) {
        eprintln!("Error: cannot open log file: {}", e);
        process::exit(1);
    }

    let mut paths = match &cli.config {
        Some(path) => resolve_sources(path, &project),
        None => Vec::new(),
    };
    paths.extend(cli.files.iter().cloned());
    if paths.is_empty() {
        eprintln!("Error: no source files given");
        process::exit(1);
    }

    let sources = match read_sources(&paths) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut gate_config = project.gate_config();
    if let Some(backend) = &cli.backend {
        gate_config.default_backend = backend.clone();
    }
    let registry = BackendRegistry::<Loader>::with_builtins();
    let gate = match CompileGate::from_config(&registry, &gate_config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let jobs = cli
        .jobs
        .or(project.jobs)
        .unwrap_or_else(default_jobs)
        .max(1);
    tracing::info!(
        target: "unitgate::cli",
        files = sources.len(),
        jobs,
        repeat = cli.repeat,
        backend = gate.backend_name(),
        "starting"
    );

    let loader = Loader::new();
    let outcomes = compile_all(&gate, &loader, &sources, cli.repeat, jobs);

    let mut failed = false;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(compiled) => println!(
                "{} {} members={}",
                compiled.identifier,
                compiled.origin.as_str(),
                compiled.unit.members.len()
            ),
            Err(e) => {
                failed = true;
                eprintln!("❌ {}: {}", outcome.path.display(), e);
            }
        }
    }

    if failed {
        process::exit(1);
    }
}

fn build_log_config(cli: &Cli, project: &ProjectConfig) -> LogConfig {
    // 根据 -v 次数确定全局级别
    let global = match cli.verbose {
        0 => project.log_level.map_or(Level::WARN, level_from_config),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    LogConfig {
        global,
        extract: cli.log_extract.map(to_level),
        lock: cli.log_lock.map(to_level),
        resolve: cli.log_resolve.map(to_level),
        compile: cli.log_compile.map(to_level),
    }
}

fn to_level(arg: LogLevelArg) -> Level {
    match arg {
        LogLevelArg::Off | LogLevelArg::Error => Level::ERROR,
        LogLevelArg::Warn => Level::WARN,
        LogLevelArg::Info => Level::INFO,
        LogLevelArg::Debug => Level::DEBUG,
        LogLevelArg::Trace => Level::TRACE,
    }
}

fn default_jobs() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

fn read_sources(paths: &[PathBuf]) -> Result<Vec<(PathBuf, String)>, String> {
    paths
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .map(|text| (path.clone(), text))
                .map_err(|e| format!("cannot read '{}': {}", path.display(), e))
        })
        .collect()
}

/// Compile every source `repeat` times over `jobs` threads. Outcomes come
/// back in request order.
fn compile_all(
    gate: &CompileGate<Loader>,
    loader: &Loader,
    sources: &[(PathBuf, String)],
    repeat: usize,
    jobs: usize,
) -> Vec<Outcome> {
    let total = sources.len() * repeat;
    let next = AtomicUsize::new(0);

    let next = &next;
    let mut indexed: Vec<(usize, Outcome)> = thread::scope(|s| {
        let workers: Vec<_> = (0..jobs.min(total.max(1)))
            .map(|_| {
                s.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        if index >= total {
                            break;
                        }
                        let (path, text) = &sources[index % sources.len()];
                        let result = gate.compile_traced(text, loader);
                        done.push((
                            index,
                            Outcome {
                                path: path.clone(),
                                result,
                            },
                        ));
                    }
                    done
                })
            })
            .collect();

        workers
            .into_iter()
            .flat_map(|w| match w.join() {
                Ok(done) => done,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, outcome)| outcome).collect()
}
