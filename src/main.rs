//! # Favicon 生成工具 — 命令行入口
//!
//! 本文件只负责参数解析、日志初始化与进度展示。
//! 生成逻辑全部在库中，详见 `lib.rs` 架构文档。

use std::convert::Infallible;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use favicon_generator::clipboard;
use favicon_generator::error::AppError;
use favicon_generator::favicon::{
    BackgroundColor, FaviconError, FaviconService, GenerationReport, ProgressEvent, ResampleProfile, Session,
};
use favicon_generator::settings::Settings;
use serde::Serialize;

const USAGE: &str = "\
Generate all favicon sizes from a single image.

USAGE:
    favicon-generator [OPTIONS] <SOURCE>

ARGS:
    <SOURCE>                  Source image (PNG, JPG, WebP, BMP)

OPTIONS:
    -o, --output <DIR>        Output folder (default: folder of SOURCE);
                              files are written to <DIR>/favicons
    -b, --background <COLOR>  Background for transparent pixels, #RRGGBB (default: #FFFFFF)
    -p, --profile <PROFILE>   Resampling profile: quality | balanced | speed (default: quality)
    -s, --settings <FILE>     JSON settings file
        --copy-html           Copy the HTML snippet to the clipboard
        --json                Print a JSON summary instead of progress lines
    -q, --quiet               Do not print progress
    -h, --help                Print help
    -V, --version             Print version
";

struct CliArgs {
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    background: Option<String>,
    profile: Option<String>,
    settings: Option<PathBuf>,
    copy_html: bool,
    json: bool,
    quiet: bool,
}

enum Command {
    Help,
    Version,
    Generate(CliArgs),
}

fn parse_path(value: &OsStr) -> Result<PathBuf, Infallible> {
    Ok(PathBuf::from(value))
}

fn parse_args() -> Result<Command, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        return Ok(Command::Help);
    }
    if pargs.contains(["-V", "--version"]) {
        return Ok(Command::Version);
    }

    let args = CliArgs {
        output: pargs.opt_value_from_os_str(["-o", "--output"], parse_path)?,
        background: pargs.opt_value_from_str(["-b", "--background"])?,
        profile: pargs.opt_value_from_str(["-p", "--profile"])?,
        settings: pargs.opt_value_from_os_str(["-s", "--settings"], parse_path)?,
        copy_html: pargs.contains("--copy-html"),
        json: pargs.contains("--json"),
        quiet: pargs.contains(["-q", "--quiet"]),
        source: pargs.opt_free_from_os_str(parse_path)?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected arguments: {:?}", remaining),
        });
    }

    Ok(Command::Generate(args))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CliSummary<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<&'a Path>,
    files: Vec<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a AppError>,
}

impl<'a> CliSummary<'a> {
    fn success(report: &'a GenerationReport) -> Self {
        Self {
            status: "ok",
            output_dir: Some(&report.output_dir),
            files: report.written_files.iter().map(PathBuf::as_path).collect(),
            html: Some(&report.html_snippet),
            error: None,
        }
    }

    fn failure(error: &'a AppError) -> Self {
        Self {
            status: if error.is_warning() { "warning" } else { "error" },
            output_dir: None,
            files: Vec::new(),
            html: None,
            error: Some(error),
        }
    }

    fn print(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => println!("{}", json),
            Err(err) => log::error!("序列化结果失败: {}", err),
        }
    }
}

fn build_service_and_session(args: &CliArgs) -> Result<(FaviconService, Session), AppError> {
    let settings = match &args.settings {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::default(),
    };

    let mut config = settings.to_config()?;
    if let Some(profile) = &args.profile {
        config.apply_resample_profile(ResampleProfile::from_str(profile)?);
    }
    let service = FaviconService::with_config(config)?;

    let mut session = Session::new();
    let background = match &args.background {
        Some(value) => value.parse::<BackgroundColor>()?,
        None => settings.background()?,
    };
    session.set_background(background);
    if let Some(output) = &args.output {
        session.set_output_dir(output.clone());
    }
    if let Some(source) = &args.source {
        let loaded = session.load_image(source, &service.config_snapshot()?)?;
        if !args.quiet && !args.json {
            eprintln!("{}", loaded.describe());
        }
    }

    Ok((service, session))
}

async fn run(args: &CliArgs) -> Result<GenerationReport, AppError> {
    let (service, session) = build_service_and_session(args)?;
    let request = session.build_request()?;

    let mut handle = service.start(request)?;
    let show_progress = !args.quiet && !args.json;

    while let Some(event) = handle.events.recv().await {
        match &event {
            ProgressEvent::Step { percent, message, .. } if show_progress => {
                eprintln!("[{:>3.0}%] {}", percent, message);
            }
            ProgressEvent::Failed { .. } if show_progress => {
                eprintln!("{}", event.status_text());
            }
            _ => {}
        }
    }

    let report = tokio::task::spawn_blocking(move || handle.join())
        .await
        .map_err(|e| FaviconError::Worker(e.to_string()))??;

    Ok(report)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(Command::Help) => {
            print!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("favicon-generator {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Ok(Command::Generate(args)) => args,
        Err(err) => {
            eprintln!("{}\n\n{}", AppError::Usage(err.to_string()), USAGE);
            return ExitCode::from(2);
        }
    };

    match run(&args).await {
        Ok(report) => {
            if args.json {
                CliSummary::success(&report).print();
            } else {
                if !args.quiet {
                    eprintln!("\nAll favicons generated!\n\n{}\n", report.output_dir.display());
                }
                println!("{}", report.html_snippet);
            }

            if args.copy_html {
                match clipboard::copy_text(&report.html_snippet) {
                    Ok(()) if !args.json => eprintln!("✓ Copied to clipboard!"),
                    Ok(()) => {}
                    Err(err) => eprintln!("{}", err),
                }
            }

            ExitCode::SUCCESS
        }
        Err(err) => {
            if args.json {
                CliSummary::failure(&err).print();
            } else {
                eprintln!("{}", err);
            }

            if err.is_warning() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
