use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use linecount_rs::{
    AssignerConfig, CountingPipeline, DirectorySnapshotSink, Error, Line, PipelineConfig,
    ReplaySource, RunSummary,
};

/// Exit status for setup failures (missing or unreadable input).
const SETUP_FAILURE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "linecount",
    about = "Count vehicles crossing a line in recorded tracker output"
)]
struct Args {
    /// Detections recording (JSON lines, one frame per line)
    #[arg(long, visible_alias = "input", value_name = "PATH")]
    source: Option<PathBuf>,
    /// Counting line as x1,y1,x2,y2; defaults to the horizontal mid-line
    #[arg(long, value_name = "X1,Y1,X2,Y2")]
    line: Option<Line>,
    /// Detections scoring below this are dropped
    #[arg(long, default_value_t = 0.15)]
    conf: f32,
    /// Also write the JSON summary to this file
    #[arg(long, value_name = "PATH")]
    meta: Option<PathBuf>,
    /// Accepted for compatibility and ignored
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
    /// Directory for annotated snapshots of counted vehicles
    #[arg(long, value_name = "DIR")]
    frames_dir: Option<PathBuf>,
    /// Frame width, when the recording has no header
    #[arg(long, requires = "height")]
    width: Option<u32>,
    /// Frame height, when the recording has no header
    #[arg(long, requires = "width")]
    height: Option<u32>,
    /// Assign track ids to detections recorded without one
    #[arg(long)]
    assign_ids: bool,
    /// Frames an unmatched track survives when assigning ids
    #[arg(long, default_value_t = 30)]
    max_age: u64,
    /// Minimum IoU to continue a track when assigning ids
    #[arg(long, default_value_t = 0.3)]
    match_iou: f32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linecount_rs=info,linecount=info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(summary) => match serde_json::to_string(&summary) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("{}", json!({ "error": format!("{e:#}") }));
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            println!("{}", json!({ "error": format!("{e:#}") }));
            ExitCode::from(SETUP_FAILURE)
        }
    }
}

fn run(args: Args) -> Result<RunSummary> {
    let source_path = args.source.ok_or(Error::MissingSource)?;
    if args.out.is_some() {
        info!("--out is ignored");
    }

    // Snapshots are optional; an unusable directory only disables them.
    let snapshots = args
        .frames_dir
        .as_ref()
        .and_then(|dir| match DirectorySnapshotSink::new(dir) {
            Ok(sink) => Some(sink),
            Err(e) => {
                warn!(
                    error = %e,
                    dir = %dir.display(),
                    "could not create frames directory, snapshots disabled"
                );
                None
            }
        });

    let source = ReplaySource::open(&source_path)?.with_conf_threshold(args.conf);

    let line = args.line.or_else(|| {
        args.width
            .zip(args.height)
            .map(|(w, h)| Line::horizontal_midline(w, h))
    });
    let config = PipelineConfig {
        line,
        assign_ids: args.assign_ids.then(|| AssignerConfig {
            match_iou: args.match_iou,
            max_age: args.max_age,
        }),
        source_label: Some(source_path.display().to_string()),
    };

    let mut pipeline = CountingPipeline::new(source, config);
    if let Some(sink) = snapshots {
        pipeline = pipeline.with_snapshots(sink);
    }
    let summary = pipeline.run();

    if let Some(meta) = &args.meta {
        let written = serde_json::to_string(&summary)
            .map_err(anyhow::Error::from)
            .and_then(|text| fs::write(meta, text).map_err(anyhow::Error::from));
        if let Err(e) = written {
            warn!(error = %e, path = %meta.display(), "could not write metadata file");
        }
    }

    Ok(summary)
}
