// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};
use vision_analyzer::{Joint, PostureLine};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Analyze Options:
    --source, -s <SOURCE>          Input source (image, directory, glob or video)
    --detections, -d <FILE>        Recorded detector output (JSON)
    --line, -l <LINE>              Posture line to measure [default: forward-line]
    --joints <JOINTS>              Comma-separated joints to report [default: all]
    --conf <CONF>                  Confidence threshold, strict [default: 0.0]
    --save                         Save overlays to runs/analyze
    --export <FILE>                Write observations to a .json or .csv file
    --font <FONT>                  Label font file or cached font name [default: Arial.ttf]
    --verbose <BOOL>               Show per-frame output [default: true]
    --debug                        Also trace analysis phases

Examples:
    vision-analyzer analyze --source squat.jpg --detections squat.json
    vision-analyzer analyze -s frames/ -d frames.json --line right-knee-angle
    vision-analyzer analyze -s "frames/*.png" -d frames.json --save --export runs/frames.csv
    vision-analyzer analyze -s squat.mp4 -d squat.json --joints right_hip,right_knee,right_ankle
    vision-analyzer lines"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze posture for every frame of a source
    Analyze(AnalyzeArgs),
    /// List the available posture lines
    Lines,
}

/// Arguments for the analyze command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input source (image, directory, glob or video)
    #[arg(short, long)]
    pub source: String,

    /// Recorded detector output, one entry per frame (JSON)
    #[arg(short, long)]
    pub detections: String,

    /// Posture line to measure
    #[arg(short, long, default_value = "forward-line")]
    pub line: PostureLine,

    /// Joints to report, in order
    #[arg(long, value_delimiter = ',')]
    pub joints: Option<Vec<Joint>>,

    /// Confidence threshold; joints at or below it count as not detected
    #[arg(long, default_value_t = 0.0)]
    pub conf: f32,

    /// Save rendered overlays to runs/analyze
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Write observations to a .json or .csv file
    #[arg(long)]
    pub export: Option<String>,

    /// Label font: a font file, or a name fetched into the config directory
    #[arg(long)]
    pub font: Option<String>,

    /// Show per-frame output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,

    /// Trace analysis phases for every frame
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
