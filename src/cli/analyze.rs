// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::{Path, PathBuf};
use std::process;

use vision_analyzer::io::{OverlayWriter, find_next_run_dir};
use vision_analyzer::logging::{Verbosity, set_verbose, set_verbosity};
use vision_analyzer::posture::{Anchor, AngleTransform};
use vision_analyzer::results::export_records;
use vision_analyzer::{
    AnalyzerConfig, FrameRecord, PostureAnalyzer, PostureLine, RenderConfig, ReplayDetector,
    Result, SkeletonRenderer, Source, SourceIterator, VERSION,
};
use vision_analyzer::{error, section, success, verbose, warn};

use crate::cli::args::AnalyzeArgs;

/// Run posture analysis over every frame of a source.
pub fn run_analysis(args: &AnalyzeArgs) {
    if args.debug {
        set_verbosity(Verbosity::Debug);
    } else {
        set_verbose(args.verbose);
    }
    if let Err(e) = analyze(args) {
        error!("{e}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn analyze(args: &AnalyzeArgs) -> Result<()> {
    let mut config = AnalyzerConfig::new().with_confidence(args.conf);
    if let Some(joints) = &args.joints {
        config = config.with_joints(joints.clone());
    }
    let analyzer = PostureAnalyzer::new(config);
    let mut detector = ReplayDetector::from_path(Path::new(&args.detections))?;

    let source = Source::from(args.source.as_str());
    let is_video = source.is_video();
    #[cfg(not(feature = "video"))]
    if is_video {
        warn!(
            "Video source detected but 'video' feature is not enabled. Please compile with '--features video'"
        );
        process::exit(1);
    }

    let renderer = if args.save {
        build_renderer(args.font.as_deref())
    } else {
        SkeletonRenderer::new(RenderConfig::default())
    };
    let mut writer = args
        .save
        .then(|| OverlayWriter::new(find_next_run_dir(Path::new("runs"), "analyze")));

    println!("Vision Analyzer {VERSION} 🚀 {} on {}", args.line, args.source);
    verbose!(
        "{} joints, confidence > {}, {} recorded frames",
        analyzer.config().joints.len(),
        args.conf,
        detector.remaining()
    );
    verbose!("");

    // Decode on a separate thread, analyze in order on this one
    let (sender, receiver) = std::sync::mpsc::sync_channel(4);
    let frames = SourceIterator::new(source)?;
    std::thread::spawn(move || {
        for item in frames {
            if sender.send(item).is_err() {
                break;
            }
        }
    });

    let mut records = Vec::new();
    let mut measured = 0usize;
    for item in receiver {
        let (image, meta) = match item {
            Ok(val) => val,
            Err(e) => {
                error!("Error reading source: {e}");
                break;
            }
        };

        let observations = analyzer.analyze(&image, &mut detector);
        let angle = if observations.is_empty() {
            None
        } else {
            Some(analyzer.measure_angle(&observations, args.line))
        };

        let total = meta
            .total_frames
            .map_or_else(|| "?".to_string(), |n| n.to_string());
        let kind = if is_video { "video frame" } else { "image" };
        let detected = observations.iter().filter(|o| o.is_detected()).count();
        match angle {
            Some(angle) => {
                measured += 1;
                let note = if args.line.is_measurable(&observations) {
                    ""
                } else {
                    " (incomplete)"
                };
                verbose!(
                    "{kind} {}/{total} {}: {}x{} {detected}/{} joints, {} {angle:.1}°{note}",
                    meta.frame_idx + 1,
                    meta.path,
                    image.width(),
                    image.height(),
                    observations.len(),
                    args.line,
                );
            }
            None => verbose!(
                "{kind} {}/{total} {}: no detections",
                meta.frame_idx + 1,
                meta.path
            ),
        }

        if let Some(writer) = &mut writer {
            match renderer.render(&image, &observations, angle) {
                Ok(rendered) => {
                    if let Err(e) = writer.save(&meta, &rendered) {
                        error!("Failed to save result: {e}");
                    }
                }
                Err(e) => error!("Failed to render {}: {e}", meta.path),
            }
        }

        records.push(FrameRecord::new(meta.frame_idx, meta.path, &observations, angle));
    }

    section!("Summary");
    verbose!("{measured}/{} frames measured", records.len());

    if let Some(writer) = writer {
        let dir = writer.save_dir().to_path_buf();
        let saved = writer.saved();
        writer.finish()?;
        verbose!("{saved} overlays saved to {}", dir.display());
    }

    if let Some(export) = &args.export {
        let path = PathBuf::from(export);
        export_records(&path, &records)?;
        success!("Observations exported to {}", path.display());
    }

    Ok(())
}

#[cfg(feature = "annotate")]
fn build_renderer(font: Option<&str>) -> SkeletonRenderer {
    use vision_analyzer::render::{DEFAULT_FONT, cached_font, load_font};

    let name = font.unwrap_or(DEFAULT_FONT);
    let path = Path::new(name);
    let loaded = if path.is_file() {
        load_font(path)
    } else {
        cached_font(name).and_then(|cached| load_font(&cached))
    };

    let renderer = SkeletonRenderer::new(RenderConfig::default());
    match loaded {
        Ok(font) => renderer.with_font(font),
        Err(e) => {
            warn!("Angle labels disabled: {e}");
            renderer
        }
    }
}

#[cfg(not(feature = "annotate"))]
fn build_renderer(font: Option<&str>) -> SkeletonRenderer {
    if font.is_some() {
        warn!("--font requires the 'annotate' feature. Angle labels disabled.");
    }
    SkeletonRenderer::new(RenderConfig::default())
}

/// Print every posture line with its definition.
pub fn list_lines() {
    section!("Posture lines");
    println!(
        "{:<18} {:<20} {:<13} {:<13} transform",
        "line", "start", "vertex", "end"
    );
    for line in PostureLine::ALL {
        let def = line.definition();
        let start = match def.start {
            Anchor::Joint(joint) => joint.to_string(),
            Anchor::Vertical(joint) => format!("({joint}.x, 0)"),
        };
        let transform = match def.transform {
            AngleTransform::Plain => "plain",
            AngleTransform::Minus180 => "minus 180",
            AngleTransform::Negated => "negated",
        };
        println!(
            "{:<18} {:<20} {:<13} {:<13} {transform}",
            line.name(),
            start,
            def.vertex.to_string(),
            def.end.to_string()
        );
    }
}
