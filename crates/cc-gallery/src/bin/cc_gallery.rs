use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use cc_core::{ColorMatchConfig, Frame, LineClassifier, Rgb8};
use cc_trace::{
    CellCounter, CounterConfig, FrameError, FrameSink, FrameSource, FrameStats, Orientation,
    WalkConfig, annotate,
};
use clap::Parser;
use image::RgbImage;
use log::{info, warn};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "cc_gallery")]
#[command(about = "Count closed cells drawn as line art across a frame sequence")]
struct Cli {
    /// Directory holding the frame files.
    #[arg(long)]
    input: PathBuf,
    /// Frame file name pattern; `{}` is replaced by the frame number.
    #[arg(long, default_value = "frame ({}).gif")]
    pattern: String,
    /// Number of the first frame.
    #[arg(long, default_value_t = 1)]
    start: usize,
    /// How many frames to process.
    #[arg(long)]
    count: usize,
    /// Directory for annotated copies; omitted = no annotation output.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Annotated file name pattern.
    #[arg(long, default_value = "frame ({}) counted.png")]
    out_pattern: String,
    /// Where to write the JSON report.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Record a zero count for unreadable frames instead of aborting.
    #[arg(long, default_value_t = false)]
    skip_bad_frames: bool,

    /// Primary boundary color as `R,G,B`.
    #[arg(long, value_parser = parse_rgb, default_value = "255,127,127")]
    line_color: Rgb8,
    /// Secondary boundary color as `R,G,B`.
    #[arg(long, value_parser = parse_rgb, default_value = "127,0,0")]
    line_color_alt: Rgb8,
    #[arg(long, default_value_t = 15)]
    channel_tolerance: u8,
    #[arg(long, default_value_t = 20)]
    total_tolerance: u16,
    #[arg(long, default_value_t = 40.0)]
    initial_average_size: f32,
    #[arg(long, default_value_t = 0.8)]
    closure_fraction: f32,
    #[arg(long, default_value_t = 1.0)]
    revisit_multiplier: f32,
    /// Walk counter-clockwise instead of the default clockwise.
    #[arg(long, default_value_t = false)]
    counter_clockwise: bool,
    /// Per-walk step budget; defaults to twice the frame area.
    #[arg(long)]
    step_budget: Option<usize>,
}

#[derive(Debug, Serialize)]
struct FrameReport {
    index: usize,
    cells: usize,
    walks: usize,
    dead_ends: usize,
    junction_aborts: usize,
    junction_pixels: usize,
    budget_exhausted: usize,
    visited_pixels: usize,
    skipped: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    counts: Vec<usize>,
    frames: Vec<FrameReport>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = counter_config(&cli);
    let marker = config.marker;
    let mut counter = CellCounter::new(config);

    let mut source = DirSource {
        dir: cli.input.clone(),
        pattern: cli.pattern.clone(),
        start: cli.start,
        count: cli.count,
    };
    let mut sink = match &cli.out {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
            Some(DirSink {
                dir: dir.clone(),
                pattern: cli.out_pattern.clone(),
                start: cli.start,
            })
        }
        None => None,
    };

    let mut report = Report {
        counts: Vec::with_capacity(cli.count),
        frames: Vec::with_capacity(cli.count),
    };

    for index in 0..source.frame_count() {
        let loaded = source.load_frame(index);
        let frame = match loaded {
            Ok(frame) => frame,
            Err(err) => {
                if !cli.skip_bad_frames {
                    return Err(anyhow!("frame {}: {err}", cli.start + index));
                }
                warn!("skipping frame {}: {err}", cli.start + index);
                report.counts.push(0);
                report.frames.push(skipped_frame(index));
                continue;
            }
        };

        let stats = match counter.count_frame(&frame) {
            Ok(stats) => stats,
            Err(err) => {
                if !cli.skip_bad_frames {
                    return Err(anyhow!("frame {}: {err}", cli.start + index));
                }
                warn!("skipping frame {}: {err}", cli.start + index);
                report.counts.push(0);
                report.frames.push(skipped_frame(index));
                continue;
            }
        };

        info!(
            "frame {}: {} cells ({} walks, {} dead ends, avg size {:.1})",
            cli.start + index,
            stats.cells,
            stats.walks,
            stats.dead_ends,
            counter.average_size()
        );
        if stats.budget_exhausted > 0 {
            warn!(
                "frame {}: {} walk(s) hit the step budget",
                cli.start + index,
                stats.budget_exhausted
            );
        }

        if let Some(sink) = sink.as_mut() {
            let visited = counter.last_visited().expect("mask stored after counting");
            let annotated = annotate(&frame, visited, marker);
            sink.save_frame(index, &annotated)
                .map_err(|err| anyhow!("frame {}: {err}", cli.start + index))?;
        }

        report.counts.push(stats.cells);
        report.frames.push(frame_report(index, &stats));
    }

    println!("{:?}", report.counts);
    if let Some(path) = &cli.report {
        let bytes = serde_json::to_vec_pretty(&report).context("serializing report")?;
        fs::write(path, bytes).with_context(|| format!("writing report {}", path.display()))?;
    }

    Ok(())
}

fn counter_config(cli: &Cli) -> CounterConfig {
    CounterConfig {
        classifier: LineClassifier::new(
            cli.line_color,
            cli.line_color_alt,
            ColorMatchConfig {
                channel_tolerance: cli.channel_tolerance,
                total_tolerance: cli.total_tolerance,
            },
        ),
        walk: WalkConfig {
            closure_fraction: cli.closure_fraction,
            revisit_multiplier: cli.revisit_multiplier,
            orientation: if cli.counter_clockwise {
                Orientation::CounterClockwise
            } else {
                Orientation::Clockwise
            },
            step_budget: cli.step_budget,
        },
        initial_average_size: cli.initial_average_size,
        ..CounterConfig::default()
    }
}

fn frame_report(index: usize, stats: &FrameStats) -> FrameReport {
    FrameReport {
        index,
        cells: stats.cells,
        walks: stats.walks,
        dead_ends: stats.dead_ends,
        junction_aborts: stats.junction_aborts,
        junction_pixels: stats.junction_pixels,
        budget_exhausted: stats.budget_exhausted,
        visited_pixels: stats.visited_pixels,
        skipped: false,
    }
}

fn skipped_frame(index: usize) -> FrameReport {
    FrameReport {
        index,
        cells: 0,
        walks: 0,
        dead_ends: 0,
        junction_aborts: 0,
        junction_pixels: 0,
        budget_exhausted: 0,
        visited_pixels: 0,
        skipped: true,
    }
}

struct DirSource {
    dir: PathBuf,
    pattern: String,
    start: usize,
    count: usize,
}

impl FrameSource for DirSource {
    fn frame_count(&self) -> usize {
        self.count
    }

    fn load_frame(&mut self, index: usize) -> Result<Frame, FrameError> {
        let name = self
            .pattern
            .replace("{}", &(self.start + index).to_string());
        let path = self.dir.join(name);
        let rgb = image::open(&path)
            .map_err(|err| format!("opening {}: {err}", path.display()))?
            .to_rgb8();

        let (w, h) = rgb.dimensions();
        let data = rgb
            .pixels()
            .map(|p| Rgb8::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        Frame::from_vec(w as usize, h as usize, data).map_err(Into::into)
    }
}

struct DirSink {
    dir: PathBuf,
    pattern: String,
    start: usize,
}

impl FrameSink for DirSink {
    fn save_frame(&mut self, index: usize, frame: &Frame) -> Result<(), FrameError> {
        let name = self
            .pattern
            .replace("{}", &(self.start + index).to_string());
        let path = self.dir.join(name);

        let mut out = RgbImage::new(frame.width() as u32, frame.height() as u32);
        for (x, y, px) in out.enumerate_pixels_mut() {
            let src = frame
                .get(x as usize, y as usize)
                .expect("frame and image dimensions match");
            *px = image::Rgb([src.r, src.g, src.b]);
        }
        out.save(&path)
            .map_err(|err| format!("saving {}: {err}", path.display()))?;
        Ok(())
    }
}

fn parse_rgb(s: &str) -> Result<Rgb8, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected R,G,B, got '{s}'"));
    }

    let channel = |p: &str| {
        p.trim()
            .parse::<u8>()
            .map_err(|err| format!("channel '{p}': {err}"))
    };
    Ok(Rgb8::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
    ))
}
