//! Rendering collaborator turning telemetry CSV files into charts.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::services::artifacts::ArtifactDescriptor;

/// One derived output produced for every telemetry artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Money per round.
    Money,
    /// Body state per round.
    BodyState,
    /// Mind state per round.
    MindState,
    /// Position trajectory.
    Movement,
}

impl OutputKind {
    /// Every kind, in rendering order.
    pub const ALL: [OutputKind; 4] = [
        OutputKind::Money,
        OutputKind::BodyState,
        OutputKind::MindState,
        OutputKind::Movement,
    ];

    fn suffix(self) -> &'static str {
        match self {
            OutputKind::Money => "money",
            OutputKind::BodyState => "body_state",
            OutputKind::MindState => "mind_state",
            OutputKind::Movement => "movement",
        }
    }

    fn title(self) -> &'static str {
        match self {
            OutputKind::Money => "Money Over Time",
            OutputKind::BodyState => "Body State Over Time",
            OutputKind::MindState => "Mind State Over Time",
            OutputKind::Movement => "Player Movement Trajectory",
        }
    }
}

/// The fixed set of output paths expected for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedOutputs {
    /// Output kind and its target path.
    pub outputs: Vec<(OutputKind, PathBuf)>,
}

impl ExpectedOutputs {
    /// `<output_dir>/<stem>_<kind>.svg` for every [`OutputKind`].
    pub fn for_artifact(output_dir: &Path, descriptor: &ArtifactDescriptor) -> Self {
        let outputs = OutputKind::ALL
            .into_iter()
            .map(|kind| {
                let name = format!("{}_{}.svg", descriptor.stem, kind.suffix());
                (kind, output_dir.join(name))
            })
            .collect();
        Self { outputs }
    }

    /// True when every expected output is already on disk.
    pub fn all_exist(&self) -> bool {
        self.outputs.iter().all(|(_, path)| path.is_file())
    }

    /// Outputs that are not on disk yet.
    pub fn missing(&self) -> Vec<&Path> {
        self.outputs
            .iter()
            .filter(|(_, path)| !path.is_file())
            .map(|(_, path)| path.as_path())
            .collect()
    }
}

/// Failure to render one artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Telemetry could not be read.
    #[error("failed to read telemetry `{path}`")]
    Read {
        /// Telemetry file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A row could not be parsed.
    #[error("malformed telemetry `{path}` at line {line}: {reason}")]
    Parse {
        /// Telemetry file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },
    /// Only a header was present.
    #[error("telemetry `{path}` holds no data rows")]
    Empty {
        /// Telemetry file.
        path: PathBuf,
    },
    /// A chart could not be written.
    #[error("failed to write chart `{path}`")]
    Write {
        /// Chart file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Produces the derived outputs for one artifact and reports which were written.
///
/// Called from a blocking worker.
pub trait Renderer: Send + Sync {
    /// Write the charts listed in `outputs` from `source`; returns the paths written.
    fn render(&self, source: &Path, outputs: &ExpectedOutputs) -> Result<Vec<PathBuf>, RenderError>;
}

/// One row of the per-round telemetry: `round, money, body_state, mind_state, x, y, z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRow {
    /// Round index.
    pub round: f64,
    /// Money.
    pub money: f64,
    /// Body state.
    pub body_state: f64,
    /// Mind state.
    pub mind_state: f64,
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Z position.
    pub z: f64,
}

/// Parse telemetry CSV content. The first line is a header and is skipped.
pub fn parse_telemetry(path: &Path, content: &str) -> Result<Vec<TelemetryRow>, RenderError> {
    let mut rows = Vec::new();
    for (index, line) in content.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parse_err = |reason: String| RenderError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            reason,
        };

        let values = line
            .split(',')
            .map(|cell| cell.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| parse_err(err.to_string()))?;
        if values.len() < 7 {
            return Err(parse_err(format!("expected 7 columns, got {}", values.len())));
        }

        rows.push(TelemetryRow {
            round: values[0],
            money: values[1],
            body_state: values[2],
            mind_state: values[3],
            x: values[4],
            y: values[5],
            z: values[6],
        });
    }

    if rows.is_empty() {
        return Err(RenderError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(rows)
}

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const MARGIN: f64 = 60.0;

/// Writes static SVG line charts: one per numeric channel and an x/y trajectory.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgChartRenderer;

impl Renderer for SvgChartRenderer {
    fn render(&self, source: &Path, outputs: &ExpectedOutputs) -> Result<Vec<PathBuf>, RenderError> {
        let content = fs::read_to_string(source).map_err(|err| RenderError::Read {
            path: source.to_path_buf(),
            source: err,
        })?;
        let rows = parse_telemetry(source, &content)?;

        let mut written = Vec::new();
        for (kind, path) in &outputs.outputs {
            let points = rows
                .iter()
                .map(|row| match kind {
                    OutputKind::Money => (row.round, row.money),
                    OutputKind::BodyState => (row.round, row.body_state),
                    OutputKind::MindState => (row.round, row.mind_state),
                    OutputKind::Movement => (row.x, row.y),
                })
                .collect::<Vec<_>>();
            let svg = chart_svg(kind.title(), &points, *kind == OutputKind::Movement);

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|err| RenderError::Write {
                    path: path.clone(),
                    source: err,
                })?;
            }
            fs::write(path, svg).map_err(|err| RenderError::Write {
                path: path.clone(),
                source: err,
            })?;
            written.push(path.clone());
        }

        Ok(written)
    }
}

fn chart_svg(title: &str, points: &[(f64, f64)], mark_last: bool) -> String {
    let (min_x, max_x) = bounds(points.iter().map(|(x, _)| *x));
    let (min_y, max_y) = bounds(points.iter().map(|(_, y)| *y));
    let scale = |value: f64, min: f64, max: f64, span: f64| {
        if max > min {
            (value - min) / (max - min) * span
        } else {
            span / 2.0
        }
    };
    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let project = |(x, y): (f64, f64)| {
        (
            MARGIN + scale(x, min_x, max_x, plot_w),
            HEIGHT - MARGIN - scale(y, min_y, max_y, plot_h),
        )
    };

    let mut polyline = String::new();
    for point in points {
        let (px, py) = project(*point);
        let _ = write!(polyline, "{px:.1},{py:.1} ");
    }

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" font-size="20" text-anchor="middle">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    );
    let _ = writeln!(
        svg,
        r##"<rect x="{MARGIN}" y="{MARGIN}" width="{plot_w}" height="{plot_h}" fill="none" stroke="#999"/>"##
    );
    let _ = writeln!(
        svg,
        r#"<text x="{MARGIN}" y="{}" font-size="12">{min_y:.1} .. {max_y:.1}</text>"#,
        HEIGHT - MARGIN / 3.0
    );
    let _ = writeln!(
        svg,
        r#"<polyline fill="none" stroke="steelblue" stroke-width="2" points="{}"/>"#,
        polyline.trim_end()
    );
    if mark_last {
        if let Some(last) = points.last() {
            let (px, py) = project(*last);
            let _ = writeln!(svg, r#"<circle cx="{px:.1}" cy="{py:.1}" r="6" fill="red"/>"#);
        }
    }
    svg.push_str("</svg>\n");
    svg
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), value| {
        (min.min(value), max.max(value))
    })
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
