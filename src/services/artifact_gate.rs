//! Decides which received telemetry gets charts rendered and runs the renderer.
//!
//! The decision is a pure function of the artifact label and the files already
//! present in the output directory, which makes re-delivery of the same
//! artifact cheap: nothing is rendered twice.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, info, warn};

use crate::services::{
    artifacts::{ArtifactDescriptor, ArtifactKind},
    render::{ExpectedOutputs, Renderer},
};

/// What the gate will do with one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The label belongs to a non-player character.
    SkipListed,
    /// Every expected output already exists.
    AlreadyGenerated,
    /// Some outputs are missing and must be produced.
    Render(ExpectedOutputs),
}

/// Counters returned to the sender of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateReport {
    /// Artifacts rendered.
    pub generated: usize,
    /// Artifacts skipped.
    pub skipped: usize,
    /// Artifacts whose rendering failed.
    pub failed: usize,
}

/// Skip list plus output directory plus the renderer doing the actual work.
pub struct ArtifactGate {
    skip_labels: HashSet<String>,
    output_dir: PathBuf,
    renderer: Arc<dyn Renderer>,
}

impl ArtifactGate {
    /// Gate writing into `output_dir` with `renderer`.
    pub fn new(
        skip_labels: impl IntoIterator<Item = String>,
        output_dir: PathBuf,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            skip_labels: skip_labels.into_iter().collect(),
            output_dir,
            renderer,
        }
    }

    /// Directory receiving rendered outputs.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Decide for one artifact without touching the renderer.
    pub fn decide(&self, descriptor: &ArtifactDescriptor) -> GateDecision {
        if self.skip_labels.contains(&descriptor.label) {
            return GateDecision::SkipListed;
        }

        let expected = ExpectedOutputs::for_artifact(&self.output_dir, descriptor);
        if expected.all_exist() {
            GateDecision::AlreadyGenerated
        } else {
            GateDecision::Render(expected)
        }
    }

    /// Run the gate over telemetry artifacts stored in `files_dir`.
    ///
    /// Blocking: the renderer does synchronous file IO.
    pub fn process(&self, files_dir: &Path, artifacts: &[ArtifactDescriptor]) -> GateReport {
        let mut report = GateReport::default();

        for descriptor in artifacts {
            if descriptor.kind != ArtifactKind::Telemetry {
                continue;
            }

            match self.decide(descriptor) {
                GateDecision::SkipListed => {
                    debug!(filename = %descriptor.filename, label = %descriptor.label, "skip-listed artifact");
                    report.skipped += 1;
                }
                GateDecision::AlreadyGenerated => {
                    debug!(filename = %descriptor.filename, "outputs already present");
                    report.skipped += 1;
                }
                GateDecision::Render(expected) => {
                    let source = files_dir.join(&descriptor.filename);
                    match self.renderer.render(&source, &expected) {
                        Ok(_) if expected.all_exist() => {
                            info!(filename = %descriptor.filename, "rendered artifact outputs");
                            report.generated += 1;
                        }
                        Ok(_) => {
                            warn!(
                                filename = %descriptor.filename,
                                missing = expected.missing().len(),
                                "renderer left expected outputs missing"
                            );
                            report.failed += 1;
                        }
                        Err(err) => {
                            warn!(filename = %descriptor.filename, error = %err, "rendering failed");
                            report.failed += 1;
                        }
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::TempDir;

    use super::*;
    use crate::services::render::RenderError;

    /// Writes empty placeholder outputs and counts invocations.
    #[derive(Default)]
    struct CountingRenderer {
        calls: AtomicUsize,
        write: bool,
    }

    impl Renderer for CountingRenderer {
        fn render(
            &self,
            _source: &Path,
            outputs: &ExpectedOutputs,
        ) -> Result<Vec<PathBuf>, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.write {
                return Ok(Vec::new());
            }
            let mut written = Vec::new();
            for (_, path) in &outputs.outputs {
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(path, b"").unwrap();
                written.push(path.clone());
            }
            Ok(written)
        }
    }

    fn gate(tmp: &TempDir, renderer: Arc<CountingRenderer>) -> ArtifactGate {
        ArtifactGate::new(
            vec!["Zoe".to_string(), "Dr. Paul Farmer".to_string()],
            tmp.path().join("out"),
            renderer,
        )
    }

    fn descriptors(names: &[&str]) -> Vec<ArtifactDescriptor> {
        names
            .iter()
            .map(|name| ArtifactDescriptor::parse(name).unwrap())
            .collect()
    }

    #[test]
    fn skip_list_matches_after_prefix_stripping() {
        let tmp = TempDir::new().unwrap();
        let gate = gate(&tmp, Arc::new(CountingRenderer::default()));

        let artifact = ArtifactDescriptor::parse("7_Zoe.csv").unwrap();
        assert_eq!(gate.decide(&artifact), GateDecision::SkipListed);
        let artifact = ArtifactDescriptor::parse("8_@Dr. Paul Farmer.csv").unwrap();
        assert_eq!(gate.decide(&artifact), GateDecision::SkipListed);
        let artifact = ArtifactDescriptor::parse("9_@zlj.csv").unwrap();
        assert!(matches!(gate.decide(&artifact), GateDecision::Render(_)));
    }

    #[test]
    fn rendering_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let renderer = Arc::new(CountingRenderer {
            write: true,
            ..CountingRenderer::default()
        });
        let gate = gate(&tmp, renderer.clone());
        let artifacts = descriptors(&["1_@zlj.csv", "2_Zoe.csv", "1_@zlj.txt"]);

        let first = gate.process(tmp.path(), &artifacts);
        assert_eq!(
            first,
            GateReport {
                generated: 1,
                skipped: 1,
                failed: 0
            }
        );

        let second = gate.process(tmp.path(), &artifacts);
        assert_eq!(
            second,
            GateReport {
                generated: 0,
                skipped: 2,
                failed: 0
            }
        );
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_outputs_after_render_count_as_failed() {
        let tmp = TempDir::new().unwrap();
        let renderer = Arc::new(CountingRenderer::default());
        let gate = gate(&tmp, renderer.clone());

        let report = gate.process(tmp.path(), &descriptors(&["3_@amy.csv"]));
        assert_eq!(report.failed, 1);

        // Still missing, so the next delivery tries again.
        gate.process(tmp.path(), &descriptors(&["3_@amy.csv"]));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);
    }
}
