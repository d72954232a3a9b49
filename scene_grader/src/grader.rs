pub mod executor;
pub mod os_interface;
pub mod score;

use chrono::{DateTime, Utc};
use log::info;
use std::io::{self, Write};

use crate::discovery::TestScene;
use crate::report;
use crate::store::{asset_directory, test_run::NewTestRun};
use executor::{SceneExecutor, SceneOutcome};
use score::Score;

/// Scenes of every directory, directory by directory, in scan order.
pub fn collect_scenes(
    directories: &[asset_directory::Model],
    scene_extension: &str,
) -> Vec<TestScene> {
    directories
        .iter()
        .flat_map(|d| d.tests(scene_extension))
        .collect()
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SceneRun {
    pub scene: TestScene,
    pub outcome: SceneOutcome,
    pub run_time: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct GradingReport {
    pub runs: Vec<SceneRun>,
    pub score: Score,
}

impl GradingReport {
    fn add_run(&mut self, run: SceneRun) {
        self.score.record(run.outcome.verdict());
        self.runs.push(run);
    }

    /// Rows to persist, one per scene (indeterminate ones included).
    pub fn test_runs(&self) -> Vec<NewTestRun> {
        self.runs
            .iter()
            .map(|run| NewTestRun {
                scene_path: run.scene.path.display().to_string(),
                verdict: run.outcome.verdict(),
                run_time: run.run_time,
            })
            .collect()
    }
}

/// Runs every scene of a submission and tallies the outcomes.
#[derive(Debug, Clone)]
pub struct Grader<'a> {
    executor: &'a SceneExecutor,
}

impl<'a> Grader<'a> {
    pub fn new(executor: &'a SceneExecutor) -> Self {
        Self { executor }
    }

    /// Scene failures never stop the run; only a failure to write to `out` does.
    pub fn run_assessment<W: Write>(
        &self,
        scenes: &[TestScene],
        out: &mut W,
    ) -> io::Result<GradingReport> {
        let mut result = GradingReport::default();
        report::print_header(out)?;
        for scene in scenes {
            report::print_test(out, scene)?;
            let run_time = Utc::now();
            let outcome = self.executor.run(scene);
            report::print_outcome(out, &outcome)?;
            result.add_run(SceneRun {
                scene: scene.clone(),
                outcome,
                run_time,
            });
        }
        info!(
            "graded {} scene(s): {} passed, {} attempted",
            scenes.len(),
            result.score.passed(),
            result.score.attempted()
        );
        Ok(result)
    }
}
