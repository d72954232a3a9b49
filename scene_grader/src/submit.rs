//! Processing of one submission, from the raw folder to a committed (or canceled) record.
//!
//! A submission walks through [`Stage`]s. Every transition either moves forward or fails; a
//! failure after the scratch folder exists removes it again, so nothing is left behind
//! unless the student confirms.

use chrono::{Local, NaiveDateTime, Utc};
use colored::Colorize;
use log::{debug, error, info, warn};
use sea_orm::DatabaseConnection;
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use uuid::Uuid;

use crate::config::Config;
use crate::creative::{self, CreativeFiles};
use crate::error::{GraderError, Result};
use crate::grader::{self, executor::SceneExecutor, os_interface::ExecutableArtifact};
use crate::grader::{Grader, GradingReport};
use crate::input::{self, InputProvider};
use crate::report;
use crate::scratch;
use crate::store::{assignment, student, submission};

#[derive(Debug)]
pub enum Stage {
    Started,
    FolderPrepared,
    Compiled(ExecutableArtifact),
    Tested(GradingReport),
    AwaitingConfirmation(GradingReport),
    Committed(submission::Model),
    Canceled,
}

#[derive(Debug, PartialEq)]
pub enum SubmissionOutcome {
    Committed(submission::Model),
    Canceled,
    /// Nothing is open for submission right now.
    NoOpenAssignment,
}

/// What a single submission is about. Fixed once the assignment is chosen.
struct Attempt<'p> {
    student: student::Model,
    assignment: assignment::Model,
    original: &'p Path,
    folder: PathBuf,
}

pub struct Submitter<'a, I, W> {
    db: &'a DatabaseConnection,
    config: &'a Config,
    input: I,
    out: W,
    now: NaiveDateTime,
}

impl<'a, I: InputProvider, W: Write> Submitter<'a, I, W> {
    pub fn new(db: &'a DatabaseConnection, config: &'a Config, input: I, out: W) -> Self {
        Self {
            db,
            config,
            input,
            out,
            now: Local::now().naive_local(),
        }
    }

    /// Decides which assignments are open as if it were `now`.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub async fn process(&mut self, uni: &str, original: &Path) -> Result<SubmissionOutcome> {
        check_uni(uni)?;
        let student = self.student_of_uni(uni).await?;
        scratch::check_original_folder(original, self.config)?;

        let Some(assignment) = self.choose_assignment().await? else {
            writeln!(self.out, "No assignments are available to submit.")?;
            return Ok(SubmissionOutcome::NoOpenAssignment);
        };
        let folder = scratch::submission_folder_path(self.config, &assignment, uni)?;
        let attempt = Attempt {
            student,
            assignment,
            original,
            folder,
        };

        let mut stage = Stage::Started;
        loop {
            debug!("submission of {uni}: {}", stage_name(&stage));
            stage = match self.advance(&attempt, stage).await {
                Ok(Stage::Committed(model)) => return Ok(SubmissionOutcome::Committed(model)),
                Ok(Stage::Canceled) => return Ok(SubmissionOutcome::Canceled),
                Ok(next) => next,
                Err(err) => {
                    error!("submission of {uni} failed: {err}");
                    self.cancel(&attempt.folder)?;
                    return Err(err);
                }
            };
        }
    }

    async fn advance(&mut self, attempt: &Attempt<'_>, stage: Stage) -> Result<Stage> {
        match stage {
            Stage::Started => {
                scratch::prepare_submission_folder(
                    attempt.original,
                    &attempt.folder,
                    &attempt.assignment,
                    self.config,
                )?;
                Ok(Stage::FolderPrepared)
            }
            Stage::FolderPrepared if self.is_creative(attempt) => {
                let files = creative::locate_creative_files(
                    &attempt.folder,
                    &attempt.student.uni,
                    &attempt.assignment,
                    self.config,
                )?;
                self.print_creative_files(&files)?;
                Ok(Stage::AwaitingConfirmation(GradingReport::default()))
            }
            Stage::FolderPrepared => Ok(Stage::Compiled(scratch::compile_submission(
                &attempt.folder,
                self.config,
            )?)),
            Stage::Compiled(binary) => match self.run_tests(attempt, binary).await {
                Ok(graded) => Ok(Stage::Tested(graded)),
                Err(err) => {
                    error!("internal error while running tests: {err}");
                    Err(err)
                }
            },
            Stage::Tested(graded) => {
                let previous = match submission::latest_for(
                    self.db,
                    attempt.student.id,
                    attempt.assignment.id,
                )
                .await?
                {
                    Some(latest) => Some(latest.score(self.db).await?),
                    None => None,
                };
                report::print_summary(&mut self.out, &graded.score, previous.as_ref())?;
                Ok(Stage::AwaitingConfirmation(graded))
            }
            Stage::AwaitingConfirmation(graded) => {
                if !input::ask_yes_no(&mut self.input, "Submit [y/n]: ")? {
                    self.cancel(&attempt.folder)?;
                    return Ok(Stage::Canceled);
                }
                let survey = if self.is_creative(attempt) {
                    match self.ask_survey() {
                        Ok(survey) => survey,
                        Err(GraderError::InputClosed) => {
                            warn!("input closed during the survey");
                            self.cancel(&attempt.folder)?;
                            return Ok(Stage::Canceled);
                        }
                        Err(err) => return Err(err),
                    }
                } else {
                    submission::Survey::default()
                };
                let new = submission::NewSubmission {
                    assignment_id: attempt.assignment.id,
                    student_id: attempt.student.id,
                    survey,
                    submission_time: Utc::now(),
                };
                let model = submission::commit(self.db, new, &graded.test_runs()).await?;
                info!(
                    "committed submission {} of {} on {}",
                    model.id, attempt.student.uni, attempt.assignment
                );
                writeln!(
                    self.out,
                    "Your submission is complete with ID {}!",
                    model.id.to_string().green().bold()
                )?;
                Ok(Stage::Committed(model))
            }
            terminal @ (Stage::Committed(_) | Stage::Canceled) => Ok(terminal),
        }
    }

    fn is_creative(&self, attempt: &Attempt<'_>) -> bool {
        attempt
            .assignment
            .is_creative(self.config.creative_deliverable)
    }

    async fn student_of_uni(&mut self, uni: &str) -> Result<student::Model> {
        let (found, created) = student::find_or_create(self.db, uni)
            .await
            .map_err(|err| {
                error!("could not create student {uni}: {err}");
                GraderError::StudentCreation(uni.to_string())
            })?;
        if created {
            writeln!(self.out, "Creating student {uni}")?;
        }
        Ok(found)
    }

    async fn choose_assignment(&mut self) -> Result<Option<assignment::Model>> {
        let open =
            assignment::current_assignments(self.db, self.now, self.config.late_window).await?;
        if open.is_empty() {
            return Ok(None);
        }

        writeln!(self.out, "Available assignments:")?;
        for a in &open {
            writeln!(self.out, "\t{}", a.name().green().bold())?;
        }
        loop {
            let name = self
                .input
                .read_line("Name of assignment you would like to submit: ")?;
            let name = name.trim();
            match open.iter().find(|a| a.name() == name) {
                Some(chosen) => {
                    writeln!(self.out, "You've selected to submit {}.", chosen.name())?;
                    return Ok(Some(chosen.clone()));
                }
                None => writeln!(self.out, "No assignment titled {name} was found.")?,
            }
        }
    }

    async fn run_tests(
        &mut self,
        attempt: &Attempt<'_>,
        binary: ExecutableArtifact,
    ) -> Result<GradingReport> {
        let directories = attempt.assignment.directories(self.db).await?;
        let scenes = grader::collect_scenes(&directories, &self.config.scene_extension);
        let work_dir = std::path::absolute(&self.config.work_dir)?;
        let executor = SceneExecutor::new(
            binary,
            &attempt.assignment.oracle_path,
            work_dir,
            Uuid::new_v4().simple().to_string(),
        );
        Ok(Grader::new(&executor).run_assessment(&scenes, &mut self.out)?)
    }

    fn print_creative_files(&mut self, files: &CreativeFiles) -> Result<()> {
        writeln!(self.out, "Identified creative files:")?;
        writeln!(self.out, "\tMovie: {}", files.movie.display())?;
        writeln!(self.out, "\tScene: {}", files.scene.display())?;
        Ok(())
    }

    fn ask_survey(&mut self) -> Result<submission::Survey> {
        writeln!(self.out, "Please rate this assignment from 1 (lowest) to 5 (highest).")?;
        let difficulty = input::ask_rating(&mut self.input, &mut self.out, "Difficulty [1-5]: ")?;
        let fun = input::ask_rating(&mut self.input, &mut self.out, "Fun [1-5]: ")?;
        let frustration =
            input::ask_rating(&mut self.input, &mut self.out, "Frustration [1-5]: ")?;
        let comments = input::ask_comments(&mut self.input, &mut self.out)?;
        Ok(submission::Survey {
            difficulty_rating: Some(difficulty),
            fun_rating: Some(fun),
            frustration_rating: Some(frustration),
            days_spent_on: None,
            comments: (!comments.is_empty()).then_some(comments),
        })
    }

    fn cancel(&mut self, folder: &Path) -> Result<()> {
        if folder.exists() {
            scratch::remove_submission_folder(folder)?;
            writeln!(self.out, "Submission canceled.")?;
        }
        Ok(())
    }
}

/// The UNI ends up in a folder name and in a file pattern.
fn check_uni(uni: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    if uni.is_empty() || !uni.chars().all(allowed) {
        return Err(GraderError::InvalidUni(uni.to_string()));
    }
    Ok(())
}

fn stage_name(stage: &Stage) -> &'static str {
    match stage {
        Stage::Started => "started",
        Stage::FolderPrepared => "folder prepared",
        Stage::Compiled(_) => "compiled",
        Stage::Tested(_) => "tested",
        Stage::AwaitingConfirmation(_) => "awaiting confirmation",
        Stage::Committed(_) => "committed",
        Stage::Canceled => "canceled",
    }
}
