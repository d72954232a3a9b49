//! Defining and listing assignments.

use chrono::NaiveDateTime;
use log::info;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use std::io::Write;

use crate::config::Config;
use crate::error::{GraderError, Result};
use crate::grader::score::Score;
use crate::input::{self, InputProvider};
use crate::store::{asset_directory, assignment, student, submission};

/// Deliverables making up one theme/milestone bundle.
pub const BUNDLE_DELIVERABLES: [i32; 3] = [1, 2, 3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssetDirectory {
    pub path: String,
    pub extra_credit: bool,
    pub graded: bool,
    pub hidden: bool,
}

impl NewAssetDirectory {
    fn graded(path: String, hidden: bool) -> Self {
        Self {
            path,
            extra_credit: false,
            graded: true,
            hidden,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    pub theme: i32,
    pub milestone: i32,
    pub deliverable: i32,
    pub oracle_path: String,
    pub template_path: String,
    pub start_date: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub directories: Vec<NewAssetDirectory>,
}

impl NewAssignment {
    fn name(&self) -> String {
        format!("t{}m{}d{}", self.theme, self.milestone, self.deliverable)
    }

    pub fn validate(&self, config: &Config) -> Result<()> {
        if self.due_date < self.start_date {
            return Err(GraderError::InvalidAssignment(format!(
                "{} is due ({}) before it starts ({})",
                self.name(),
                self.due_date,
                self.start_date
            )));
        }
        if self.deliverable == config.creative_deliverable
            && self.directories.iter().any(|d| d.graded)
        {
            return Err(GraderError::InvalidAssignment(format!(
                "{} is a creative deliverable and cannot have graded scene directories",
                self.name()
            )));
        }
        Ok(())
    }
}

async fn insert_assignment<C: ConnectionTrait>(
    db: &C,
    new: NewAssignment,
) -> Result<assignment::Model> {
    let model = assignment::ActiveModel {
        theme: Set(new.theme),
        milestone: Set(new.milestone),
        deliverable: Set(new.deliverable),
        oracle_path: Set(new.oracle_path),
        template_path: Set(new.template_path),
        start_date: Set(new.start_date),
        due_date: Set(new.due_date),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for dir in new.directories {
        asset_directory::ActiveModel {
            assignment_id: Set(model.id),
            path: Set(dir.path),
            extra_credit: Set(dir.extra_credit),
            graded: Set(dir.graded),
            hidden: Set(dir.hidden),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(model)
}

/// Validates and stores an assignment with its directories.
pub async fn define_assignment<C>(
    db: &C,
    config: &Config,
    new: NewAssignment,
) -> Result<assignment::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    Ok(define_assignments(db, config, vec![new]).await?.remove(0))
}

/// Stores every assignment or none of them.
pub async fn define_assignments<C>(
    db: &C,
    config: &Config,
    new: Vec<NewAssignment>,
) -> Result<Vec<assignment::Model>>
where
    C: ConnectionTrait + TransactionTrait,
{
    for n in &new {
        n.validate(config)?;
    }
    let txn = db.begin().await?;
    let mut defined = Vec::with_capacity(new.len());
    for n in new {
        let model = insert_assignment(&txn, n).await?;
        info!("defined {model}");
        defined.push(model);
    }
    txn.commit().await?;
    Ok(defined)
}

/// The three deliverables of a theme/milestone, with the default scene directories.
///
/// Each graded deliverable gets its own visible and hidden scenes, plus the next deliverable's
/// visible scenes as ungraded practice. The creative deliverable gets nothing.
pub fn bundle(
    config: &Config,
    theme: i32,
    milestone: i32,
    oracle_path: &str,
    template_path: &str,
    start_date: NaiveDateTime,
    due_dates: [NaiveDateTime; 3],
) -> Vec<NewAssignment> {
    BUNDLE_DELIVERABLES
        .iter()
        .zip(due_dates)
        .map(|(&deliverable, due_date)| {
            let mut directories = vec![];
            if deliverable != config.creative_deliverable {
                directories.push(NewAssetDirectory::graded(
                    config.asset_directory(theme, milestone, deliverable),
                    false,
                ));
                directories.push(NewAssetDirectory::graded(
                    config.hidden_asset_directory(theme, milestone, deliverable),
                    true,
                ));
                let next = deliverable + 1;
                if BUNDLE_DELIVERABLES.contains(&next) && next != config.creative_deliverable {
                    directories.push(NewAssetDirectory {
                        path: config.asset_directory(theme, milestone, next),
                        extra_credit: false,
                        graded: false,
                        hidden: false,
                    });
                }
            }
            NewAssignment {
                theme,
                milestone,
                deliverable,
                oracle_path: oracle_path.to_string(),
                template_path: template_path.to_string(),
                start_date,
                due_date,
                directories,
            }
        })
        .collect()
}

pub fn ask_asset_directory<I: InputProvider>(input: &mut I) -> Result<NewAssetDirectory> {
    let path = input.read_line("Path to the directory: ")?;
    let graded = input::ask_yes_no(
        input,
        "Is this directory required for this deliverable [y/n]: ",
    )?;
    let hidden = input::ask_yes_no(input, "Is this directory full of hidden scenes [y/n]: ")?;
    Ok(NewAssetDirectory {
        path: path.trim().to_string(),
        extra_credit: false,
        graded,
        hidden,
    })
}

fn ask_paths<I: InputProvider>(input: &mut I) -> Result<(String, String)> {
    let oracle = input.read_line("Path to the oracle: ")?;
    let template = input.read_line("Path to the assignment directory: ")?;
    Ok((oracle.trim().to_string(), template.trim().to_string()))
}

/// Prompts for every field of a single assignment.
pub fn ask_assignment<I: InputProvider, W: Write>(
    input: &mut I,
    out: &mut W,
) -> Result<NewAssignment> {
    let theme = input::ask_number(input, out, "Theme: ")?;
    let milestone = input::ask_number(input, out, "Milestone: ")?;
    let deliverable = input::ask_number(input, out, "Deliverable: ")?;
    let (oracle_path, template_path) = ask_paths(input)?;
    let start_date = input::ask_date(input, out, "Start date (YYYY-MM-DD): ")?;
    let due_date = input::ask_date(
        input,
        out,
        "Date on which it's due at 11:59 PM (YYYY-MM-DD): ",
    )?;

    let mut directories = vec![];
    while input::ask_yes_no(input, "Add another asset directory [y/n]: ")? {
        directories.push(ask_asset_directory(input)?);
    }

    Ok(NewAssignment {
        theme,
        milestone,
        deliverable,
        oracle_path,
        template_path,
        start_date,
        due_date,
        directories,
    })
}

/// Prompts for a bundle. `theme` and `milestone` are only asked for when not given.
pub fn ask_bundle<I: InputProvider, W: Write>(
    input: &mut I,
    out: &mut W,
    config: &Config,
    theme: Option<i32>,
    milestone: Option<i32>,
) -> Result<Vec<NewAssignment>> {
    let theme = match theme {
        Some(theme) => theme,
        None => input::ask_number(input, out, "Theme: ")?,
    };
    let milestone = match milestone {
        Some(milestone) => milestone,
        None => input::ask_number(input, out, "Milestone: ")?,
    };
    let (oracle_path, template_path) = ask_paths(input)?;
    let start_date = input::ask_date(input, out, "Start date (YYYY-MM-DD): ")?;

    let mut due_dates = [NaiveDateTime::default(); 3];
    for (due, deliverable) in due_dates.iter_mut().zip(BUNDLE_DELIVERABLES) {
        *due = input::ask_date(
            input,
            out,
            &format!("Date on which Deliverable {deliverable} is due at 11:59 PM (YYYY-MM-DD): "),
        )?;
    }

    Ok(bundle(
        config,
        theme,
        milestone,
        &oracle_path,
        &template_path,
        start_date,
        due_dates,
    ))
}

pub async fn list_assignments<C: ConnectionTrait, W: Write>(db: &C, out: &mut W) -> Result<()> {
    let all = assignment::all(db).await?;
    if all.is_empty() {
        writeln!(out, "No assignments are defined.")?;
    }
    for a in all {
        writeln!(out, "{a}")?;
        for dir in a.directories(db).await? {
            writeln!(out, "\t{dir}")?;
        }
    }
    Ok(())
}

/// Grade of the latest submission of `uni` on every assignment, then the overall tally.
pub async fn print_grades<C: ConnectionTrait, W: Write>(
    db: &C,
    uni: &str,
    out: &mut W,
) -> Result<()> {
    let Some(student) = student::find_by_uni(db, uni).await? else {
        writeln!(out, "No student with UNI {uni} has submitted anything.")?;
        return Ok(());
    };

    let mut total = Score::default();
    for a in assignment::all(db).await? {
        let Some(latest) = submission::latest_for(db, student.id, a.id).await? else {
            continue;
        };
        let score = latest.score(db).await?;
        total += score;
        match score.percentage() {
            Some(p) => writeln!(
                out,
                "{}: {p:.1}% ({} / {}, submission {})",
                a.name(),
                score.passed(),
                score.attempted(),
                latest.id
            )?,
            None => writeln!(out, "{}: no grade (submission {})", a.name(), latest.id)?,
        }
    }
    match total.percentage() {
        Some(p) => writeln!(
            out,
            "Overall: {} / {} tests passed ({p:.1}%).",
            total.passed(),
            total.attempted()
        )?,
        None => writeln!(out, "Overall: no graded tests.")?,
    }
    Ok(())
}
