//! Everything the operator reads on the terminal while a submission is processed.

use colored::Colorize;
use std::io::{self, Write};

use crate::discovery::TestScene;
use crate::grader::executor::SceneOutcome;
use crate::grader::score::Score;

/// Width of the result table; scene names are padded up to it.
pub const MAIN_WIDTH: usize = 72;

pub fn print_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(MAIN_WIDTH))?;
    writeln!(out, "  Test Results:")?;
    writeln!(out, "{}", "=".repeat(MAIN_WIDTH))?;
    writeln!(out)
}

pub fn print_test<W: Write>(out: &mut W, scene: &TestScene) -> io::Result<()> {
    let name = scene.short_name();
    let padding = MAIN_WIDTH.saturating_sub(name.len() + 10);
    write!(out, "    {}{}", name.blue(), " ".repeat(padding))?;
    out.flush()
}

pub fn print_outcome<W: Write>(out: &mut W, outcome: &SceneOutcome) -> io::Result<()> {
    match outcome {
        SceneOutcome::Passed => writeln!(out, "{}", "[ OK ]".green().bold()),
        SceneOutcome::Failed => writeln!(out, "{}", "[FAIL]".red().bold()),
        SceneOutcome::Indeterminate(reason) => {
            writeln!(out, "{}", "[N/A ]".bold())?;
            writeln!(out, "{reason}")
        }
    }
}

fn print_passed<W: Write>(out: &mut W, score: &Score) -> io::Result<()> {
    match score.percentage() {
        Some(percentage) => writeln!(
            out,
            "Passed {} / {} tests for a grade of {}%.",
            score.passed().to_string().green().bold(),
            score.attempted().to_string().bold(),
            format!("{percentage:.1}").blue().bold()
        ),
        None => writeln!(out, "No graded tests were attempted (no grade)."),
    }
}

/// Final tally, followed by the tally of `previous` when the student submitted before.
pub fn print_summary<W: Write>(
    out: &mut W,
    score: &Score,
    previous: Option<&Score>,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(MAIN_WIDTH))?;
    writeln!(out)?;
    print_passed(out, score)?;
    if score.indeterminate() > 0 {
        writeln!(
            out,
            "{} test(s) could not be judged and were left out.",
            score.indeterminate()
        )?;
    }
    if let Some(previous) = previous {
        writeln!(out)?;
        writeln!(out, "Compare that to your last submission:")?;
        print_passed(out, previous)?;
    }
    writeln!(out)
}

pub fn fatal_message(msg: &str) -> String {
    format!("{}{} Exiting.", "FATAL ERROR: ".bold(), msg)
        .red()
        .to_string()
}
