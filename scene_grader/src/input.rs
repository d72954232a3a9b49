//! Where answers to prompts come from.
//!
//! The orchestrator and the admin commands only talk to an [`InputProvider`], so they run the
//! same way against a terminal, a pipe, or a list of canned answers.

use chrono::{NaiveDate, NaiveDateTime};
use dialoguer::Input;
use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
};

use crate::error::{GraderError, Result};

pub trait InputProvider {
    /// One line of input, without the trailing newline.
    ///
    /// Returns [`GraderError::InputClosed`] once there is nothing left to read.
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Reads from the terminal, or from plain stdin when nobody is attached to it.
#[derive(Debug, Default)]
pub struct ConsoleInput;

impl InputProvider for ConsoleInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        if console::user_attended() {
            return Input::<String>::new()
                .with_prompt(prompt.trim_end().trim_end_matches(':'))
                .allow_empty(true)
                .interact_text()
                .map_err(|err| match err {
                    dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                        GraderError::InputClosed
                    }
                    other => GraderError::Prompt(other.to_string()),
                });
        }

        print!("{prompt}");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(GraderError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Replays a fixed list of answers and remembers which prompts were shown.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: vec![],
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl InputProvider for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or(GraderError::InputClosed)
    }
}

impl<T: InputProvider + ?Sized> InputProvider for &mut T {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        (**self).read_line(prompt)
    }
}

/// Any answer containing a `y` counts as yes.
pub fn ask_yes_no<I: InputProvider>(input: &mut I, prompt: &str) -> Result<bool> {
    Ok(input.read_line(prompt)?.contains('y'))
}

/// Asks until `parse` accepts the answer, telling the user about each rejected one.
pub fn ask_valid<I, W, T, F>(input: &mut I, out: &mut W, prompt: &str, parse: F) -> Result<T>
where
    I: InputProvider,
    W: Write,
    F: Fn(&str) -> Option<T>,
{
    loop {
        let answer = input.read_line(prompt)?;
        match parse(answer.trim()) {
            Some(value) => return Ok(value),
            None => writeln!(out, "{answer} is not a valid response.")?,
        }
    }
}

pub fn parse_rating(s: &str) -> Option<i32> {
    s.parse().ok().filter(|r| (1..=5).contains(r))
}

pub fn ask_rating<I: InputProvider, W: Write>(
    input: &mut I,
    out: &mut W,
    prompt: &str,
) -> Result<i32> {
    ask_valid(input, out, prompt, parse_rating)
}

/// Free text spread over several lines, ended by an empty line. Lines are joined by spaces.
pub fn ask_comments<I: InputProvider, W: Write>(input: &mut I, out: &mut W) -> Result<String> {
    writeln!(out, "Any other comments (hit enter twice when you're done):")?;
    let mut lines = vec![];
    loop {
        let line = input.read_line("")?;
        if line.is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join(" "))
}

/// Accepts `YYYY-MM-DD` (midnight) or an ISO-8601 date-time such as `2024-01-10T23:59:00`.
pub fn parse_date(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| GraderError::InvalidDate(s.to_string()));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| GraderError::InvalidDate(s.to_string()))
}

pub fn ask_date<I: InputProvider, W: Write>(
    input: &mut I,
    out: &mut W,
    prompt: &str,
) -> Result<NaiveDateTime> {
    ask_valid(input, out, prompt, |s| parse_date(s).ok())
}

pub fn ask_number<I: InputProvider, W: Write>(
    input: &mut I,
    out: &mut W,
    prompt: &str,
) -> Result<i32> {
    ask_valid(input, out, prompt, |s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_replay_answers_then_close() {
        let mut input = ScriptedInput::new(["first"]);
        assert_eq!(input.read_line("Q1: ").unwrap(), "first");
        assert!(matches!(
            input.read_line("Q2: "),
            Err(GraderError::InputClosed)
        ));
        assert_eq!(input.prompts(), ["Q1: ", "Q2: "]);
    }

    #[test]
    fn should_treat_any_y_as_yes() {
        let mut input = ScriptedInput::new(["y", "yes please", "n", "", "nope"]);
        let answers: Vec<_> = (0..5)
            .map(|_| ask_yes_no(&mut input, "Submit [y/n]: ").unwrap())
            .collect();
        assert_eq!(answers, [true, true, false, false, false]);
    }

    #[test]
    fn should_reprompt_until_rating_is_valid() {
        let mut input = ScriptedInput::new(["0", "six", "6", "4"]);
        let mut out = vec![];
        let rating = ask_rating(&mut input, &mut out, "How fun [1-5]? ").unwrap();
        assert_eq!(rating, 4);
        assert_eq!(input.prompts().len(), 4);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("is not a valid response.").count(), 3);
        assert!(text.contains("six is not a valid response."));
    }

    #[test]
    fn should_propagate_closed_input_while_reprompting() {
        let mut input = ScriptedInput::new(["bad"]);
        let result = ask_rating(&mut input, &mut vec![], "Rating: ");
        assert!(matches!(result, Err(GraderError::InputClosed)));
    }

    #[test]
    fn should_join_comment_lines() {
        let mut input = ScriptedInput::new(["really", "fun", "", "unused"]);
        let comments = ask_comments(&mut input, &mut vec![]).unwrap();
        assert_eq!(comments, "really fun");
        assert_eq!(input.remaining(), 1);
    }

    #[test]
    fn should_parse_dates() {
        let midnight = parse_date("2024-01-10").unwrap();
        assert_eq!(midnight.to_string(), "2024-01-10 00:00:00");
        let precise = parse_date("2024-01-10T23:59:00").unwrap();
        assert_eq!(precise.to_string(), "2024-01-10 23:59:00");
        assert!(matches!(
            parse_date("10/01/2024"),
            Err(GraderError::InvalidDate(_))
        ));
    }
}
