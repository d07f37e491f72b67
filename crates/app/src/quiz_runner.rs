//! Line-based terminal driver for a quiz session.

use std::io::{self, BufRead, Write};

use course_core::session::{Advance, QuizSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Submit,
    Quit,
}

/// Drive the session from `input` until the learner submits or quits.
///
/// End of input counts as quitting.
///
/// # Errors
///
/// Returns I/O errors from reading input or writing output.
pub fn drive<R: BufRead, W: Write>(
    session: &mut QuizSession,
    input: &mut R,
    out: &mut W,
) -> io::Result<RunOutcome> {
    let mut line = String::new();
    loop {
        if session.is_showing_results() {
            write_results(session, out)?;
            write!(out, "[s]ubmit, [r]etake, [q]uit > ")?;
        } else {
            write_question(session, out)?;
            write!(
                out,
                "1-{} to answer, [n]ext, [p]revious, [q]uit > ",
                session.current_question().option_count()
            )?;
        }
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(RunOutcome::Quit);
        }
        let cmd = line.trim().to_ascii_lowercase();

        if session.is_showing_results() {
            match cmd.as_str() {
                "s" => return Ok(RunOutcome::Submit),
                "r" => session.retake(),
                "q" => return Ok(RunOutcome::Quit),
                _ => writeln!(out, "unknown command: {cmd}")?,
            }
            continue;
        }

        match cmd.as_str() {
            "q" => return Ok(RunOutcome::Quit),
            "n" => match session.go_next() {
                Ok(Advance::Moved { .. } | Advance::ShowingResults) => {}
                Err(err) => writeln!(out, "{err}")?,
            },
            "p" => {
                if !session.go_previous() {
                    writeln!(out, "already on the first question")?;
                }
            }
            other => match other.parse::<usize>() {
                Ok(choice) if choice > 0 => {
                    if let Err(err) = session.select_current(choice - 1) {
                        writeln!(out, "{err}")?;
                    }
                }
                _ => writeln!(out, "unknown command: {other}")?,
            },
        }
    }
}

fn write_question<W: Write>(session: &QuizSession, out: &mut W) -> io::Result<()> {
    let (n, m) = session.position();
    let question = session.current_question();
    let selected = session.selected_for(question.id());
    writeln!(out)?;
    writeln!(out, "Question {n} of {m}")?;
    writeln!(out, "{}", question.prompt())?;
    for (i, option) in question.options().iter().enumerate() {
        let marker = if selected == Some(i) { '*' } else { ' ' };
        writeln!(out, " {marker} {}. {option}", i + 1)?;
    }
    Ok(())
}

/// Print the score and per-question outcomes, if results are showing.
///
/// # Errors
///
/// Returns I/O errors from writing output.
pub fn write_results<W: Write>(session: &QuizSession, out: &mut W) -> io::Result<()> {
    let Some(results) = session.results() else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(
        out,
        "Score: {}% ({} of {} correct)",
        results.score.percentage(),
        results.score.correct(),
        results.score.total()
    )?;
    for (i, outcome) in results.outcomes.iter().enumerate() {
        let Some(question) = session.quiz().question(&outcome.question_id) else {
            continue;
        };
        let mark = if outcome.is_correct() { "correct" } else { "wrong" };
        writeln!(out, "{}. {} [{mark}]", i + 1, question.prompt())?;
        if !outcome.is_correct() {
            let answer = question.option(outcome.correct_option).unwrap_or("");
            writeln!(out, "   correct answer: {answer}")?;
        }
    }
    Ok(())
}
