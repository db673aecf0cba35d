use std::io::{BufRead, Write};

use regex::Regex;

use crate::error::PromptError;

pub const QUIT: &str = "QUIT";
pub const BODY_TERMINATOR: &str = ".";

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Blocking question/answer helper over a pair of streams.
///
/// Answering `QUIT`, or closing the input, ends the prompt with `PromptError::Quit`.
/// Leaving the program is up to the caller.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Prompt<R, W> {
        Prompt { input, output }
    }

    /// Asks until the answer matches `validator`, printing `error_msg` after each miss.
    pub fn ask(&mut self, question: &str, validator: &Regex, error_msg: &str) -> Result<String, PromptError> {
        writeln!(self.output, "\n{}", question)?;
        self.output.flush()?;

        let mut answer = self.read_answer()?;
        while !validator.is_match(&answer) {
            writeln!(self.output, "\n{}", error_msg)?;
            self.output.flush()?;
            answer = self.read_answer()?;
        }
        writeln!(self.output)?;

        Ok(answer)
    }

    /// Reads free text until a line holding only `.`. Lines keep their newline.
    pub fn ask_body(&mut self, question: &str) -> Result<String, PromptError> {
        writeln!(self.output, "\n{}\n(finish with a line containing only '{}')", question, BODY_TERMINATOR)?;
        self.output.flush()?;

        let mut body = String::new();
        loop {
            let line = self.read_line()?.ok_or(PromptError::Quit)?;
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed == BODY_TERMINATOR {
                break;
            }
            body.push_str(trimmed);
            body.push('\n');
        }

        Ok(body)
    }

    pub fn say(&mut self, text: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), PromptError> {
        write!(self.output, "{}", CLEAR_SCREEN)?;
        self.output.flush()?;
        Ok(())
    }

    fn read_answer(&mut self) -> Result<String, PromptError> {
        let line = self.read_line()?.ok_or(PromptError::Quit)?;
        let answer = line.trim_end_matches(['\r', '\n']).to_string();
        if answer == QUIT {
            return Err(PromptError::Quit);
        }
        Ok(answer)
    }

    fn read_line(&mut self) -> Result<Option<String>, PromptError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompt(input: &str) -> Prompt<Cursor<Vec<u8>>, Vec<u8>> {
        Prompt::new(Cursor::new(input.as_bytes().to_vec()), vec![])
    }

    fn output(prompt: &Prompt<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(prompt.output().clone()).unwrap()
    }

    #[test]
    fn test_ask_retries_until_valid() {
        let mut p = prompt("abc\n\n42\n");
        let number = Regex::new(r"^\d+$").unwrap();
        let answer = p.ask("Pick a number", &number, "Numbers only").unwrap();
        assert_eq!(answer, "42");

        let out = output(&p);
        assert!(out.contains("Pick a number"));
        assert_eq!(out.matches("Numbers only").count(), 2);
    }

    #[test]
    fn test_ask_quit() {
        let mut p = prompt("QUIT\n");
        let any = Regex::new(".*").unwrap();
        assert!(matches!(p.ask("Anything?", &any, "never"), Err(PromptError::Quit)));

        let mut p = prompt("");
        assert!(matches!(p.ask("Anything?", &any, "never"), Err(PromptError::Quit)));
    }

    #[test]
    fn test_ask_body() {
        let mut p = prompt("first line\r\n\nthird line\n.\nafter\n");
        let body = p.ask_body("Write your post").unwrap();
        assert_eq!(body, "first line\n\nthird line\n");

        let mut p = prompt("unterminated\n");
        assert!(matches!(p.ask_body("Write your post"), Err(PromptError::Quit)));
    }

    #[test]
    fn test_clear() {
        let mut p = prompt("");
        p.clear().unwrap();
        assert_eq!(output(&p), CLEAR_SCREEN);
    }
}
