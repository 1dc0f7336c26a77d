//! Masked password prompt.

use std::io::{self, BufRead as _};

use console::{Key, Term};

/// Prompts on `term` and reads one line, echoing `mask` for each typed character.
///
/// Backspace removes the last character. When `term` is not attached to a terminal the
/// line is read from standard input without echo handling.
///
/// # Errors
///
/// Propagates terminal I/O failures. End of input before any line is an
/// [`io::ErrorKind::UnexpectedEof`] error.
pub fn ask_masked(term: &Term, message: &str, mask: char) -> io::Result<String> {
    term.write_str(message)?;
    term.flush()?;

    if !term.is_term() {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        return Ok(line.trim_end_matches(['\r', '\n']).to_owned());
    }

    let mut input = String::new();
    let mut buf = [0u8; 4];
    let echo: &str = mask.encode_utf8(&mut buf);
    loop {
        match term.read_key()? {
            Key::Enter => {
                term.write_line("")?;
                return Ok(input);
            }
            Key::Backspace => {
                if input.pop().is_some() {
                    term.clear_chars(1)?;
                }
            }
            Key::Char(c) if !c.is_control() => {
                input.push(c);
                term.write_str(echo)?;
            }
            _ => {}
        }
    }
}

/// Asks for a password on standard output, masking input with `*`, until one is given.
///
/// # Errors
///
/// See [`ask_masked`].
pub fn password(message: &str) -> io::Result<String> {
    let term = Term::stdout();
    password_with(message, |message| ask_masked(&term, message, '*'))
}

/// Calls `ask` with `message` until it returns a non-empty answer.
///
/// # Errors
///
/// Returns the first error from `ask`.
pub fn password_with<F>(message: &str, mut ask: F) -> io::Result<String>
where
    F: FnMut(&str) -> io::Result<String>,
{
    loop {
        let answer = ask(message)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
    }
}
