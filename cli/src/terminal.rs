//! Terminal host for the list view: prompts on stdin, alerts on stderr.

use std::io::{self, BufRead, Write};

use clientes_core::{Alert, Navigator, Ui};
use tracing::debug;

pub struct TerminalUi {
    assume_yes: bool,
}

impl TerminalUi {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Ui for TerminalUi {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        prompt(message, io::stdin().lock(), io::stderr())
    }

    fn alert(&self, alert: Alert) {
        match alert {
            Alert::Success(message) => eprintln!("{message}"),
            Alert::Error(message) => eprintln!("{message}"),
        }
    }
}

/// A read failure counts as "no".
fn prompt(message: &str, mut input: impl BufRead, mut output: impl Write) -> bool {
    if let Err(e) = write!(output, "{message} [s/N] ").and_then(|()| output.flush()) {
        debug!(error = %e, "could not show confirmation prompt");
    }
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(e) => {
            debug!(error = %e, "could not read confirmation answer");
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    )
}

/// There is no login page in a terminal; point at the `login` command.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        eprintln!("Sessão expirada ou ausente ({route}). Execute `clientes login <token>`.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers() {
        for yes in ["s", "S\n", " sim ", "y", "YES"] {
            assert!(is_yes(yes), "{yes:?}");
        }
        for no in ["", "\n", "n", "não", "talvez"] {
            assert!(!is_yes(no), "{no:?}");
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn prompt_shows_message_and_reads_answer() {
        let mut shown = Vec::new();
        assert!(prompt("Excluir?", "sim\n".as_bytes(), &mut shown));
        assert_eq!(String::from_utf8(shown).unwrap(), "Excluir? [s/N] ");
        assert!(!prompt("Excluir?", "".as_bytes(), Vec::new()));
    }

    #[test]
    fn prompt_survives_unwritable_output() {
        assert!(prompt("Excluir?", "s\n".as_bytes(), BrokenPipe));
        assert!(!prompt("Excluir?", "n\n".as_bytes(), BrokenPipe));
    }

    #[test]
    fn assume_yes_skips_the_prompt() {
        assert!(TerminalUi::new(true).confirm("excluir?"));
    }
}
