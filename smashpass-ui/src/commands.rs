//! Input line parsing
//!
//! Each line typed at the prompt maps to one user action. Terminal arrow keys
//! arrive as ANSI escape sequences and navigate like Left/Right.

use smashpass_common::{Error, Result, Verdict};
use std::path::PathBuf;

/// One user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    /// 1-based entity number, as shown on screen
    Goto(i64),
    Toggle { character: String, verdict: Verdict },
    Add(String),
    Remove(String),
    Import(PathBuf),
    Drop(PathBuf),
    Export(Option<PathBuf>),
    Stats,
    Show,
    Image,
    Help,
    Quit,
}

const RIGHT_ARROW: &str = "\u{1b}[C";
const LEFT_ARROW: &str = "\u{1b}[D";

/// Parse one input line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    if line.starts_with(RIGHT_ARROW) {
        return Ok(Some(Command::Next));
    }
    if line.starts_with(LEFT_ARROW) {
        return Ok(Some(Command::Previous));
    }

    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "n" | "next" | "right" => Command::Next,
        "p" | "prev" | "previous" | "left" => Command::Previous,
        "g" | "goto" => {
            let number = rest
                .parse::<i64>()
                .map_err(|_| Error::InvalidInput(format!("'{}' is not an entity number", rest)))?;
            Command::Goto(number)
        }
        "s" | "smash" => Command::Toggle {
            character: required(word, rest)?,
            verdict: Verdict::Smash,
        },
        "x" | "pass" => Command::Toggle {
            character: required(word, rest)?,
            verdict: Verdict::Pass,
        },
        "a" | "add" => Command::Add(required(word, rest)?),
        "rm" | "remove" => Command::Remove(required(word, rest)?),
        "i" | "import" => Command::Import(PathBuf::from(required(word, rest)?)),
        "drop" => Command::Drop(PathBuf::from(required(word, rest)?)),
        "e" | "export" => Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "stats" => Command::Stats,
        "show" | "." => Command::Show,
        "image" | "img" => Command::Image,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => {
            return Err(Error::InvalidInput(format!(
                "unknown command '{}' (type 'help')",
                other
            )))
        }
    };
    Ok(Some(command))
}

fn required(word: &str, rest: &str) -> Result<String> {
    if rest.is_empty() {
        return Err(Error::InvalidInput(format!("'{}' needs an argument", word)));
    }
    Ok(rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line_is_nothing() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("").unwrap(), None);
    }

    #[test]
    fn test_navigation_words_and_arrows() {
        assert_eq!(parse("n"), Command::Next);
        assert_eq!(parse("RIGHT"), Command::Next);
        assert_eq!(parse("\u{1b}[C"), Command::Next);
        assert_eq!(parse("prev"), Command::Previous);
        assert_eq!(parse("\u{1b}[D"), Command::Previous);
        assert_eq!(parse("goto 25"), Command::Goto(25));
    }

    #[test]
    fn test_names_keep_inner_spaces() {
        assert_eq!(
            parse("smash  Mary Jane "),
            Command::Toggle {
                character: "Mary Jane".to_string(),
                verdict: Verdict::Smash
            }
        );
        assert_eq!(parse("add Team Rocket"), Command::Add("Team Rocket".to_string()));
    }

    #[test]
    fn test_export_path_optional() {
        assert_eq!(parse("export"), Command::Export(None));
        assert_eq!(
            parse("export /tmp/out"),
            Command::Export(Some(PathBuf::from("/tmp/out")))
        );
    }

    #[test]
    fn test_missing_argument() {
        assert!(matches!(parse_command("pass").unwrap_err(), Error::InvalidInput(_)));
        assert!(matches!(parse_command("import").unwrap_err(), Error::InvalidInput(_)));
    }

    #[test]
    fn test_bad_goto_and_unknown_word() {
        assert!(matches!(parse_command("goto ten").unwrap_err(), Error::InvalidInput(_)));
        assert!(matches!(parse_command("dance").unwrap_err(), Error::InvalidInput(_)));
    }
}
