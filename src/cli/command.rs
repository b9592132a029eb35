/// Commands typed at the `>` prompt. Numbers are 1-based, as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pick(usize),
    Back,
    Jump(usize),
    StartOver,
    Finish,
    History,
    Review(usize),
    ExitReview,
    Clear,
    Path,
    Help,
    Quit,
}

fn number(arg: Option<&str>) -> Option<usize> {
    arg?.parse().ok().filter(|n| *n > 0)
}

/// Parse one input line. `None` for anything unrecognised.
pub fn parse(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let arg = words.next();
    if words.next().is_some() {
        return None;
    }

    if let Ok(n) = head.parse::<usize>() {
        return (n > 0 && arg.is_none()).then_some(Command::Pick(n));
    }

    match (head.to_ascii_lowercase().as_str(), arg) {
        ("b" | "back", None) => Some(Command::Back),
        ("j" | "jump", arg) => number(arg).map(Command::Jump),
        ("s" | "start", None) => Some(Command::StartOver),
        ("f" | "finish", None) => Some(Command::Finish),
        ("h" | "history", None) => Some(Command::History),
        ("r" | "review", arg) => number(arg).map(Command::Review),
        ("x" | "exit", None) => Some(Command::ExitReview),
        ("clear", None) => Some(Command::Clear),
        ("p" | "path", None) => Some(Command::Path),
        ("?" | "help", None) => Some(Command::Help),
        ("q" | "quit", None) => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_pick_choices() {
        assert_eq!(parse("2"), Some(Command::Pick(2)));
        assert_eq!(parse("  3 "), Some(Command::Pick(3)));
        assert_eq!(parse("0"), None);
        assert_eq!(parse("2 3"), None);
    }

    #[test]
    fn test_words_and_aliases() {
        assert_eq!(parse("b"), Some(Command::Back));
        assert_eq!(parse("BACK"), Some(Command::Back));
        assert_eq!(parse("finish"), Some(Command::Finish));
        assert_eq!(parse("?"), Some(Command::Help));
        assert_eq!(parse("q"), Some(Command::Quit));
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(parse("j 2"), Some(Command::Jump(2)));
        assert_eq!(parse("review 1"), Some(Command::Review(1)));
        assert_eq!(parse("r"), None);
        assert_eq!(parse("r 0"), None);
        assert_eq!(parse("r one"), None);
        assert_eq!(parse("b 1"), None);
    }

    #[test]
    fn test_blank_and_unknown() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("dance"), None);
    }
}
