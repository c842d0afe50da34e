//! REPL input parsing.

use ksearch_core::search::FeedbackScore;

/// Slash commands offered for completion.
pub const COMMANDS: [&str; 7] = [
    "/cite", "/close", "/details", "/sources", "/feedback", "/cancel", "/help",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Plain input: submit a search
    Search(String),
    Cite(i64),
    Close,
    Details,
    Sources,
    Feedback {
        score: FeedbackScore,
        comment: Option<String>,
    },
    Cancel,
    Help,
    Quit,
}

impl Command {
    /// Parses one trimmed, non-empty input line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            return Ok(Command::Quit);
        }
        if !line.starts_with('/') {
            return Ok(Command::Search(line.to_string()));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "/cite" => rest
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<i64>()
                .map(Command::Cite)
                .map_err(|_| "Usage: /cite <source id>".to_string()),
            "/close" => Ok(Command::Close),
            "/details" => Ok(Command::Details),
            "/sources" => Ok(Command::Sources),
            "/cancel" => Ok(Command::Cancel),
            "/help" => Ok(Command::Help),
            "/feedback" => parse_feedback(rest),
            other => Err(format!("Unknown command: {other}")),
        }
    }
}

fn parse_feedback(args: &str) -> Result<Command, String> {
    let (verdict, comment) = match args.split_once(char::is_whitespace) {
        Some((verdict, comment)) => (verdict, Some(comment.trim().to_string())),
        None => (args, None),
    };
    let score = match verdict.to_ascii_lowercase().as_str() {
        "yes" | "y" | "up" => FeedbackScore::Helpful,
        "no" | "n" | "down" => FeedbackScore::NotHelpful,
        _ => return Err("Usage: /feedback yes|no [comment]".to_string()),
    };
    Ok(Command::Feedback {
        score,
        comment: comment.filter(|c| !c.is_empty()),
    })
}
