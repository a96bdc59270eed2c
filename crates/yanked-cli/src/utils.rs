use std::{
    fmt::Display,
    io::Write,
    sync::{LazyLock, PoisonError, RwLock},
};

use nu_ansi_term::Color;
use ureq::http::{HeaderName, HeaderValue};
use yanked_core::{
    error::{ErrorContext, YankedError},
    YankedResult,
};

pub struct Icons;

impl Icons {
    pub const ARROW: &str = "→";
    pub const CALENDAR: &str = "📅";
    pub const CHECK: &str = "✓";
    pub const CHECKSUM: &str = "🔏";
    pub const CROSS: &str = "✗";
    pub const LINK: &str = "🔗";
    pub const PACKAGE: &str = "📦";
    pub const SCRIPT: &str = "📃";
    pub const TYPE: &str = "📁";
    pub const WARNING: &str = "⚠";
}

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn disable_color() {
    *COLOR.write().unwrap_or_else(PoisonError::into_inner) = false;
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap_or_else(PoisonError::into_inner);
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Answer to an interactive question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt<T> {
    Answer(T),
    /// The user typed `quit`/`exit` or closed stdin.
    Cancelled,
}

impl<T> Prompt<T> {
    pub fn answer(self) -> Option<T> {
        match self {
            Prompt::Answer(value) => Some(value),
            Prompt::Cancelled => None,
        }
    }
}

pub fn is_cancel_word(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "quit" | "exit")
}

pub fn interactive_ask(ques: &str) -> YankedResult<Prompt<String>> {
    print!("{ques}");

    std::io::stdout()
        .flush()
        .with_context(|| "flushing stdout stream".to_string())?;

    let mut response = String::new();
    let read = std::io::stdin()
        .read_line(&mut response)
        .with_context(|| "reading input from stdin".to_string())?;

    if read == 0 {
        println!();
        return Ok(Prompt::Cancelled);
    }

    let response = response.trim();
    if is_cancel_word(response) {
        return Ok(Prompt::Cancelled);
    }
    Ok(Prompt::Answer(response.to_owned()))
}

pub fn confirm_action(message: &str) -> YankedResult<Prompt<bool>> {
    let response = interactive_ask(&format!("{} [y/N]: ", message))?;
    Ok(match response {
        Prompt::Answer(answer) => {
            Prompt::Answer(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
        }
        Prompt::Cancelled => Prompt::Cancelled,
    })
}

/// Parses a `Name: value` request header.
pub fn parse_header(header: &str) -> YankedResult<(HeaderName, HeaderValue)> {
    let invalid = |reason: &str| YankedError::Custom(format!("Invalid header '{header}': {reason}"));

    let (key, value) = header
        .split_once(':')
        .ok_or_else(|| invalid("expected 'Name: value'"))?;
    let key = key
        .trim()
        .parse::<HeaderName>()
        .map_err(|_| invalid("bad header name"))?;
    let value = value
        .trim()
        .parse::<HeaderValue>()
        .map_err(|_| invalid("bad header value"))?;

    Ok((key, value))
}

/// Shortens a fingerprint for display.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}
