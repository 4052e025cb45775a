use colored::Colorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);
static VERBOSE: AtomicBool = AtomicBool::new(false);
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Honor NO_COLOR and disable colors when stdout is not a terminal
pub fn init_colors() {
    if std::env::var_os("NO_COLOR").is_some() || !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

pub fn mark_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

pub fn header(title: &str) {
    if is_quiet() {
        return;
    }
    println!("\n{}", title.bold().underline());
}

pub fn success(msg: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn info(msg: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Only shown with --verbose
pub fn verbose(msg: &str) {
    if !is_verbose() {
        return;
    }
    println!("{} {}", "·".bright_black(), msg.dimmed());
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

pub fn keyval(key: &str, val: &str) {
    println!("{}: {}", key.bold(), val);
}

pub fn indent(msg: &str, level: usize) {
    let spaces = " ".repeat(level * 2);
    println!("{}{}", spaces, msg);
}

/// Console answer to a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
    Quit,
}

/// Ask a yes/no(/quit) question on the terminal.
///
/// Returns `No` when stdin is not a terminal or cannot be read, so nothing is
/// removed or upgraded without an explicit answer.
pub fn prompt_choice(question: &str, allow_quit: bool) -> Choice {
    if !atty::is(atty::Stream::Stdin) {
        warning(&format!("{} (no terminal, answering no)", question));
        return Choice::No;
    }

    let options = if allow_quit { "[y/N/q]" } else { "[y/N]" };
    print!("{} {} {} ", "?".yellow().bold(), question, options);

    if let Err(e) = io::stdout().flush() {
        eprintln!("\nWarning: Failed to flush terminal: {}", e);
        return Choice::No;
    }

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(_) => parse_choice(&input, allow_quit),
        Err(e) => {
            eprintln!("\nWarning: Failed to read input: {}", e);
            Choice::No
        }
    }
}

fn parse_choice(input: &str, allow_quit: bool) -> Choice {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Choice::Yes,
        "q" | "quit" if allow_quit => Choice::Quit,
        _ => Choice::No,
    }
}
