use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

// RGB tuple constants for use with the `colored` crate's `.truecolor()` method
pub mod rgb {
    pub const ELECTRIC_PURPLE: (u8, u8, u8) = (225, 53, 255);
    pub const NEON_CYAN: (u8, u8, u8) = (128, 255, 234);
    pub const CORAL: (u8, u8, u8) = (255, 106, 193);
    pub const ELECTRIC_YELLOW: (u8, u8, u8) = (241, 250, 140);
    pub const SUCCESS_GREEN: (u8, u8, u8) = (80, 250, 123);
    pub const ERROR_RED: (u8, u8, u8) = (255, 99, 99);
    pub const DIM_WHITE: (u8, u8, u8) = (180, 180, 190);
    pub const DIM_SEPARATOR: (u8, u8, u8) = (60, 60, 70);
}

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

const SPINNER_FRAMES: &str = "✦✧✶✷✸✹✺✻✼✽";

/// Status line flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

impl Tone {
    fn style(self, message: &str) -> ColoredString {
        match self {
            Self::Info => message.cyan().bold(),
            Self::Success => message.green().bold(),
            Self::Warning => message.yellow().bold(),
            Self::Error => message.red().bold(),
        }
    }
}

fn status(tone: Tone, message: &str) {
    match tone {
        // Errors print even in quiet mode
        Tone::Error => eprintln!("{}", tone.style(message)),
        _ if is_quiet_mode() => {}
        _ => println!("{}", tone.style(message)),
    }
}

pub fn set_quiet_mode(enabled: bool) {
    QUIET_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_quiet_mode() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Spinner for a pipeline stage; hidden in quiet mode
pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars(SPINNER_FRAMES)
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn print_info(message: &str) {
    status(Tone::Info, message);
}

pub fn print_success(message: &str) {
    status(Tone::Success, message);
}

pub fn print_warning(message: &str) {
    status(Tone::Warning, message);
}

pub fn print_error(message: &str) {
    status(Tone::Error, message);
}

pub fn print_newline() {
    if !is_quiet_mode() {
        println!();
    }
}

/// Print a `label: value` pair with the label highlighted
pub fn print_labeled(label: &str, value: &str) {
    if !is_quiet_mode() {
        let (r, g, b) = rgb::NEON_CYAN;
        println!("  {} {value}", format!("{label}:").truecolor(r, g, b));
    }
}

pub fn print_version(version: &str) {
    if !is_quiet_mode() {
        println!(
            "{} {} {}",
            gradient("📜 release-scribe"),
            "version".cyan(),
            version.green()
        );
    }
}

/// Color each character along the purple-to-cyan ramp
fn gradient(text: &str) -> String {
    const STOPS: [(u8, u8, u8); 5] = [
        rgb::ELECTRIC_PURPLE,
        (200, 100, 255),
        (180, 150, 250),
        (150, 200, 245),
        rgb::NEON_CYAN,
    ];

    let count = text.chars().count();
    let mut result = String::new();
    for (i, c) in text.chars().enumerate() {
        let stop = if count > 1 {
            i * (STOPS.len() - 1) / (count - 1)
        } else {
            0
        };
        let (r, g, b) = STOPS.get(stop).copied().unwrap_or(rgb::NEON_CYAN);
        write!(result, "{}", c.to_string().truecolor(r, g, b))
            .expect("write to string should not fail");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(gradient("scribe"), "scribe");
        assert_eq!(gradient("x"), "x");
        assert_eq!(gradient(""), "");
    }

    #[test]
    fn test_quiet_mode_toggles() {
        set_quiet_mode(true);
        assert!(is_quiet_mode());
        set_quiet_mode(false);
        assert!(!is_quiet_mode());
    }
}
