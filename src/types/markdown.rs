//! Terminal rendering for LLM-produced Markdown
//!
//! Release notes come back as free-form Markdown. Each line is classified
//! into a [`Block`] and painted with the terminal palette; inline markup
//! covers `**bold**`, `` `code` `` and `[text](url)` links.

use crate::ui::rgb::{CORAL, DIM_SEPARATOR, DIM_WHITE, ELECTRIC_PURPLE, ELECTRIC_YELLOW, NEON_CYAN};
use colored::{ColoredString, Colorize};
use std::fmt::Write;

type Rgb = (u8, u8, u8);

fn paint(text: &str, (r, g, b): Rgb) -> ColoredString {
    text.truecolor(r, g, b)
}

/// One Markdown line outside fenced code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block<'a> {
    Heading(usize, &'a str),
    Bullet(usize, &'a str),
    Numbered(usize, &'a str, &'a str),
    Quote(&'a str),
    Rule,
    Blank,
    Text(usize, &'a str),
}

fn classify(line: &str) -> Block<'_> {
    let trimmed = line.trim_start();
    let indent = line.len() - trimmed.len();

    if trimmed.is_empty() {
        return Block::Blank;
    }
    for (level, marker) in [(3, "### "), (2, "## "), (1, "# ")] {
        if let Some(text) = trimmed.strip_prefix(marker) {
            return Block::Heading(level, text);
        }
    }
    if is_rule(trimmed) {
        return Block::Rule;
    }
    if let Some(item) = ["- ", "* ", "+ "]
        .iter()
        .find_map(|marker| trimmed.strip_prefix(marker))
    {
        return Block::Bullet(indent, item);
    }
    if let Some((number, rest)) = split_numbered(trimmed) {
        return Block::Numbered(indent, number, rest);
    }
    if let Some(quote) = trimmed.strip_prefix('>') {
        return Block::Quote(quote.trim_start());
    }
    Block::Text(indent, trimmed)
}

fn is_rule(line: &str) -> bool {
    let line = line.trim_end();
    line.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|rule| line.chars().all(|c| c == *rule))
}

fn split_numbered(line: &str) -> Option<(&str, &str)> {
    let (number, rest) = line.split_once(". ")?;
    (!number.is_empty() && number.chars().all(|c| c.is_ascii_digit())).then_some((number, rest))
}

fn render_block(block: Block<'_>) -> String {
    match block {
        Block::Heading(1, text) => format!(
            "{}  {}  {}",
            paint("━━━", ELECTRIC_PURPLE),
            paint(&text.to_uppercase(), NEON_CYAN).bold(),
            paint("━━━", ELECTRIC_PURPLE)
        ),
        Block::Heading(2, text) => format!(
            "\n{} {} {}",
            paint("─", ELECTRIC_PURPLE),
            paint(text, ELECTRIC_PURPLE).bold(),
            paint(
                &"─".repeat(40usize.saturating_sub(text.chars().count())),
                DIM_SEPARATOR
            )
        ),
        Block::Heading(_, text) => {
            format!("\n{} {}", paint("›", NEON_CYAN), paint(text, NEON_CYAN).bold())
        }
        Block::Bullet(indent, item) => format!(
            "{}  {} {}",
            " ".repeat(indent),
            paint("•", CORAL),
            style_inline(item)
        ),
        Block::Numbered(indent, number, item) => format!(
            "{}  {} {}",
            " ".repeat(indent),
            paint(&format!("{number}."), CORAL).bold(),
            style_inline(item)
        ),
        Block::Quote(text) => format!(
            "  {} {}",
            paint("┃", DIM_SEPARATOR),
            style_inline(text).italic()
        ),
        Block::Rule => paint(&"─".repeat(48), DIM_SEPARATOR).to_string(),
        Block::Blank => String::new(),
        Block::Text(indent, text) => format!("{}{}", " ".repeat(indent), style_inline(text)),
    }
}

/// Render Markdown with the terminal palette
pub fn render_markdown_for_terminal(markdown: &str) -> String {
    let mut output = String::new();
    let mut in_code_block = false;

    for line in markdown.lines() {
        if line.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }

        let rendered = if in_code_block {
            format!("    {}", paint(line, DIM_WHITE))
        } else {
            render_block(classify(line))
        };
        writeln!(output, "{rendered}").expect("write to string should not fail");
    }

    output
}

/// Style inline markup: `**bold**`, `` `code` `` and `[text](url)` links
fn style_inline(content: &str) -> String {
    let mut result = String::new();
    let mut plain = String::new();
    let mut chars = content.chars().peekable();

    let flush = |plain: &mut String, result: &mut String| {
        if !plain.is_empty() {
            result.push_str(&paint(plain, DIM_WHITE).to_string());
            plain.clear();
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '*' if chars.peek() == Some(&'*') => {
                flush(&mut plain, &mut result);
                chars.next();

                let mut bold = String::new();
                while let Some(c) = chars.next() {
                    if c == '*' && chars.peek() == Some(&'*') {
                        chars.next();
                        break;
                    }
                    bold.push(c);
                }
                result.push_str(&paint(&bold, NEON_CYAN).bold().to_string());
            }
            '`' => {
                flush(&mut plain, &mut result);
                let code: String = chars.by_ref().take_while(|c| *c != '`').collect();
                result.push_str(&paint(&code, ELECTRIC_YELLOW).to_string());
            }
            '[' => {
                let mut text = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    text.push(c);
                }

                if !closed {
                    write!(plain, "[{text}").expect("write to string should not fail");
                } else if chars.peek() == Some(&'(') {
                    chars.next();
                    let target: String = chars.by_ref().take_while(|c| *c != ')').collect();

                    flush(&mut plain, &mut result);
                    write!(
                        result,
                        "{} {}",
                        paint(&text, NEON_CYAN).underline(),
                        paint(&format!("({target})"), DIM_SEPARATOR)
                    )
                    .expect("write to string should not fail");
                } else {
                    write!(plain, "[{text}]").expect("write to string should not fail");
                }
            }
            _ => plain.push(ch),
        }
    }

    flush(&mut plain, &mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_plain(markdown: &str) -> String {
        colored::control::set_override(false);
        render_markdown_for_terminal(markdown)
    }

    #[test]
    fn test_classify_lines() {
        assert_eq!(classify("## ✨ Features"), Block::Heading(2, "✨ Features"));
        assert_eq!(classify("  - nested"), Block::Bullet(2, "nested"));
        assert_eq!(classify("3. third"), Block::Numbered(0, "3", "third"));
        assert_eq!(classify("---"), Block::Rule);
        assert_eq!(classify("> quoted"), Block::Quote("quoted"));
        assert_eq!(classify("   "), Block::Blank);
        assert_eq!(classify("2024. A year"), Block::Numbered(0, "2024", "A year"));
        assert_eq!(classify("v1.2. notes"), Block::Text(0, "v1.2. notes"));
    }

    #[test]
    fn test_renders_headers_and_bullets() {
        let rendered = render_plain("# Release\n\n## ✨ Features\n\n- Add **dark mode**\n");
        assert!(rendered.contains("RELEASE"));
        assert!(rendered.contains("✨ Features"));
        assert!(rendered.contains("• Add dark mode"));
    }

    #[test]
    fn test_renders_links_and_code() {
        let rendered = render_plain("See [docs](https://example.com) and `cargo run`");
        assert!(rendered.contains("docs (https://example.com)"));
        assert!(rendered.contains("cargo run"));
        assert!(!rendered.contains('`'));
    }

    #[test]
    fn test_keeps_unclosed_brackets_as_text() {
        let rendered = render_plain("Fixed [#42] crash");
        assert!(rendered.contains("[#42] crash"));
    }

    #[test]
    fn test_unterminated_bracket_is_left_alone() {
        let rendered = render_plain("Fixed [unterminated");
        assert!(rendered.ends_with("Fixed [unterminated\n"));
    }

    #[test]
    fn test_fenced_code_is_indented() {
        let rendered = render_plain("1. First\n```\nlet x = 1;\n```\n");
        assert!(rendered.contains("1. First"));
        assert!(rendered.contains("    let x = 1;"));
        assert!(!rendered.contains("```"));
    }
}
