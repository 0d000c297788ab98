//! Colored output helpers for CLI
//!
//! Terminal rendering for the Conclave CLI: status lines, the roster table and
//! collaboration transcripts from `ask`.

use crate::types::{AgentAnswer, CollaborationMode};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the Conclave banner
    pub fn banner(&self) {
        let title = "C O N C L A V E";
        let tagline = "Multi-persona collaboration server";
        if self.colored {
            println!("\n   {}", title.bright_magenta().bold());
            println!(
                "   {} {}\n",
                tagline.bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!("\n   {}\n   {} v{}\n", title, tagline, env!("CARGO_PKG_VERSION"));
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file skipped message
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print completion message with next steps
    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "🚀".green(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Print a table header row with fixed column widths
    pub fn table_header(&self, columns: &[(&str, usize)]) {
        let header = pad_row(columns.iter().copied());
        let rule_len: usize = columns.iter().map(|(_, w)| w + 1).sum();
        if self.colored {
            println!("    {}", header.bright_white().bold());
            println!("    {}", "─".repeat(rule_len).dimmed());
        } else {
            println!("    {}", header);
            println!("    {}", "-".repeat(rule_len));
        }
    }

    /// Print a table row; widths must match the header
    pub fn table_row(&self, values: &[(&str, usize)]) {
        println!("    {}", pad_row(values.iter().copied()));
    }

    /// Print one persona's answer from a collaboration
    pub fn answer(&self, index: usize, answer: &AgentAnswer) {
        let label = format!(
            "{}. {} {}",
            index, answer.persona.emoji, answer.persona.name
        );
        if self.colored {
            if answer.failed {
                println!("\n  {} {}", label.red().bold(), "(failed)".red());
                println!("  {}", answer.content.red());
            } else {
                println!("\n  {}", label.bright_cyan().bold());
                println!("{}", indent(&answer.content));
            }
        } else if answer.failed {
            println!("\n  {} (failed)\n  {}", label, answer.content);
        } else {
            println!("\n  {}\n{}", label, indent(&answer.content));
        }
    }

    /// Print the collaboration mode line
    pub fn mode(&self, mode: CollaborationMode, batch_id: Option<&str>) {
        let text = match (mode, batch_id) {
            (CollaborationMode::Sequential, _) => "sequential".to_string(),
            (CollaborationMode::BatchPrimary, Some(id)) => format!("batch ({})", id),
            (CollaborationMode::BatchPrimary, None) => "batch".to_string(),
            (CollaborationMode::BatchFallback, _) => "batch (parallel fallback)".to_string(),
        };
        self.kv("Mode", &text);
    }

    /// Print the final synthesis
    pub fn synthesis(&self, text: &str) {
        self.header("Synthesis");
        println!("{}", indent(text));
    }
}

fn pad_row<'a>(cells: impl Iterator<Item = (&'a str, usize)>) -> String {
    cells
        .map(|(text, width)| format!("{:<width$}", truncate_cell(text, width), width = width))
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_cell(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
