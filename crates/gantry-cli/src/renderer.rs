//! Terminal rendering for markdown output.
//!
//! Rich output goes through termimad; `--no-color` prints the markdown as
//! is. Plan listings get a little extra: milestone rows use their own skin
//! and `_pending_` markers stand out from dated entries.

use termimad::{crossterm::style::Color, MadSkin};

/// How a line of plan markdown is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// `# Plan` and summary headers
    Title,
    /// `## <section>` and deeper
    Heading,
    /// `- **Label** (`id`): ◆ <date>`
    Milestone,
    Entry,
}

impl LineKind {
    fn of(line: &str) -> Self {
        if line.starts_with("## ") || line.starts_with("### ") {
            LineKind::Heading
        } else if line.starts_with('#') {
            LineKind::Title
        } else if line.starts_with("- ") && line.contains(": ◆ ") {
            LineKind::Milestone
        } else {
            LineKind::Entry
        }
    }
}

/// Renders markdown either styled or as plain text.
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
    milestone_skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        // Only `_pending_` markers are italic in plan output.
        skin.italic.set_fg(Color::DarkYellow);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        let mut milestone_skin = skin.clone();
        milestone_skin.bold.set_fg(Color::Magenta);

        Self {
            rich_enabled,
            skin,
            milestone_skin,
        }
    }

    pub fn render(&self, markdown: &str) {
        if !self.rich_enabled {
            print!("{markdown}");
            return;
        }
        for line in markdown.lines() {
            // Keep the hash marks visible so section levels stay readable.
            match LineKind::of(line) {
                LineKind::Title => println!("\x1b[1;36m{line}\x1b[0m"),
                LineKind::Heading => println!("\x1b[34m{line}\x1b[0m"),
                LineKind::Milestone => {
                    self.milestone_skin.print_inline(line);
                    println!();
                }
                LineKind::Entry => {
                    self.skin.print_inline(line);
                    println!();
                }
            }
        }
    }
}
