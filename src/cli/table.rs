use std::sync::Arc;

use {
    colored::{ColoredString, Colorize},
    unicode_segmentation::UnicodeSegmentation,
    unicode_width::UnicodeWidthStr,
};

use crate::{catalog::Record, prefs::Theme};

const SEPARATOR: &str = "  ";
const ELLIPSIS: char = '…';

// Column name and maximum display width. The id column is never truncated
// so it can be pasted back into `--score` and `--audio`.
const COLUMNS: [(&str, Option<usize>); 5] = [
    ("ID", None),
    ("TITLE", Some(40)),
    ("AUTHOR", Some(28)),
    ("EVENT", Some(20)),
    ("RESOURCES", None),
];

// Prints records as an aligned table, colored for the current theme.
#[derive(Clone, Copy, Debug)]
pub struct Table {
    theme: Theme,
}

impl Table {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn render(&self, records: &[Arc<Record>]) -> String {
        let rows: Vec<[String; 5]> = records
            .iter()
            .map(|record| {
                [
                    record.id().to_string(),
                    record.title().to_string(),
                    record.author().to_string(),
                    record.event().to_string(),
                    resources(record),
                ]
            })
            .collect();

        let widths: Vec<usize> = COLUMNS
            .iter()
            .enumerate()
            .map(|(i, (name, max))| {
                let widest = rows
                    .iter()
                    .map(|row| row[i].width())
                    .chain(std::iter::once(name.width()))
                    .max()
                    .unwrap_or_default();
                max.map_or(widest, |max| widest.min(max))
            })
            .collect();

        let mut out = String::new();

        let header: Vec<String> = COLUMNS
            .iter()
            .zip(&widths)
            .map(|((name, _), width)| self.header(&pad(name, *width)).to_string())
            .collect();
        push_line(&mut out, &header);

        for row in &rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, width))| {
                    let cell = pad(&truncate(cell, *width), *width);
                    match i {
                        1 => self.title(&cell).to_string(),
                        _ => self.dim(&cell).to_string(),
                    }
                })
                .collect();
            push_line(&mut out, &cells);
        }

        out
    }

    pub fn render_values(&self, values: &[String]) -> String {
        values.iter().fold(String::new(), |mut out, value| {
            out.push_str(value);
            out.push('\n');
            out
        })
    }

    pub fn footer(&self, shown: usize, matched: usize) -> String {
        let text = format!("showing {} of {} pieces", shown, matched);
        self.dim(&text).to_string()
    }

    pub fn prefix(&self) -> ColoredString {
        match self.theme {
            Theme::Dark => "[repertoire]:".bright_green().bold(),
            Theme::Light => "[repertoire]:".green().bold(),
        }
    }

    fn header(&self, text: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => text.bright_cyan().bold(),
            Theme::Light => text.blue().bold(),
        }
    }

    fn title(&self, text: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => text.bright_white(),
            Theme::Light => text.black(),
        }
    }

    fn dim(&self, text: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => text.white(),
            Theme::Light => text.bright_black(),
        }
    }
}

// "score" followed by the voices with a recording, e.g. "score soprano alto".
fn resources(record: &Record) -> String {
    let mut parts = Vec::new();
    if record.has_score() {
        parts.push("score");
    }
    parts.extend(record.available_voices());
    parts.join(" ")
}

fn push_line(out: &mut String, cells: &[String]) {
    out.push_str(cells.join(SEPARATOR).trim_end());
    out.push('\n');
}

// Pads `text` with spaces up to `width` display columns.
pub fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

// Cuts `text` on a grapheme boundary so it fits in `width` display columns,
// marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }

    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;

    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w > width - 1 {
            break;
        }
        used += w;
        out.push_str(grapheme);
    }

    out.push(ELLIPSIS);
    out
}
