use super::schema::FileRow;
use console::style;

/// Request, raised from a table row, to delete that row's file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteIntent {
    pub file_name: String,
}

/// Text table over a page of rows. Row numbers start at `offset + 1`.
pub struct FileTable<'a> {
    rows: &'a [FileRow],
    offset: usize,
}

const HEADERS: [&str; 5] = ["#", "File", "Title", "Description", "Status"];

impl<'a> FileTable<'a> {
    pub fn new(rows: &'a [FileRow]) -> Self {
        Self { rows, offset: 0 }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Maps a displayed row number back to its file.
    pub fn delete_intent(&self, number: usize) -> Option<DeleteIntent> {
        let index = number.checked_sub(self.offset + 1)?;
        self.rows.get(index).map(|row| DeleteIntent {
            file_name: row.file_name.clone(),
        })
    }

    pub fn render(&self, colored: bool) -> String {
        if self.rows.is_empty() {
            return "No files uploaded yet.\n".to_string();
        }

        let cells: Vec<[String; 4]> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                [
                    (self.offset + i + 1).to_string(),
                    row.file_name.clone(),
                    row.title.clone(),
                    row.description.clone(),
                ]
            })
            .collect();

        let mut widths = [0usize; 4];
        for (w, h) in widths.iter_mut().zip(HEADERS) {
            *w = h.chars().count();
        }
        for line in &cells {
            for (w, cell) in widths.iter_mut().zip(line) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        for (w, h) in widths.iter().zip(HEADERS) {
            out.push_str(&pad(h, *w));
            out.push_str("  ");
        }
        out.push_str(HEADERS[4]);
        out.push('\n');

        for (line, row) in cells.iter().zip(self.rows) {
            for (w, cell) in widths.iter().zip(line) {
                out.push_str(&pad(cell, *w));
                out.push_str("  ");
            }
            let status = if row.valid { "valid" } else { "invalid" };
            if colored {
                let styled = if row.valid {
                    style(status).green()
                } else {
                    style(status).red()
                };
                out.push_str(&styled.to_string());
            } else {
                out.push_str(status);
            }
            out.push('\n');
        }
        out
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut s = text.to_string();
    s.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    s
}
