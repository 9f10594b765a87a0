use super::TextLayout;

/// Fixed-cell layout: every character is one column, every line the same
/// height. Hard breaks on `\n`, soft wraps every `columns` characters.
///
/// Empty text still has one (empty) line, so there is always a line to
/// anchor to.
#[derive(Debug, Clone)]
pub struct MonospaceLayout {
    /// Start offset of each visual line, ascending
    starts: Vec<usize>,
    columns: usize,
    line_height: i32,
}

impl MonospaceLayout {
    pub fn new(text: &str, columns: usize, line_height: i32) -> Self {
        let columns = columns.max(1);
        let line_height = line_height.max(1);

        let mut starts = vec![0];
        let mut col = 0;
        for (offset, ch) in text.chars().enumerate() {
            if ch == '\n' {
                starts.push(offset + 1);
                col = 0;
                continue;
            }
            if col == columns {
                starts.push(offset);
                col = 0;
            }
            col += 1;
        }

        Self {
            starts,
            columns,
            line_height,
        }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn line_height(&self) -> i32 {
        self.line_height
    }
}

impl TextLayout for MonospaceLayout {
    fn line_for_offset(&self, offset: usize) -> usize {
        // Last line whose start is <= offset
        self.starts.partition_point(|&start| start <= offset).saturating_sub(1)
    }

    fn line_for_vertical(&self, y: i32) -> usize {
        if y <= 0 {
            return 0;
        }
        let line = (y / self.line_height) as usize;
        line.min(self.starts.len() - 1)
    }

    fn line_top(&self, line: usize) -> i32 {
        let line = line.min(self.starts.len() - 1);
        scaled(line, self.line_height)
    }

    fn line_start(&self, line: usize) -> usize {
        self.starts[line.min(self.starts.len() - 1)]
    }

    fn height(&self) -> i32 {
        scaled(self.starts.len(), self.line_height)
    }
}

/// `lines * line_height`, saturating at `i32::MAX`
fn scaled(lines: usize, line_height: i32) -> i32 {
    i32::try_from(lines)
        .unwrap_or(i32::MAX)
        .saturating_mul(line_height)
}
