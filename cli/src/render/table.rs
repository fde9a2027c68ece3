//! Box-drawn tables for the terminal.

use std::fmt;

pub struct Table {
    labels: Vec<ColFmt>,
}

struct BoxFmt {
    width: usize,
    text: String,
}

struct ColFmt {
    width: usize,
    right: bool,
    label: BoxFmt,
    boxes: Vec<BoxFmt>,
}

impl Table {
    pub fn new(labels: &[&str]) -> Self {
        Self {
            labels: labels
                .iter()
                .map(|l| ColFmt::with_label(BoxFmt::from(l.to_string())))
                .collect(),
        }
    }

    /// Right-align the contents of column `idx` (amounts)
    pub fn right_aligned(mut self, idx: usize) -> Self {
        if let Some(col) = self.labels.get_mut(idx) {
            col.right = true;
        }
        self
    }

    /// Missing cells are left blank, extra cells are dropped
    pub fn push_row(&mut self, cells: Vec<String>) {
        let mut cells = cells.into_iter();
        for col in &mut self.labels {
            col.push(BoxFmt::from(cells.next().unwrap_or_default()));
        }
    }

    fn row_count(&self) -> usize {
        self.labels.first().map_or(0, |c| c.boxes.len())
    }

    fn border(&self, f: &mut fmt::Formatter, left: &str, join: &str, right: &str) -> fmt::Result {
        write!(f, "{}", left)?;
        for (i, c) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", join)?;
            }
            c.hline(f)?;
        }
        writeln!(f, "{}", right)
    }
}

impl BoxFmt {
    fn from(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }

    fn write(&self, f: &mut fmt::Formatter, width: usize, right: bool) -> fmt::Result {
        let padding = " ".repeat(width.saturating_sub(self.width));
        if right {
            write!(f, " {}{} ", padding, self.text)
        } else {
            write!(f, " {}{} ", self.text, padding)
        }
    }
}

impl ColFmt {
    fn with_label(label: BoxFmt) -> Self {
        Self {
            width: label.width,
            right: false,
            label,
            boxes: Vec::new(),
        }
    }

    fn push(&mut self, b: BoxFmt) {
        self.width = self.width.max(b.width);
        self.boxes.push(b);
    }

    fn hline(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", HLINE.repeat(self.width + 2))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.border(f, ULCORNER, LOJOIN, URCORNER)?;

        write!(f, "{}", VLINE)?;
        for c in &self.labels {
            c.label.write(f, c.width, false)?;
            write!(f, "{}", VLINE)?;
        }
        writeln!(f)?;

        self.border(f, RTJOIN, CROSS, LTJOIN)?;

        for idx in 0..self.row_count() {
            write!(f, "{}", VLINE)?;
            for c in &self.labels {
                c.boxes[idx].write(f, c.width, c.right)?;
                write!(f, "{}", VLINE)?;
            }
            writeln!(f)?;
        }

        self.border(f, DLCORNER, HIJOIN, DRCORNER)
    }
}

const HLINE: &str = "─";
const VLINE: &str = "│";
const ULCORNER: &str = "┌";
const URCORNER: &str = "┐";
const DLCORNER: &str = "└";
const DRCORNER: &str = "┘";
const LTJOIN: &str = "┤";
const RTJOIN: &str = "├";
const HIJOIN: &str = "┴";
const LOJOIN: &str = "┬";
const CROSS: &str = "┼";
