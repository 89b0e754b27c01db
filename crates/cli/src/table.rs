// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Left-aligned text tables.
//!
//! Cells may carry ANSI color; widths are measured on visible characters.

use std::io::Write;

use crate::color;

pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(color::visible_width(cell));
            }
        }
        widths
    }

    pub fn render(&self, out: &mut dyn Write) {
        let widths = self.widths();
        let header: Vec<String> = self.headers.iter().map(|h| color::header(h)).collect();
        write_row(out, &header, &widths);
        for row in &self.rows {
            write_row(out, row, &widths);
        }
    }
}

fn write_row(out: &mut dyn Write, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    let last = cells.len().saturating_sub(1);
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        line.push_str(cell);
        if i < last {
            let pad = width.saturating_sub(color::visible_width(cell)) + 2;
            line.extend(std::iter::repeat(' ').take(pad));
        }
    }
    let _ = writeln!(out, "{}", line);
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
