//! Diagnostic rendering: message, source line with expanded tabs, and a
//! tilde underline covering the hint.

use std::fmt::Write;

use crate::{Diagnostic, Diagnostics, next_tab};

impl Diagnostics<'_> {
    /// Renders every diagnostic in discovery order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for diagnostic in self.entries() {
            render_diagnostic(&mut out, diagnostic, self.file(), self.tab_width());
        }
        out
    }
}

fn render_diagnostic(out: &mut String, diagnostic: &Diagnostic<'_>, file: &str, tab_width: u8) {
    let info = &diagnostic.info;

    if info.is_detached() {
        let _ = writeln!(out, "{}", diagnostic.kind);
        if !info.hint.is_empty() {
            let _ = writeln!(out, "{}", info.hint);
        }
        return;
    }

    let _ = writeln!(
        out,
        "In file {file}, line {}, column {}:",
        info.position.line, info.position.column
    );
    let _ = writeln!(out, "{}", diagnostic.kind);

    // Source line with tabs expanded to the configured width.
    let prefix = format!("{} | ", info.position.line);
    let _ = write!(out, "{prefix}");
    let mut column = 1u32;
    for byte in info.line.bytes() {
        if byte == b'\t' {
            let stop = next_tab(column, tab_width);
            for _ in column..stop {
                out.push(' ');
            }
            column = stop;
        } else {
            out.push(char::from(byte));
            column += 1;
        }
    }
    out.push('\n');

    // Underline aligned under the hint, expanding tabs the same way.
    for _ in 0..prefix.len() {
        out.push(' ');
    }
    let offset = hint_offset(info.line, info.hint);
    let mut column = 1u32;
    for byte in info.line.bytes().take(offset) {
        if byte == b'\t' {
            let stop = next_tab(column, tab_width);
            for _ in column..stop {
                out.push(' ');
            }
            column = stop;
        } else {
            out.push(' ');
            column += 1;
        }
    }
    for _ in 0..info.hint.len().max(1) {
        out.push('~');
    }
    out.push('\n');
}

/// Byte offset of the hint inside its line. Both slices borrow the same
/// source buffer, so pointer distance is the offset.
fn hint_offset(line: &str, hint: &str) -> usize {
    let line_address = line.as_ptr() as usize;
    let hint_address = hint.as_ptr() as usize;
    hint_address.saturating_sub(line_address).min(line.len())
}
