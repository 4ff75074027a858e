use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::formats::BookRecord;

pub const REPORT_FILE_NAME: &str = "books_data.txt";

pub fn render_report(books: &[BookRecord]) -> String {
    let heavy = "=".repeat(80);
    let light = "-".repeat(40);

    let mut out = String::new();
    out.push_str(&format!("Всего книг: {}\n", books.len()));
    out.push_str(&format!("{heavy}\n\n"));

    for (index, book) in books.iter().enumerate() {
        out.push_str(&format!("Книга #{}\n", index + 1));
        out.push_str(&format!("{light}\n"));
        for (key, value) in book.fields() {
            out.push_str(&format!("{key}: {value}\n"));
        }
        out.push_str(&format!("\n{heavy}\n\n"));
    }

    out
}

/// Writes the report into `out_dir` and returns its absolute path.
///
/// Returns `Ok(None)` without touching the filesystem when `books` is empty.
pub fn save_report(out_dir: &Path, books: &[BookRecord]) -> anyhow::Result<Option<PathBuf>> {
    if books.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create report dir: {}", out_dir.display()))?;
    let path = out_dir.join(REPORT_FILE_NAME);

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .with_context(|| format!("open report: {}", path.display()))?;
    file.write_all(render_report(books).as_bytes())
        .with_context(|| format!("write report: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush report: {}", path.display()))?;

    let path = std::path::absolute(&path)
        .with_context(|| format!("resolve report path: {}", path.display()))?;
    Ok(Some(path))
}
