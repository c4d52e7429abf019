// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use jlife_records::{CellValue, Table};

use crate::error::IoError;

pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter).map_err(|source| IoError::Csv { path: path.to_path_buf(), source })
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter).map_err(|source| IoError::Csv { path: path.to_path_buf(), source })
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must split the header line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header width, weighted by that width
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Excel-exported CSVs are often Windows-1252)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read { path: path.to_path_buf(), source };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(path = %path.display(), "not UTF-8, decoding as Windows-1252");
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// First record is the header. Blank fields read as empty cells; lines with
/// no content at all are skipped.
fn import_from_string(content: &str, delimiter: u8) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Ok(Table::default()),
    };
    let mut table = Table::new(header.iter().map(|h| h.trim().to_string()).collect());

    for result in records {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let values = record
            .iter()
            .map(|field| if field.is_empty() { CellValue::Empty } else { CellValue::Text(field.to_string()) })
            .collect();
        table.push_values(values);
    }

    Ok(table)
}

pub fn export(table: &Table, path: &Path) -> Result<(), IoError> {
    export_with_delimiter(table, path, b',')
}

pub fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), IoError> {
    write_all(table, path, delimiter).map_err(|source| IoError::Csv { path: path.to_path_buf(), source })
}

fn write_all(table: &Table, path: &Path, delimiter: u8) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    writer.write_record(table.columns())?;
    for values in table.values() {
        writer.write_record(values.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter("single\nvalue\n"), b',');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_import_header_and_blanks() {
        let table = import_from_string("會員編號,中文姓名,電話\nM001,陳大文,\n,,\nM002,李小明,61234567\n", b',').unwrap();
        assert_eq!(table.columns(), ["會員編號", "中文姓名", "電話"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "電話"), Some(&CellValue::Empty));
        assert_eq!(table.cell(1, "電話"), Some(&CellValue::Text("61234567".into())));
    }

    #[test]
    fn test_short_rows_padded() {
        let table = import_from_string("a,b,c\n1\n", b',').unwrap();
        assert_eq!(table.cell(0, "c"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_empty_input() {
        let table = import_from_string("", b',').unwrap();
        assert!(table.columns().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_windows_1252_and_bom() {
        let dir = tempfile::tempdir().unwrap();
        let latin = dir.path().join("latin.csv");
        std::fs::write(&latin, b"name\nCaf\xe9\n").unwrap();
        assert_eq!(read_file_as_utf8(&latin).unwrap(), "name\nCafé\n");

        let bom = dir.path().join("bom.csv");
        std::fs::write(&bom, "\u{feff}會員編號\nM1\n").unwrap();
        let table = import(&bom).unwrap();
        assert_eq!(table.columns(), ["會員編號"]);
    }
}
