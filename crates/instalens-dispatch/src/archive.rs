//! Unpacking the CSV a workflow uploads as its artifact.

use std::io::{Cursor, Read};

use instalens_core::{parse_rows, CommentRow};
use zip::ZipArchive;

use crate::error::DispatchError;

/// Bytes of the only CSV file in a zip archive.
///
/// # Errors
///
/// Returns [`DispatchError::Archive`] when the archive is unreadable or does
/// not hold exactly one `.csv` entry.
pub fn extract_single_csv(bytes: &[u8]) -> Result<Vec<u8>, DispatchError> {
    let archive_error = |e: zip::result::ZipError| DispatchError::Archive(e.to_string());
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_error)?;

    let csv_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.to_ascii_lowercase().ends_with(".csv"))
        .map(str::to_string)
        .collect();
    let name = match csv_names.as_slice() {
        [name] => name,
        [] => return Err(DispatchError::Archive("archive holds no CSV file".to_string())),
        many => {
            return Err(DispatchError::Archive(format!(
                "archive holds {} CSV files, expected one",
                many.len()
            )))
        }
    };

    let mut entry = archive.by_name(name).map_err(archive_error)?;
    let mut buffer = Vec::new();
    entry
        .read_to_end(&mut buffer)
        .map_err(|e| DispatchError::Archive(format!("reading {name}: {e}")))?;
    Ok(buffer)
}

/// Parse the artifact archive straight into comment rows.
///
/// # Errors
///
/// See [`extract_single_csv`]; table errors surface as
/// [`DispatchError::Table`].
pub fn rows_from_archive(bytes: &[u8]) -> Result<Vec<CommentRow>, DispatchError> {
    let csv = extract_single_csv(bytes)?;
    Ok(parse_rows(&csv)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use instalens_core::write_rows;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    pub(crate) fn zip_of(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn table() -> Vec<u8> {
        let rows = vec![CommentRow {
            username: "insta_a".to_string(),
            post_number: 2,
            url: "https://www.instagram.com/p/x/".to_string(),
            comments: "nice".to_string(),
            ..CommentRow::default()
        }];
        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        out
    }

    #[test]
    fn reads_the_single_csv() {
        let csv = table();
        let archive = zip_of(&[("01-01_01-31_run.csv", csv.as_slice())]);
        assert_eq!(extract_single_csv(&archive).unwrap(), csv);

        let rows = rows_from_archive(&archive).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].comments, "nice");
    }

    #[test]
    fn ignores_non_csv_entries() {
        let csv = table();
        let archive = zip_of(&[("README.txt", b"hello".as_slice()), ("data.CSV", csv.as_slice())]);
        assert_eq!(rows_from_archive(&archive).unwrap().len(), 1);
    }

    #[test]
    fn rejects_zero_or_many_csvs() {
        let none = zip_of(&[("notes.txt", b"x".as_slice())]);
        assert!(matches!(extract_single_csv(&none), Err(DispatchError::Archive(_))));

        let two = zip_of(&[("a.csv", b"x".as_slice()), ("b.csv", b"y".as_slice())]);
        assert!(matches!(extract_single_csv(&two), Err(DispatchError::Archive(_))));
    }

    #[test]
    fn rejects_non_zip_bytes() {
        assert!(matches!(
            extract_single_csv(b"not a zip"),
            Err(DispatchError::Archive(_))
        ));
    }
}
