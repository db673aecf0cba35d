use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use spdlog::{debug, warn};

use crate::error::ImportError;
use crate::post::{split_tags, ParsedPost, HEADER_DELIMITER};
use crate::text_utils::parse_date_time;

/// Parses one legacy post file.
///
/// The file handle is dropped on every return path, including parse failures.
pub fn parse_post_file(path: &Path) -> Result<ParsedPost, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_post_reader(path, BufReader::new(file))
}

/// Parses a post from any buffered reader. `path` is only used for error reports.
pub fn parse_post_reader<R: BufRead>(path: &Path, mut reader: R) -> Result<ParsedPost, ImportError> {
    let mut fields = parse_header(path, &mut reader)?;

    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|source| io_error(path, source))?;

    let title = take_field(path, &mut fields, "title")?;
    let format = take_field(path, &mut fields, "format")?;
    let tags = split_tags(&take_field(path, &mut fields, "tags")?);
    let raw_date = take_field(path, &mut fields, "date")?;
    let date = parse_date_time(&raw_date).map_err(|e| {
        debug!("{} - file={}", e, path.display());
        ImportError::DateParseError {
            path: path.to_path_buf(),
            value: raw_date.clone(),
        }
    })?;

    Ok(ParsedPost {
        title,
        tags,
        format,
        date,
        text,
        extra: fields,
    })
}

/// Reads the delimited header block and leaves the reader at the first body byte.
fn parse_header<R: BufRead>(path: &Path, reader: &mut R) -> Result<BTreeMap<String, String>, ImportError> {
    let malformed = || ImportError::MalformedHeader { path: path.to_path_buf() };

    let mut line = String::new();
    if read_line(path, reader, &mut line)? == 0 || !is_delimiter(&line) {
        return Err(malformed());
    }

    let mut fields = BTreeMap::new();
    let mut line_no = 1;
    loop {
        line.clear();
        if read_line(path, reader, &mut line)? == 0 {
            // End of file before the closing delimiter
            return Err(malformed());
        }
        line_no += 1;

        if is_delimiter(&line) {
            break;
        }

        let (key, val) = match parse_header_line(chomp(&line)) {
            Some((k, v)) => (k, v),
            None => {
                return Err(ImportError::MalformedHeaderLine {
                    path: path.to_path_buf(),
                    line_no,
                    line: chomp(&line).to_string(),
                })
            }
        };

        if let Some(previous) = fields.insert(key.to_string(), val.to_string()) {
            warn!("Header '{}' repeated in {}, keeping the last value (dropped {:?})", key, path.display(), previous);
        }
    }

    if fields.is_empty() {
        return Err(malformed());
    }

    Ok(fields)
}

/// Matches a `key: value` header line. Keys are ASCII letters only.
/// A bare `key:` at the end of the line has an empty value.
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    lazy_static! {
        static ref HEADER_REGEX: Regex = Regex::new(r"^(?P<key>[a-zA-Z]+):(?:\s+(?P<value>.*))?$").unwrap();
    }

    HEADER_REGEX.captures(line).and_then(|cap| {
        let key = cap.name("key").map(|key| key.as_str())?;
        let val = cap.name("value").map_or("", |val| val.as_str());
        Some((key, val))
    })
}

fn is_delimiter(line: &str) -> bool {
    chomp(line) == HEADER_DELIMITER
}

fn chomp(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

fn take_field(path: &Path, fields: &mut BTreeMap<String, String>, field: &'static str) -> Result<String, ImportError> {
    fields.remove(field).ok_or_else(|| ImportError::MissingField {
        path: path.to_path_buf(),
        field,
    })
}

fn read_line<R: BufRead>(path: &Path, reader: &mut R, buf: &mut String) -> Result<usize, ImportError> {
    reader.read_line(buf).map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: io::Error) -> ImportError {
    ImportError::Io {
        path: path.to_path_buf(),
        source,
    }
}
