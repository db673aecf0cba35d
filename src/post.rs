use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter, Write};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::text_utils::format_header_date;

pub const HEADER_DELIMITER: &str = ";;;;;";
pub const TAG_SEPARATOR: &str = ", ";

/// A post read from a legacy `.post` file, or composed in the terminal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedPost {
    pub title: String,
    pub tags: Vec<String>,
    pub format: String,
    pub date: NaiveDateTime,
    pub text: String,
    /// Header fields other than title, tags, format and date, keyed as written.
    pub extra: BTreeMap<String, String>,
}

impl Display for ParsedPost {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "title={}, date={}, format={}\ntags={}\n",
               self.title,
               self.date,
               self.format,
               self.tags.join(TAG_SEPARATOR),
        )?;
        for (key, val) in &self.extra {
            writeln!(f, "{}={}", key, val)?;
        }
        write!(f, "text:\n{}", self.text)
    }
}

impl ParsedPost {
    /// Builds a new post from the answers typed in the compose prompt.
    pub fn compose(title: &str, tags: &str, format: &str, date: NaiveDateTime, text: String, author: Option<String>) -> ParsedPost {
        let mut extra = BTreeMap::new();
        if let Some(author) = author {
            extra.insert("author".to_string(), author);
        }

        ParsedPost {
            title: title.trim().to_string(),
            tags: split_tags(tags),
            format: format.trim().to_string(),
            date,
            text,
            extra,
        }
    }

    /// Writes the post back in the legacy header format.
    pub fn to_post_file(&self) -> String {
        let mut buf = String::new();

        let _ = writeln!(&mut buf, "{}", HEADER_DELIMITER);
        let _ = writeln!(&mut buf, "title: {}", self.title);
        let _ = writeln!(&mut buf, "tags: {}", self.tags.join(TAG_SEPARATOR));
        let _ = writeln!(&mut buf, "format: {}", self.format);
        let _ = writeln!(&mut buf, "date: {}", format_header_date(&self.date));
        for (key, val) in &self.extra {
            let _ = writeln!(&mut buf, "{}: {}", key, val);
        }
        let _ = writeln!(&mut buf, "{}", HEADER_DELIMITER);
        buf.push_str(&self.text);

        buf
    }
}

/// Splits a raw `tags` value on ", ". Blank entries are dropped, so an empty
/// value gives no tags at all.
pub fn split_tags(tags_str: &str) -> Vec<String> {
    tags_str.split(TAG_SEPARATOR)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, 5).unwrap().and_hms_opt(9, 15, 0).unwrap()
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("travel, food, code"), ["travel", "food", "code"]);
        assert_eq!(split_tags("single"), ["single"]);
        assert_eq!(split_tags("rust,async"), ["rust,async"]);
    }

    #[test]
    fn test_split_empty_tags() {
        assert!(split_tags("").is_empty());
        assert!(split_tags(", ").is_empty());
        assert_eq!(split_tags("a, , b"), ["a", "b"]);
    }

    #[test]
    fn test_compose() {
        let post = ParsedPost::compose(" Hello ", "a, b", "markdown", sample_date(),
                                       "Body\n".to_string(), Some("brit".to_string()));
        assert_eq!(post.title, "Hello");
        assert_eq!(post.tags, ["a", "b"]);
        assert_eq!(post.extra.get("author").map(String::as_str), Some("brit"));
    }

    #[test]
    fn test_to_post_file() {
        let post = ParsedPost::compose("Hello", "a, b", "markdown", sample_date(),
                                       "First line\n\nSecond line\n".to_string(), Some("brit".to_string()));
        let expected = ";;;;;
title: Hello
tags: a, b
format: markdown
date: 2021-03-05 09:15:00
author: brit
;;;;;
First line

Second line
";
        assert_eq!(post.to_post_file(), expected);
    }
}
