use chrono::NaiveDate;

/// Builds the `YYYYMMDD_title_words` name used for stored slugs and exported files.
pub fn post_slug(title: &str, date: &NaiveDate) -> String {
    let title = unidecode::unidecode(title);
    let alpha_chars: String = title.chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut url = String::new();
    let mut prev_char = None;

    for c in alpha_chars.trim_matches('_').chars() {
        if c != '_' || prev_char != Some('_') {
            url.push(c);
        }
        prev_char = Some(c);
    }

    let date = date.format("%Y%m%d");
    if url.is_empty() {
        return date.to_string();
    }

    format!("{}_{}", date, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_slug() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let slug = post_slug("Post title of mine ábaco - dir2", &date);
        assert_eq!(slug, "20240229_post_title_of_mine_abaco_dir2");
    }

    #[test]
    fn test_post_slug_edges() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
        assert_eq!(post_slug("  Hello,   World!  ", &date), "20210305_hello_world");
        assert_eq!(post_slug("!!!", &date), "20210305");
    }
}
