use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use spdlog::{debug, info};

use crate::error::ImportError;
use crate::import::parsing_utils::parse_post_file;
use crate::import::post_list::PostList;
use crate::post::ParsedPost;

pub mod parsing_utils;
pub mod post_list;

/// Numbered snapshot of the post files found when the importer was built.
/// Numbers start at 1 and follow the scanner's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportChoices(BTreeMap<usize, PathBuf>);

impl ImportChoices {
    fn from_files(files: Vec<PathBuf>) -> ImportChoices {
        ImportChoices(files.into_iter().enumerate().map(|(i, path)| (i + 1, path)).collect())
    }

    pub fn get(&self, choice: usize) -> Option<&Path> {
        self.0.get(&choice).map(PathBuf::as_path)
    }

    pub fn contains(&self, choice: usize) -> bool {
        self.0.contains_key(&choice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Path)> {
        self.0.iter().map(|(choice, path)| (*choice, path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Finds and parses legacy `.post` files in one directory.
pub struct PostImporter {
    post_list: PostList,
    choices: ImportChoices,
}

impl PostImporter {
    /// Scans `posts_dir` once to build the numbered choices.
    /// Fails with `DirectoryUnavailable` when the directory cannot be listed.
    pub fn new(posts_dir: impl Into<PathBuf>) -> Result<PostImporter, ImportError> {
        let post_list = PostList { root_dir: posts_dir.into() };
        let files = post_list.retrieve_files()?;
        debug!("Found {} post files in {}", files.len(), post_list.root_dir.display());

        Ok(PostImporter {
            choices: ImportChoices::from_files(files),
            post_list,
        })
    }

    pub fn posts_dir(&self) -> &Path {
        &self.post_list.root_dir
    }

    /// Post files currently in the directory. Unlike `choices`, this rescans.
    pub fn post_files(&self) -> Result<Vec<PathBuf>, ImportError> {
        self.post_list.retrieve_files()
    }

    pub fn choices(&self) -> &ImportChoices {
        &self.choices
    }

    pub fn parse_post(&self, path: &Path) -> Result<ParsedPost, ImportError> {
        let post = parse_post_file(path)?;
        info!("Parsed {} ({})", path.display(), post.title);
        Ok(post)
    }

    pub fn parse_choice(&self, choice: usize) -> Result<ParsedPost, ImportError> {
        let path = self.choices.get(choice).ok_or_else(|| ImportError::UnknownChoice {
            posts_dir: self.post_list.root_dir.clone(),
            choice,
        })?;
        self.parse_post(path)
    }

    /// Parses every file in the directory, one result per file.
    /// A failing file does not stop the others; the caller decides what to do with it.
    pub fn parse_all(&self) -> Result<Vec<(PathBuf, Result<ParsedPost, ImportError>)>, ImportError> {
        let files = self.post_files()?;
        let results = files.into_iter()
            .map(|path| {
                let res = self.parse_post(&path);
                (path, res)
            })
            .collect();
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::test_data::post_data;

    use super::*;

    fn write_post(dir: &Path, name: &str, title: &str) {
        let content = format!(";;;;;\ntitle: {}\ntags: a, b\nformat: markdown\ndate: 2021-03-05\n;;;;;\nBody of {}\n", title, title);
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_choices_snapshot() -> Result<(), ImportError> {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "one.post", "One");
        write_post(dir.path(), "three.post", "Three");
        write_post(dir.path(), "two.post", "Two");
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let importer = PostImporter::new(dir.path())?;
        let choices: Vec<(usize, PathBuf)> = importer.choices().iter()
            .map(|(i, p)| (i, p.to_path_buf()))
            .collect();
        assert_eq!(choices, vec![
            (1, dir.path().join("one.post")),
            (2, dir.path().join("three.post")),
            (3, dir.path().join("two.post")),
        ]);

        // New files show up in a rescan, not in the snapshot
        write_post(dir.path(), "four.post", "Four");
        assert_eq!(importer.choices().len(), 3);
        assert_eq!(importer.post_files()?.len(), 4);
        Ok(())
    }

    #[test]
    fn test_parse_choice() -> Result<(), ImportError> {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "a.post", "A");
        write_post(dir.path(), "b.post", "B");
        write_post(dir.path(), "c.post", "C");

        let importer = PostImporter::new(dir.path())?;
        let post = importer.parse_choice(1)?;
        assert_eq!(post.title, "A");
        assert_eq!(post.text, "Body of A\n");

        match importer.parse_choice(99) {
            Err(ImportError::UnknownChoice { choice, .. }) => assert_eq!(choice, 99),
            _ => panic!("expected UnknownChoice"),
        }
        assert!(matches!(importer.parse_choice(0), Err(ImportError::UnknownChoice { .. })));
        Ok(())
    }

    #[test]
    fn test_parse_all_isolates_failures() -> Result<(), ImportError> {
        let dir = TempDir::new().unwrap();
        write_post(dir.path(), "a.post", "A");
        fs::write(dir.path().join("b.post"), "no header here\n").unwrap();
        fs::write(dir.path().join("c.post"), post_data()).unwrap();

        let importer = PostImporter::new(dir.path())?;
        let results = importer.parse_all()?;
        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        match &results[1].1 {
            Err(ImportError::MalformedHeader { path }) => assert_eq!(path, &dir.path().join("b.post")),
            _ => panic!("expected MalformedHeader"),
        }
        assert_eq!(results[2].1.as_ref().unwrap().title, "Learning to cook in Lisbon");
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let res = PostImporter::new("/does/not/exist/posts/");
        assert!(matches!(res, Err(ImportError::DirectoryUnavailable { .. })));
    }
}
