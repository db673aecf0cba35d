use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ImportError;

pub const POST_EXTENSION: &str = "post";

/// Lists the legacy post files of one directory.
pub struct PostList {
    pub root_dir: PathBuf,
}

impl PostList {
    /// Scans the directory again on every call. Paths come back sorted by file name.
    pub fn retrieve_files(&self) -> Result<Vec<PathBuf>, ImportError> {
        self.list_files().map_err(|source| ImportError::DirectoryUnavailable {
            path: self.root_dir.clone(),
            source,
        })
    }

    fn list_files(&self) -> io::Result<Vec<PathBuf>> {
        if !fs::metadata(&self.root_dir)?.is_dir() {
            return Err(io::Error::new(ErrorKind::InvalidInput, "Not a directory"));
        }

        let mut posts = vec![];
        let entries = fs::read_dir(self.root_dir.as_path())?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if Self::is_post_file(&path) {
                posts.push(path);
            }
        }
        posts.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(posts)
    }

    fn is_post_file(path: &Path) -> bool {
        match (path.file_stem(), path.extension()) {
            (Some(stem), Some(ext)) => !stem.is_empty() && ext == POST_EXTENSION,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn test_retrieve_files_filters_extension() -> Result<(), ImportError> {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.post");
        touch(dir.path(), "c.txt");
        touch(dir.path(), "a.post");
        touch(dir.path(), "d.post.bak");
        fs::create_dir(dir.path().join("nested.post")).unwrap();

        let post_list = PostList { root_dir: dir.path().to_path_buf() };
        let files = post_list.retrieve_files()?;
        assert_eq!(files, vec![dir.path().join("a.post"), dir.path().join("b.post")]);
        Ok(())
    }

    #[test]
    fn test_retrieve_files_rescans() -> Result<(), ImportError> {
        let dir = TempDir::new().unwrap();
        let post_list = PostList { root_dir: dir.path().to_path_buf() };
        assert!(post_list.retrieve_files()?.is_empty());

        touch(dir.path(), "a.post");
        assert_eq!(post_list.retrieve_files()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_trailing_separator_is_irrelevant() -> Result<(), ImportError> {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.post");

        let with_slash = PathBuf::from(format!("{}/", dir.path().display()));
        let files = PostList { root_dir: with_slash }.retrieve_files()?;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "a.post");
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let post_list = PostList { root_dir: PathBuf::from("/does/not/exist/posts") };
        let res = post_list.retrieve_files();
        assert!(matches!(res, Err(ImportError::DirectoryUnavailable { .. })));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.post");
        let post_list = PostList { root_dir: dir.path().join("a.post") };
        assert!(matches!(post_list.retrieve_files(), Err(ImportError::DirectoryUnavailable { .. })));
    }
}
