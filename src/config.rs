use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::util::os_helper::get_name;

pub const CFG_FILE_NAME: &str = "blarg.toml";
const EXE_DIR_VAR: &str = "${exe_dir}";

#[derive(Deserialize, Debug)]
pub struct Paths {
    /// Directory holding the legacy `.post` files.
    pub posts_dir: PathBuf,
    pub database: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Default)]
pub struct Author {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub paths: Paths,
    pub log: Option<Log>,
    pub author: Option<Author>,
}

impl Config {
    /// Database file, defaulting to the user data directory.
    pub fn database_path(&self) -> io::Result<PathBuf> {
        if let Some(ref database) = self.paths.database {
            return Ok(database.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not find user data dir"))?;
        Ok(data_dir.join("Blarg").join("blarg.db"))
    }

    /// Author recorded on composed posts. Falls back to the OS user.
    pub fn author_name(&self) -> String {
        self.author.as_ref()
            .and_then(|author| author.name.clone())
            .unwrap_or_else(get_name)
    }
}

fn parse_path(path: PathBuf, exe_dir: &Path) -> PathBuf {
    match path.to_str() {
        Some(str_path) if str_path.starts_with(EXE_DIR_VAR) => {
            PathBuf::from(str_path.replacen(EXE_DIR_VAR, &exe_dir.to_string_lossy(), 1))
        }
        _ => path,
    }
}

fn current_exe_dir() -> io::Result<PathBuf> {
    let cur_exe = env::current_exe()?;
    cur_exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Executable has no parent directory"))
}

pub fn parse_config(cfg_content: &str, exe_dir: &Path) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        posts_dir: parse_path(cfg.paths.posts_dir, exe_dir),
        database: cfg.paths.database.map(|p| parse_path(p, exe_dir)),
    };
    if let Some(ref mut log) = cfg.log {
        log.location = log.location.take().map(|p| parse_path(p, exe_dir));
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content, &current_exe_dir()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r##"
[paths]
posts_dir = "${exe_dir}/posts"
database = "/var/lib/blarg/blarg.db"

[log]
level = "Debug"
log_to_console = false
location = "${exe_dir}/log/blarg.log"

[author]
name = "Brit"
"##;
        let cfg = parse_config(toml_str, Path::new("/opt/blarg")).unwrap();
        assert_eq!(cfg.paths.posts_dir, PathBuf::from("/opt/blarg/posts"));
        assert_eq!(cfg.database_path().unwrap(), PathBuf::from("/var/lib/blarg/blarg.db"));
        let log = cfg.log.as_ref().unwrap();
        assert_eq!(log.level, LogLevel::Debug);
        assert_eq!(log.location, Some(PathBuf::from("/opt/blarg/log/blarg.log")));
        assert_eq!(cfg.author_name(), "Brit");
    }

    #[test]
    fn test_minimal_config() {
        let cfg = parse_config("[paths]\nposts_dir = \"posts/\"\n", Path::new("/opt/blarg")).unwrap();
        assert_eq!(cfg.paths.posts_dir, PathBuf::from("posts/"));
        assert!(cfg.paths.database.is_none());
        assert!(cfg.log.is_none());
        assert!(cfg.author.is_none());
    }

    #[test]
    fn test_invalid_config() {
        let err = parse_config("[paths]\n", Path::new("/opt/blarg")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_missing_config_file() {
        let err = read_config(Path::new("/does/not/exist/blarg.toml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("/does/not/exist/blarg.toml"));
    }
}
