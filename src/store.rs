//! SQLite storage for posts, their ordered tags and extra header fields.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use spdlog::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::post::ParsedPost;
use crate::slug::post_slug;

pub type Result<T> = std::result::Result<T, StoreError>;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    slug TEXT NOT NULL,
    format TEXT NOT NULL,
    date TEXT NOT NULL,
    text TEXT NOT NULL,
    source TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_date ON posts(date);
CREATE UNIQUE INDEX IF NOT EXISTS idx_posts_source ON posts(source);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS post_tags (
    post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (post_id, position)
);

CREATE TABLE IF NOT EXISTS post_fields (
    post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (post_id, name)
);
"#;

#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct PostId(pub String);

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of a post listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPost {
    pub id: PostId,
    pub slug: String,
    pub source: Option<String>,
    pub post: ParsedPost,
}

pub struct PostStore {
    conn: Connection,
}

impl PostStore {
    pub fn open(path: impl AsRef<Path>) -> Result<PostStore> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// Store that lives only as long as the value (for tests and dry runs).
    pub fn in_memory() -> Result<PostStore> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<PostStore> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(PostStore { conn })
    }

    /// Saves a post with its tags and extra fields in one transaction.
    /// `source` is the legacy file the post came from, if any.
    pub fn create_post(&mut self, post: &ParsedPost, source: Option<&Path>) -> Result<PostId> {
        let id = PostId(Uuid::new_v4().to_string());
        let slug = post_slug(&post.title, &post.date.date());
        let source = source.map(|p| p.to_string_lossy().to_string());

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO posts (id, title, slug, format, date, text, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id.0,
                post.title,
                slug,
                post.format,
                post.date.format(DATE_FORMAT).to_string(),
                post.text,
                source,
                Utc::now().to_rfc3339(),
            ],
        )?;

        for (position, tag) in post.tags.iter().enumerate() {
            tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", [tag])?;
            let tag_id: i64 = tx.query_row("SELECT id FROM tags WHERE name = ?1", [tag], |row| row.get(0))?;
            tx.execute(
                "INSERT INTO post_tags (post_id, tag_id, position) VALUES (?1, ?2, ?3)",
                params![id.0, tag_id, position as i64],
            )?;
        }

        for (name, value) in &post.extra {
            tx.execute(
                "INSERT INTO post_fields (post_id, name, value) VALUES (?1, ?2, ?3)",
                params![id.0, name, value],
            )?;
        }
        tx.commit()?;

        info!("Stored post {} ({})", id, slug);
        Ok(id)
    }

    /// Whether a post was already imported from this file.
    pub fn contains_source(&self, source: &Path) -> Result<bool> {
        let found = self.conn
            .query_row(
                "SELECT 1 FROM posts WHERE source = ?1",
                [source.to_string_lossy()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// All posts, newest first.
    pub fn list_posts(&self) -> Result<Vec<PostSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, slug, date FROM posts ORDER BY date DESC, title",
        )?;
        let rows = stmt.query_map([], Self::row_to_summary)?;
        Self::collect_summaries(rows)
    }

    pub fn posts_by_tag(&self, tag: &str) -> Result<Vec<PostSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT p.id, p.title, p.slug, p.date FROM posts p
             JOIN post_tags pt ON pt.post_id = p.id
             JOIN tags t ON t.id = pt.tag_id
             WHERE t.name = ?1
             ORDER BY p.date DESC, p.title",
        )?;
        let rows = stmt.query_map([tag], Self::row_to_summary)?;
        Self::collect_summaries(rows)
    }

    /// Tag names with the number of posts using them, by name.
    pub fn tags(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name, COUNT(DISTINCT pt.post_id) FROM tags t
             JOIN post_tags pt ON pt.tag_id = t.id
             GROUP BY t.name
             ORDER BY t.name",
        )?;
        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok((row.get::<_, String>(0)?, count as usize))
        })?;

        let mut tags = vec![];
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    pub fn get_post(&self, id: &PostId) -> Result<Option<StoredPost>> {
        let row = self.conn
            .query_row(
                "SELECT title, slug, format, date, text, source FROM posts WHERE id = ?1",
                [&id.0],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((title, slug, format, date, text, source)) = row else {
            return Ok(None);
        };

        let post = ParsedPost {
            title,
            tags: self.post_tags(id)?,
            format,
            date: parse_stored_date(&date)?,
            text,
            extra: self.post_fields(id)?,
        };

        Ok(Some(StoredPost {
            id: id.clone(),
            slug,
            source,
            post,
        }))
    }

    /// Like `get_post`, but a missing post is an error.
    pub fn require_post(&self, id: &PostId) -> Result<StoredPost> {
        self.get_post(id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn post_tags(&self, id: &PostId) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name FROM post_tags pt JOIN tags t ON t.id = pt.tag_id
             WHERE pt.post_id = ?1 ORDER BY pt.position",
        )?;
        let rows = stmt.query_map([&id.0], |row| row.get::<_, String>(0))?;

        let mut tags = vec![];
        for row in rows {
            tags.push(row?);
        }
        Ok(tags)
    }

    fn post_fields(&self, id: &PostId) -> Result<BTreeMap<String, String>> {
        let mut stmt = self.conn.prepare("SELECT name, value FROM post_fields WHERE post_id = ?1")?;
        let rows = stmt.query_map([&id.0], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut fields = BTreeMap::new();
        for row in rows {
            let (name, value) = row?;
            fields.insert(name, value);
        }
        Ok(fields)
    }

    fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn collect_summaries(
        rows: impl Iterator<Item = rusqlite::Result<(String, String, String, String)>>,
    ) -> Result<Vec<PostSummary>> {
        let mut posts = vec![];
        for row in rows {
            let (id, title, slug, date) = row?;
            posts.push(PostSummary {
                id: PostId(id),
                title,
                slug,
                date: parse_stored_date(&date)?,
            });
        }
        Ok(posts)
    }
}

fn parse_stored_date(date: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| StoreError::InvalidData(format!("Invalid post date {}: {}", date, e)))
}
