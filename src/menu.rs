use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use spdlog::{info, warn};

use crate::error::PromptError;
use crate::import::PostImporter;
use crate::post::ParsedPost;
use crate::prompt::Prompt;
use crate::store::{PostStore, PostSummary};
use crate::text_utils::format_date_time;

lazy_static! {
    static ref MENU_CHOICE: Regex = Regex::new(r"^[1-4]$").unwrap();
    static ref NUMBER: Regex = Regex::new(r"^\d+$").unwrap();
    static ref NUMBER_OR_BACK: Regex = Regex::new(r"^(\d+|)$").unwrap();
    static ref NOT_BLANK: Regex = Regex::new(r"\S").unwrap();
    static ref TAG_LIST: Regex = Regex::new(r"^([^,\s][^,]*(, [^,\s][^,]*)*)?$").unwrap();
    static ref FORMAT: Regex = Regex::new(r"^[a-zA-Z]+$").unwrap();
}

const MAIN_MENU: &str = "What would you like to do? (type QUIT at any prompt to leave)
  1) Compose a new post
  2) Import a legacy post
  3) Import all legacy posts
  4) Browse posts";

/// Outcome of a batch import.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The interactive front end: a main menu over compose, import and browse.
pub struct BlogApp<R, W> {
    prompt: Prompt<R, W>,
    importer: PostImporter,
    store: PostStore,
    author: Option<String>,
    clear_screen: bool,
}

impl<R: BufRead, W: Write> BlogApp<R, W> {
    pub fn new(prompt: Prompt<R, W>, importer: PostImporter, store: PostStore, author: Option<String>) -> BlogApp<R, W> {
        BlogApp {
            prompt,
            importer,
            store,
            author,
            clear_screen: false,
        }
    }

    /// Clears the terminal before showing the main menu.
    pub fn with_clear_screen(mut self, clear_screen: bool) -> BlogApp<R, W> {
        self.clear_screen = clear_screen;
        self
    }

    /// Runs the menu until the user quits.
    pub fn run(&mut self) -> Result<()> {
        loop {
            if let Err(e) = self.main_menu() {
                if matches!(e.downcast_ref::<PromptError>(), Some(PromptError::Quit)) {
                    info!("Leaving the menu");
                    return Ok(());
                }
                return Err(e);
            }
        }
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    fn main_menu(&mut self) -> Result<()> {
        if self.clear_screen {
            self.prompt.clear()?;
        }
        let choice = self.prompt.ask(MAIN_MENU, &MENU_CHOICE, "Please type a number between 1 and 4.")?;
        match choice.as_str() {
            "1" => self.compose(),
            "2" => self.import_one(),
            "3" => {
                self.import_all()?;
                Ok(())
            }
            _ => self.browse(),
        }
    }

    fn compose(&mut self) -> Result<()> {
        let title = self.prompt.ask("Title:", &NOT_BLANK, "The title cannot be empty.")?;
        let tags = self.prompt.ask("Tags (comma separated, e.g. 'travel, food'):", &TAG_LIST,
                                   "Tags must be separated by a comma and a space.")?;
        let format = self.prompt.ask("Format (e.g. markdown):", &FORMAT, "The format is a single word.")?;
        let text = self.prompt.ask_body("Post text:")?;

        let date: NaiveDateTime = Local::now().naive_local();
        let post = ParsedPost::compose(&title, &tags, &format, date, text, self.author.clone());
        let id = self.store.create_post(&post, None)?;
        self.prompt.say(&format!("Saved '{}' ({})", post.title, id))?;
        Ok(())
    }

    fn import_one(&mut self) -> Result<()> {
        if self.importer.choices().is_empty() {
            self.prompt.say(&format!("No .post files found in {}", self.importer.posts_dir().display()))?;
            return Ok(());
        }

        let mut listing = String::from("Which post should be imported?");
        for (choice, path) in self.importer.choices().iter() {
            listing.push_str(&format!("\n  {}) {}", choice, path.display()));
        }

        let choice = loop {
            let answer = self.prompt.ask(&listing, &NUMBER, "Please type one of the numbers above.")?;
            match answer.parse::<usize>() {
                Ok(n) if self.importer.choices().contains(n) => break n,
                _ => self.prompt.say("Please type one of the numbers above.")?,
            }
        };

        let path = match self.importer.choices().get(choice) {
            Some(path) => path.to_path_buf(),
            None => return Ok(()),
        };
        if self.store.contains_source(&path)? {
            info!("{} was already imported", path.display());
            self.prompt.say(&format!("{} was already imported", path.display()))?;
            return Ok(());
        }

        match self.importer.parse_choice(choice) {
            Ok(post) => match self.store.create_post(&post, Some(path.as_path())) {
                Ok(id) => self.prompt.say(&format!("Imported '{}' ({})", post.title, id))?,
                Err(e) => {
                    warn!("Error storing {}: {}", path.display(), e);
                    self.prompt.say(&format!("Could not store '{}': {}", post.title, e))?;
                }
            },
            Err(e) => {
                warn!("{}", e);
                self.prompt.say(&format!("Could not import: {}", e))?;
            }
        }
        Ok(())
    }

    /// Imports every post file, skipping the ones already stored and reporting failures.
    pub fn import_all(&mut self) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        for (path, res) in self.importer.parse_all()? {
            let post = match res {
                Ok(post) => post,
                Err(e) => {
                    warn!("{}", e);
                    self.prompt.say(&format!("Skipping: {}", e))?;
                    report.failed += 1;
                    continue;
                }
            };

            if self.store.contains_source(&path)? {
                info!("{} was already imported", path.display());
                report.skipped += 1;
                continue;
            }

            self.store.create_post(&post, Some(path.as_path()))?;
            self.prompt.say(&format!("Imported '{}'", post.title))?;
            report.imported += 1;
        }

        self.prompt.say(&format!("{} imported, {} already there, {} failed",
                                 report.imported, report.skipped, report.failed))?;
        Ok(report)
    }

    fn browse(&mut self) -> Result<()> {
        let tags = self.store.tags()?;
        let posts = if tags.is_empty() {
            self.store.list_posts()?
        } else {
            let mut question = String::from("Filter by tag? (press enter for all posts)\n  0) all posts");
            for (i, (tag, count)) in tags.iter().enumerate() {
                question.push_str(&format!("\n  {}) {} ({})", i + 1, tag, count));
            }
            let answer = self.prompt.ask(&question, &NUMBER_OR_BACK, "Please type one of the numbers above.")?;
            match answer.parse::<usize>() {
                Ok(n) if n >= 1 && n <= tags.len() => self.store.posts_by_tag(&tags[n - 1].0)?,
                _ => self.store.list_posts()?,
            }
        };

        if posts.is_empty() {
            self.prompt.say("There are no posts yet.")?;
            return Ok(());
        }

        let question = render_post_list(&posts);
        loop {
            let answer = self.prompt.ask(&question, &NUMBER_OR_BACK, "Please type one of the numbers above, or press enter to go back.")?;
            let n = match answer.parse::<usize>() {
                Ok(n) => n,
                Err(_) => return Ok(()),
            };
            let Some(summary) = n.checked_sub(1).and_then(|i| posts.get(i)) else {
                self.prompt.say("Please type one of the numbers above, or press enter to go back.")?;
                continue;
            };

            let stored = self.store.require_post(&summary.id)?;
            self.prompt.say(&stored.post.to_string())?;
        }
    }
}

fn render_post_list(posts: &[PostSummary]) -> String {
    let mut buf = String::from("Which post do you want to read? (press enter to go back)");
    for (i, post) in posts.iter().enumerate() {
        let (date, _time) = format_date_time(&post.date);
        buf.push_str(&format!("\n  {}) {}  {}", i + 1, date, post.title));
    }
    buf
}
