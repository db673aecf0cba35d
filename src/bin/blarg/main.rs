use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use serde::Serialize;
use spdlog::{info, warn};

use blarg::config::{Config, CFG_FILE_NAME};
use blarg::import::PostImporter;
use blarg::logger::configure_logger;
use blarg::menu::BlogApp;
use blarg::post::ParsedPost;
use blarg::prompt::Prompt;
use blarg::store::{PostId, PostStore};
use blarg::text_utils::format_date_time;

use crate::config::open_config;
use crate::config_data::write_sample_cfg;

mod config;
mod config_data;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config path. Defaults to blarg.toml next to the executable, in the current dir or in the user config dir
    #[arg(short, long)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (default)
    Menu {
        /// Clear the screen before each menu
        #[arg(long)]
        clear: bool,
    },
    /// List the legacy post files that can be imported
    List,
    /// Import legacy post files
    Import(ImportArgs),
    /// List stored posts
    Posts {
        /// Only posts with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Write a stored post back as a .post file
    Export {
        /// Id of the stored post
        id: String,
        /// Output directory
        #[arg(default_value = ".")]
        out_dir: PathBuf,
    },
    /// Write a sample configuration
    Init {
        /// Directory where blarg.toml is written
        #[arg(default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["choice", "file", "all"])))]
struct ImportArgs {
    /// Number shown by `blarg list`
    #[arg(short, long)]
    choice: Option<usize>,

    /// Path of a post file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Every post file of the posts directory
    #[arg(short, long)]
    all: bool,

    /// Print the parsed posts as JSON instead of storing them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Serialize)]
struct ParsedFile<'a> {
    path: &'a Path,
    post: &'a ParsedPost,
}

fn open_store(config: &Config) -> Result<PostStore> {
    let db_path = config.database_path()?;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Error creating database directory {}", parent.display()))?;
        }
    }
    info!("Using database {}", db_path.display());
    PostStore::open(&db_path).with_context(|| format!("Error opening database {}", db_path.display()))
}

fn menu_cmd(config: &Config, clear: bool) -> Result<()> {
    let importer = PostImporter::new(&config.paths.posts_dir)?;
    let store = open_store(config)?;
    let stdin = io::stdin();
    let prompt = Prompt::new(stdin.lock(), io::stdout());

    let mut app = BlogApp::new(prompt, importer, store, Some(config.author_name()))
        .with_clear_screen(clear);
    app.run()
}

fn list_cmd(config: &Config) -> Result<()> {
    let importer = PostImporter::new(&config.paths.posts_dir)?;
    if importer.choices().is_empty() {
        println!("No .post files found in {}", importer.posts_dir().display());
    }
    for (choice, path) in importer.choices().iter() {
        println!("{:>3}) {}", choice, path.display());
    }
    Ok(())
}

fn import_cmd(config: &Config, args: ImportArgs) -> Result<()> {
    let importer = PostImporter::new(&config.paths.posts_dir)?;

    let results = if args.all {
        importer.parse_all()?
    } else if let Some(choice) = args.choice {
        let path = match importer.choices().get(choice) {
            Some(path) => path.to_path_buf(),
            None => bail!("No post file with number {}. Run 'blarg list' to see them", choice),
        };
        vec![(path, importer.parse_choice(choice))]
    } else if let Some(file) = args.file {
        let res = importer.parse_post(&file);
        vec![(file, res)]
    } else {
        bail!("Nothing to import");
    };

    let mut parsed = vec![];
    let mut failed = 0;
    for (path, res) in results {
        match res {
            Ok(post) => parsed.push((path, post)),
            Err(e) => {
                warn!("{}", e);
                eprintln!("Skipping: {}", e);
                failed += 1;
            }
        }
    }

    if args.dry_run {
        let files: Vec<ParsedFile> = parsed.iter()
            .map(|(path, post)| ParsedFile { path, post })
            .collect();
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else {
        let mut store = open_store(config)?;
        for (path, post) in &parsed {
            if store.contains_source(path)? {
                println!("Already imported: {}", path.display());
                continue;
            }
            let id = store.create_post(post, Some(path.as_path()))?;
            println!("Imported '{}' ({})", post.title, id);
        }
    }

    if failed > 0 {
        bail!("{} file(s) could not be imported", failed);
    }
    Ok(())
}

fn posts_cmd(config: &Config, tag: Option<String>) -> Result<()> {
    let store = open_store(config)?;
    let posts = match tag {
        Some(ref tag) => store.posts_by_tag(tag)?,
        None => store.list_posts()?,
    };

    for post in posts {
        let (date, time) = format_date_time(&post.date);
        println!("{} {} {}  {}", post.id, date, time, post.title);
    }
    Ok(())
}

fn export_cmd(config: &Config, id: String, out_dir: &Path) -> Result<()> {
    let store = open_store(config)?;
    let stored = store.require_post(&PostId(id))?;

    let file_name = out_dir.join(format!("{}.post", stored.slug));
    fs::write(&file_name, stored.post.to_post_file())
        .with_context(|| format!("Error writing {}", file_name.display()))?;
    println!("Created {}", file_name.display());
    Ok(())
}

fn init_cmd(out_dir: &Path) -> Result<()> {
    let path = out_dir.join(CFG_FILE_NAME);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    write_sample_cfg(&path).with_context(|| format!("Error writing {}", path.display()))?;
    println!("Sample configuration written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Menu { clear: false });

    if let Command::Init { ref out_dir } = command {
        return init_cmd(out_dir);
    }

    let config = match open_config(cli.config_path.map(PathBuf::from)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run blarg --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }
    info!("Starting blarg =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");

    match command {
        Command::Menu { clear } => menu_cmd(&config, clear),
        Command::List => list_cmd(&config),
        Command::Import(args) => import_cmd(&config, args),
        Command::Posts { tag } => posts_cmd(&config, tag),
        Command::Export { id, out_dir } => export_cmd(&config, id, &out_dir),
        Command::Init { out_dir } => init_cmd(&out_dir),
    }
}
