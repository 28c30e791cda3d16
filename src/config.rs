/// Command line and environment configuration
///
/// Arguments are parsed with clap; every path option also reads an
/// environment variable so MCP client configs can set them without flags.

use std::path::{Path, PathBuf};

use clap::Parser;

const DATA_DIR_NAME: &str = "life_tracker";
const DATABASE_FILE: &str = "organizer.db";
const FLAGS_FILE: &str = "local_flags.json";

/// Command line arguments for the Life Tracker MCP server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "LIFE_TRACKER_DB")]
    pub database: Option<PathBuf>,

    /// Path to the device-local flag file (defaults to next to the database)
    #[arg(long, env = "LIFE_TRACKER_FLAGS")]
    pub flags_file: Option<PathBuf>,

    /// XP granted for completing a task
    #[arg(long, default_value_t = 10)]
    pub task_xp: u32,

    /// XP granted for completing a homework assignment
    #[arg(long, default_value_t = 15)]
    pub homework_xp: u32,

    /// XP granted for completing a habit for the day
    #[arg(long, default_value_t = 5)]
    pub habit_xp: u32,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Log filter directive for this crate
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.debug {
            "info"
        } else {
            "warn"
        }
    }
}

/// XP granted per completed item kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpRewards {
    pub task: u32,
    pub homework: u32,
    pub habit: u32,
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            task: 10,
            homework: 15,
            habit: 5,
        }
    }
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database: PathBuf,
    pub flags_file: PathBuf,
    pub rewards: XpRewards,
}

impl Config {
    /// Configuration with default rewards and the flag file next to `database`
    pub fn with_database(database: PathBuf) -> Self {
        let flags_file = flags_path_for(&database);
        Self {
            database,
            flags_file,
            rewards: XpRewards::default(),
        }
    }

    /// Resolve paths from parsed arguments, creating parent directories
    pub fn from_args(args: &Args) -> std::io::Result<Self> {
        let database = match &args.database {
            Some(path) => {
                ensure_parent(path)?;
                path.clone()
            }
            None => default_database_path()?,
        };

        let flags_file = match &args.flags_file {
            Some(path) => {
                ensure_parent(path)?;
                path.clone()
            }
            None => flags_path_for(&database),
        };

        Ok(Self {
            database,
            flags_file,
            rewards: XpRewards {
                task: args.task_xp,
                homework: args.homework_xp,
                habit: args.habit_xp,
            },
        })
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// The flag file that sits beside a database file
pub fn flags_path_for(database: &Path) -> PathBuf {
    database.with_file_name(FLAGS_FILE)
}

/// Get the default database path with robust fallback strategy
pub fn default_database_path() -> std::io::Result<PathBuf> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|p| p.join(format!(".{}", DATA_DIR_NAME))),
        dirs::data_dir().map(|p| p.join(DATA_DIR_NAME)),
        dirs::config_dir().map(|p| p.join(DATA_DIR_NAME)),
        std::env::current_dir().ok().map(|p| p.join(format!(".{}", DATA_DIR_NAME))),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if is_writable_dir(potential_path) {
            return Ok(potential_path.join(DATABASE_FILE));
        }
    }

    // Ultimate fallback: use a temporary directory
    let temp_path = std::env::temp_dir().join(DATA_DIR_NAME);
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path.join(DATABASE_FILE))
}

fn is_writable_dir(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".test_write");
    if std::fs::write(&probe, "test").is_err() {
        return false;
    }
    let _ = std::fs::remove_file(&probe);
    true
}
