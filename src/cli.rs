use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "cattree")]
#[command(about = "Edit PLM category trees: assign catalog items, move nodes, search and expand")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a category tree, optionally highlighting a search
    Show(ShowArgs),

    /// List title matches and the keys that expand to reveal them
    Search(SearchArgs),

    /// Assign pending catalog items under a target node
    Assign(AssignArgs),

    /// Move a node the way a drag-and-drop would
    Move(MoveArgs),

    /// Inspect or clear the saved pending-items draft
    Draft(DraftArgs),

    /// Initialize a cattree.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Tree JSON file (array of nodes)
    pub tree: PathBuf,

    /// Highlight titles containing this text and only expand down to them
    #[arg(short, long)]
    pub query: Option<String>,

    /// Only print matches and their ancestors
    #[arg(long, requires = "query")]
    pub filter: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Table,
}

#[derive(Parser)]
pub struct SearchArgs {
    /// Tree JSON file (array of nodes)
    pub tree: PathBuf,

    /// Case-sensitive substring to look for in titles
    pub query: String,

    /// Output format
    #[arg(long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(Parser)]
pub struct AssignArgs {
    /// Tree JSON file (array of nodes)
    pub tree: PathBuf,

    /// Pending items JSON file (array of catalog items)
    pub items: PathBuf,

    /// Key of the node that receives the items
    #[arg(short, long)]
    pub target: Option<String>,

    /// Keys of pending items to assign
    #[arg(short, long = "select", value_name = "KEY", conflicts_with = "all")]
    pub select: Vec<String>,

    /// Assign every pending item
    #[arg(long)]
    pub all: bool,

    /// Submit even if some pending items stay unassigned (they are discarded)
    #[arg(long)]
    pub discard_rest: bool,

    /// Allow keys that already exist in the tree
    #[arg(long)]
    pub allow_duplicates: bool,

    /// Write the resulting tree here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct MoveArgs {
    /// Tree JSON file (array of nodes)
    pub tree: PathBuf,

    /// Key of the dragged node
    #[arg(long)]
    pub drag: String,

    /// Key of the node it was dropped on or next to
    #[arg(long)]
    pub drop: String,

    /// Dropped into the gap beside the node rather than onto it
    #[arg(long)]
    pub gap: bool,

    /// Edge of the drop node: -1 above, 0 body, 1 below
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub position: i32,

    /// Treat these nodes as expanded when resolving the drop
    #[arg(long, value_name = "KEY")]
    pub expanded: Vec<String>,

    /// Write the resulting tree here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub command: DraftCommand,
}

#[derive(Subcommand)]
pub enum DraftCommand {
    /// Print the saved pending items
    Show(DraftShowArgs),

    /// Delete the saved draft
    Clear,
}

#[derive(Parser)]
pub struct DraftShowArgs {
    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
