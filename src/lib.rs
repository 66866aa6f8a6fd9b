//! **cattree** - Category tree mutation and assignment engine for PLM consoles
//!
//! Keeps an ordered, keyed forest of category nodes and edits it copy-on-write:
//! pending catalog items are merged in at a target node, nodes are moved by
//! drag-and-drop, and search reveals matches by expanding their ancestors.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Command handlers behind the CLI subcommands
pub mod cli_ext {
    /// `show` and `search`
    pub mod tree_cmd;

    /// `assign` and `move`
    pub mod edit_cmd;

    /// `draft show` and `draft clear`
    pub mod draft_cmd;
}

/// Tree engine - pure operations plus the session controller
pub mod core {
    /// Node model with opaque shared payloads
    pub mod node;
    pub use node::{Payload, TreeNode};

    /// Copy-on-write forest operations and the published-tree holder
    pub mod store;
    pub use store::{Forest, InsertPosition, TreeError, TreeStore};

    /// Plain / shift / ctrl / checkbox selection over pending items
    pub mod selection;
    pub use selection::{Modifiers, SelectionState};

    /// Expanded-key bookkeeping for the tree view
    pub mod expansion;
    pub use expansion::ExpansionState;

    /// Catalog picks waiting for assignment
    pub mod pending;
    pub use pending::PendingItem;

    /// Substring search, ancestor expansion and highlight projection
    pub mod search;

    /// Drop-position resolution for drag-and-drop
    pub mod drop;
    pub use drop::{DropEvent, DropPlacement};

    /// Last-writer-wins draft slot for the pending collection
    pub mod draft;
    pub use draft::{DraftStore, FileDraftStore, MemoryDraftStore};

    /// Assignment, drag moves, submission
    pub mod assign;
    pub use assign::{AssignError, AssignmentController, SubmitError};
}

/// Infrastructure - Configuration, I/O, and logging
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// JSON tree and catalog file handling
    pub mod io;
    pub use io::{read_forest, read_pending, write_json};

    /// tracing subscriber setup
    pub mod logging;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use infra::{Config, load_config};

// Core types for external consumers
pub use core::{AssignmentController, Forest, PendingItem, TreeNode};
