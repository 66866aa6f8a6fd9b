use anyhow::Result;
use cattree::cli::{AppContext, Cli, Commands};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    cattree::infra::logging::init(cli.verbose, cli.quiet);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Show(args) => cattree::cli_ext::tree_cmd::show(args, &ctx),
        Commands::Search(args) => cattree::cli_ext::tree_cmd::search(args, &ctx),
        Commands::Assign(args) => cattree::cli_ext::edit_cmd::assign(args, &ctx),
        Commands::Move(args) => cattree::cli_ext::edit_cmd::move_node(args, &ctx),
        Commands::Draft(args) => cattree::cli_ext::draft_cmd::run(args, &ctx),
        Commands::Init(args) => cattree::infra::config::init(args, &ctx),
        Commands::Completions(args) => cattree::completion::run(args, &ctx),
    }
}
