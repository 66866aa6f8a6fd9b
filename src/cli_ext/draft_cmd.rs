use anyhow::Result;
use tabled::{Table, Tabled};

use crate::cli::{AppContext, DraftArgs, DraftCommand, DraftShowArgs, OutputFormat};
use crate::core::draft::{DraftStore, FileDraftStore, load_draft};
use crate::infra::config::load_config;
use crate::infra::io::write_json;

pub fn run(args: DraftArgs, ctx: &AppContext) -> Result<()> {
    let config = load_config().unwrap_or_default();
    let mut store = FileDraftStore::new(&config.draft.dir);

    match args.command {
        DraftCommand::Show(show_args) => show(&store, &config.draft.key, show_args, ctx),
        DraftCommand::Clear => {
            if ctx.dry_run {
                if !ctx.quiet {
                    println!(
                        "DRY RUN: Would remove {}",
                        store.slot_path(&config.draft.key).display()
                    );
                }
                return Ok(());
            }
            store.clear(&config.draft.key)?;
            if !ctx.quiet {
                println!("Draft cleared");
            }
            Ok(())
        }
    }
}

fn show(store: &FileDraftStore, key: &str, args: DraftShowArgs, ctx: &AppContext) -> Result<()> {
    let Some(draft) = load_draft(store, key) else {
        if !ctx.quiet {
            println!("No draft saved");
        }
        return Ok(());
    };

    match args.format {
        OutputFormat::Json => write_json(&draft, None)?,
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct Row {
                key: String,
                title: String,
                code: String,
                path: String,
            }

            let rows: Vec<Row> = draft
                .items
                .into_iter()
                .map(|i| Row {
                    key: i.key,
                    title: i.title,
                    code: i.code.unwrap_or_default(),
                    path: i.path.unwrap_or_default(),
                })
                .collect();
            if !ctx.quiet {
                println!("Saved {}", draft.saved_at.to_rfc3339());
            }
            println!("{}", Table::new(rows));
        }
        OutputFormat::Text => {
            for item in &draft.items {
                println!("{}\t{}", item.key, item.title);
            }
        }
    }
    Ok(())
}
