//! `show` and `search` command handlers.

use anyhow::Result;
use indexmap::IndexSet;
use owo_colors::OwoColorize;
use ptree::TreeBuilder;
use serde_json::json;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::cli::{AppContext, OutputFormat, SearchArgs, ShowArgs};
use crate::core::search::{self, DecoratedNode, TitleView};
use crate::core::store;
use crate::infra::io::read_forest;

#[instrument(skip_all, fields(tree = %args.tree.display()))]
pub fn show(args: ShowArgs, ctx: &AppContext) -> Result<()> {
    let forest = read_forest(&args.tree)?;
    let query = args.query.unwrap_or_default();

    // Without a query everything is open; with one, only paths to matches.
    let expanded: IndexSet<String> = if query.is_empty() {
        store::collect_all_keys(&forest).into_iter().collect()
    } else {
        search::expand_paths_for_query(&forest, &query)
    };

    let forest = if args.filter {
        search::filter(&forest, &query)
    } else {
        forest
    };

    if ctx.quiet {
        return Ok(());
    }

    let view = search::decorate(&forest, &query);
    let mut builder = TreeBuilder::new(format!("{} node(s)", store::count_nodes(&forest)));
    let labels = Labels {
        color: !ctx.no_color,
        expanded: &expanded,
    };
    labels.add_children(&mut builder, &view);
    ptree::print_tree(&builder.build())?;

    if !query.is_empty() {
        println!(
            "{} match(es) for {:?}",
            search::match_count(&forest, &query),
            query
        );
    }
    Ok(())
}

struct Labels<'a> {
    color: bool,
    expanded: &'a IndexSet<String>,
}

impl Labels<'_> {
    fn add_children(&self, builder: &mut TreeBuilder, nodes: &[DecoratedNode]) {
        for node in nodes {
            let open = self.expanded.contains(&node.key);
            if node.children.is_empty() || !open {
                builder.add_empty_child(self.label(node, open));
            } else {
                builder.begin_child(self.label(node, open));
                self.add_children(builder, &node.children);
                builder.end_child();
            }
        }
    }

    fn label(&self, node: &DecoratedNode, open: bool) -> String {
        let title = match &node.title {
            TitleView::Plain { text } => text.clone(),
            TitleView::Highlighted {
                before,
                matched,
                after,
            } if self.color => format!("{before}{}{after}", matched.black().on_yellow()),
            TitleView::Highlighted {
                before,
                matched,
                after,
            } => format!("{before}[{matched}]{after}"),
        };

        let key = if self.color {
            format!("{}", format!("({})", node.key).dimmed())
        } else {
            format!("({})", node.key)
        };

        let folded = if !node.children.is_empty() && !open {
            format!(" +{}", node.children.len())
        } else {
            String::new()
        };

        match (node.is_leaf, self.color) {
            (false, true) => format!("{}/ {key}{folded}", title.blue()),
            (false, false) => format!("{title}/ {key}{folded}"),
            (true, _) => format!("{title} {key}"),
        }
    }
}

#[instrument(skip_all, fields(tree = %args.tree.display()))]
pub fn search(args: SearchArgs, ctx: &AppContext) -> Result<()> {
    let forest = read_forest(&args.tree)?;
    let hits = search::find_matches(&forest, &args.query);
    let expand = search::expand_paths_for_query(&forest, &args.query);

    match args.format {
        OutputFormat::Json => {
            let output = json!({
                "query": args.query,
                "expand": expand,
                "matches": hits,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct Hit {
                key: String,
                title: String,
                path: String,
            }

            let rows: Vec<Hit> = hits
                .into_iter()
                .map(|h| Hit {
                    path: h.ancestors.join(" / "),
                    key: h.key,
                    title: h.title,
                })
                .collect();
            println!("{}", Table::new(rows));
        }
        OutputFormat::Text => {
            if hits.is_empty() {
                if !ctx.quiet {
                    println!("No matches for {:?}", args.query);
                }
                return Ok(());
            }
            for hit in &hits {
                let mut path = hit.ancestors.clone();
                path.push(hit.key.clone());
                if ctx.no_color {
                    println!("{}  {}", path.join(" > "), hit.title);
                } else {
                    println!("{}  {}", path.join(" > ").dimmed(), hit.title.bold());
                }
            }
            if !ctx.quiet {
                println!("expand: {}", expand.iter().cloned().collect::<Vec<_>>().join(", "));
            }
        }
    }
    Ok(())
}
