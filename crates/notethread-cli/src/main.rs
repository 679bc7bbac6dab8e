use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use notethread_core::config::CoreConfig;
use notethread_core::models::{lookup_by_id, Note, ThreadNote};
use notethread_core::store::{load_notes, save_notes};
use notethread_core::thread_index::{
    change_parent, find_orphans, repair_all_orphans, IndexCache, ThreadTree,
};
use notethread_core::tracing_setup::init_tracing;

mod render;

use render::{format_timestamp, print_tree};

#[derive(Parser, Debug)]
#[command(name = "notethread")]
#[command(about = "Inspect and edit reply threads in a note collection")]
struct Args {
    /// Data directory holding notes.json (or NOTETHREAD_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the thread rooted at a note
    Tree {
        root_id: String,
        /// Emit the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// List thread roots with their reply counts
    Roots,
    /// List notes whose parent no longer exists
    Orphans {
        /// Promote them to roots and save
        #[arg(long)]
        repair: bool,
    },
    /// Move a note under a new parent (omit the parent to make it a root)
    Reparent {
        id: String,
        new_parent: Option<String>,
    },
    /// Add a reply to an existing note
    Reply {
        parent_id: String,
        id: String,
        title: String,
    },
    /// Collection summary
    Stats,
}

fn resolve_data_dir(args: &Args) -> PathBuf {
    if let Some(ref dir) = args.data_dir {
        return dir.clone();
    }
    if let Ok(dir) = std::env::var("NOTETHREAD_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::data_dir()
        .map(|dir| dir.join("notethread"))
        .unwrap_or_else(|| CoreConfig::default().data_dir)
}

fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let config = CoreConfig::new(resolve_data_dir(&args));
    let notes_path = config.notes_path();

    let mut notes = load_notes(&notes_path)
        .with_context(|| format!("loading notes from {}", notes_path.display()))?;
    let mut cache = IndexCache::with_config(&config);

    match args.command {
        Command::Tree { root_id, json } => {
            if !notes.iter().any(|n| n.id == root_id) {
                anyhow::bail!("No note with id {}", root_id);
            }
            let index = cache.get_index(&notes);
            let lookup = lookup_by_id(&notes);
            let tree = cache.get_thread_tree(&root_id, &index, &lookup);
            if json {
                println!("{}", serde_json::to_string_pretty(tree.as_ref())?);
            } else {
                print_tree(&tree, &lookup);
                print_tree_summary(&tree);
            }
        }
        Command::Roots => {
            let index = cache.get_index(&notes);
            // Input order, so the listing is stable across runs
            for note in notes.iter().filter(|n| index.is_root(&n.id)) {
                println!(
                    "{}  {} ({} replies)",
                    note.id,
                    note.title,
                    index.descendant_count(&note.id)
                );
            }
        }
        Command::Orphans { repair } => {
            let orphan_lines: Vec<String> = find_orphans(&notes)
                .iter()
                .map(|n| {
                    format!(
                        "{}  (missing parent {})",
                        n.id,
                        n.parent_id.as_deref().unwrap_or("")
                    )
                })
                .collect();
            if orphan_lines.is_empty() {
                println!("No orphans.");
                return Ok(());
            }
            for line in &orphan_lines {
                println!("{}", line);
            }
            if repair {
                let repaired = repair_all_orphans(&mut notes);
                save_notes(&notes_path, &notes)?;
                cache.rebuild(&notes);
                tracing::info!(
                    "cli: repaired {} orphan(s), saved to {}",
                    repaired,
                    notes_path.display()
                );
                println!("Promoted {} note(s) to root.", repaired);
            }
        }
        Command::Reparent { id, new_parent } => {
            let index = cache.get_index(&notes);
            if let Some(ref parent) = new_parent {
                if !notes.iter().any(|n| &n.id == parent) {
                    anyhow::bail!("No note with id {}", parent);
                }
            }
            let note = notes
                .iter_mut()
                .find(|n| n.id == id)
                .with_context(|| format!("No note with id {}", id))?;

            let moved = change_parent(note, new_parent.as_deref(), Some(&*index));
            if !moved {
                tracing::warn!("cli: reparent of {} rejected, nothing saved", id);
                // Nothing is saved, so the stored parent is unchanged
                anyhow::bail!(
                    "Moving {} under {} would create a cycle",
                    id,
                    new_parent.as_deref().unwrap_or("")
                );
            }
            save_notes(&notes_path, &notes)?;
            cache.rebuild(&notes);
            tracing::info!(
                "cli: reparented {} under {:?}, saved to {}",
                id,
                new_parent,
                notes_path.display()
            );
            match new_parent {
                Some(parent) => println!("{} is now a reply to {}.", id, parent),
                None => println!("{} is now a thread root.", id),
            }
        }
        Command::Reply { parent_id, id, title } => {
            if notes.iter().any(|n| n.id == id) {
                anyhow::bail!("A note with id {} already exists", id);
            }
            if !notes.iter().any(|n| n.id == parent_id) {
                anyhow::bail!("No note with id {}", parent_id);
            }
            notes.push(Note::reply(id.clone(), parent_id.clone(), now_millis()).with_title(title));
            save_notes(&notes_path, &notes)?;
            let index = cache.rebuild(&notes);
            tracing::info!("cli: added reply {} to {}", id, parent_id);
            println!("Added {} at depth {}.", id, index.depth(&id));
        }
        Command::Stats => {
            let index = cache.get_index(&notes);
            let orphan_count = find_orphans(&notes).len();
            println!("Notes:     {}", notes.len());
            println!("Threads:   {}", index.root_ids.len());
            println!("Orphans:   {}", orphan_count);
            println!("Max depth: {}", index.max_depth());
            if let Some(latest) = notes.iter().map(ThreadNote::updated_marker).max() {
                println!("Updated:   {}", format_timestamp(latest));
            }
        }
    }

    Ok(())
}

fn print_tree_summary(tree: &ThreadTree) {
    println!();
    println!(
        "{} note(s), max depth {}, last updated {}",
        tree.total_count,
        tree.max_depth,
        tree.last_updated
            .map(format_timestamp)
            .unwrap_or_else(|| "-".to_string())
    );
}
