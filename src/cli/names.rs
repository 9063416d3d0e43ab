use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use crate::names::{store::NameTableFile, NameKind, NameNormalizer};

pub const NAMES_FILE: &str = "names.json";

#[derive(Subcommand, Debug)]
pub enum NamesCommand {
    #[command(about = "Map a spelling to its canonical name")]
    Register {
        kind: NameKind,
        original: String,
        canonical: String,
    },
    #[command(about = "Print the canonical name for a spelling")]
    Resolve { kind: NameKind, name: String },
    #[command(about = "List registered spellings in lookup order")]
    List { kind: Option<NameKind> },
}

pub async fn process_names_command(app_dir: &Path, command: NamesCommand) -> Result<()> {
    let store = NameTableFile::new(app_dir.join(NAMES_FILE));

    match command {
        NamesCommand::Register {
            kind,
            original,
            canonical,
        } => {
            store
                .update(|names| names.register(kind, &original, &canonical))
                .await?;
            info!("Registered {kind} {original:?} as {canonical:?}");
        }
        NamesCommand::Resolve { kind, name } => {
            let names = store.load().await?;
            println!("{}", names.resolve(kind, &name));
        }
        NamesCommand::List { kind } => {
            let names = store.load().await?;
            match kind {
                Some(kind) => print_entries(&names, kind),
                None => {
                    print_entries(&names, NameKind::Clients);
                    print_entries(&names, NameKind::Projects);
                }
            }
        }
    }
    Ok(())
}

fn print_entries(names: &NameNormalizer, kind: NameKind) {
    for entry in names.entries(kind) {
        println!("{kind}\t{}\t{}", entry.original, entry.canonical);
    }
}
