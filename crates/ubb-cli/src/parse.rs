use crate::cmd::SourceArgs;
use crate::utils::{load_emoticons, read_source};
use anyhow::{Context, Result};
use tracing::trace;
use ubb_parser::{parse_with, scan, UbbDocument};

pub async fn run_tokens_command(args: SourceArgs) -> Result<()> {
    let content = read_source(args.file.as_str()).await?;
    for token in scan(content) {
        println!("{token}");
    }
    Ok(())
}

pub async fn run_tree_command(args: SourceArgs) -> Result<()> {
    let document = load_document(&args).await?;
    print!("{}", document.render_tree());
    Ok(())
}

pub async fn run_json_command(args: SourceArgs) -> Result<()> {
    let document = load_document(&args).await?;
    let json = serde_json::to_string_pretty(&document).context("failed to serialize document")?;
    println!("{json}");
    Ok(())
}

pub async fn run_stats_command(args: SourceArgs) -> Result<()> {
    let document = load_document(&args).await?;
    let stats = document.stats();
    println!("total nodes: {}", stats.total);
    println!("tag nodes:   {}", stats.tags);
    println!("text nodes:  {}", stats.texts);
    println!("math nodes:  {}", stats.latex);
    println!("max depth:   {}", stats.max_depth);
    Ok(())
}

async fn load_document(args: &SourceArgs) -> Result<UbbDocument> {
    let emoticons = load_emoticons(&args.emoticons).await?;
    let content = read_source(args.file.as_str()).await?;
    let document = parse_with(content, &emoticons);
    trace!("parsed {} into {} nodes", args.file, document.nodes().len());
    Ok(document)
}
