use crate::emoticon::run_emoticon_command;
use crate::parse::{run_json_command, run_stats_command, run_tokens_command, run_tree_command};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};

///////// Args /////////

#[derive(Clone, Debug, Args)]
pub struct SourceArgs {
    #[arg(help = "File path to the ubb markup to read")]
    pub file: String,

    #[command(flatten)]
    pub emoticons: EmoticonsArgs,
}

#[derive(Clone, Debug, Args)]
pub struct EmoticonsArgs {
    #[arg(
        long = "emoticons",
        help = "Path to a toml file defining emoticon rules, replacing the built-in ones"
    )]
    pub emoticons: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct EmoticonArgs {
    #[arg(help = "Emoticon code to resolve, like ac01")]
    pub name: String,

    #[command(flatten)]
    pub emoticons: EmoticonsArgs,
}

///////// Subcommand /////////

#[derive(Clone, Debug, Parser)]
#[command(name = "ubb")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    #[command(about = "print tokens produced by the lexer")]
    Tokens(SourceArgs),

    #[command(about = "print the parsed document tree")]
    Tree(SourceArgs),

    #[command(about = "print the parsed document as json")]
    Json(SourceArgs),

    #[command(about = "print node statistics of the parsed document")]
    Stats(SourceArgs),

    #[command(about = "resolve an emoticon code into its url and group")]
    Emoticon(EmoticonArgs),
}

/// Main entry of all subcommands.
pub async fn run_command_with_args(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Tokens(args) => run_tokens_command(args).await,
        Command::Tree(args) => run_tree_command(args).await,
        Command::Json(args) => run_json_command(args).await,
        Command::Stats(args) => run_stats_command(args).await,
        Command::Emoticon(args) => run_emoticon_command(args).await,
    }
}
