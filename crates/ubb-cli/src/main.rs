use crate::cmd::{run_command_with_args, Cli};
use clap::Parser;
use std::process::exit;
use tracing::trace;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cmd;
mod emoticon;
mod parse;
mod utils;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .with_env_var("UBB_LOG")
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("failed to set global cli tracing subscriber");

    trace!("starting cli");

    let cli = Cli::parse();

    if let Err(e) = run_command_with_args(cli).await {
        eprintln!("failed to run command: {e:?}");
        exit(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::Command;

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from(["ubb", "tree", "post.txt", "--emoticons", "rules.toml"])
            .unwrap();
        match cli.command {
            Command::Tree(args) => {
                assert_eq!(args.file, "post.txt");
                assert_eq!(args.emoticons.emoticons.as_deref(), Some("rules.toml"));
            }
            v => panic!("unexpected command {v:?}"),
        }

        let cli = Cli::try_parse_from(["ubb", "emoticon", "ac01"]).unwrap();
        assert!(matches!(cli.command, Command::Emoticon(ref x) if x.name == "ac01"));
    }

    #[tokio::test]
    async fn test_builtin_emoticons_without_rule_file() {
        let rules = utils::load_emoticons(&cmd::EmoticonsArgs { emoticons: None })
            .await
            .unwrap();
        assert!(rules.is_emoticon("ac01"));
    }
}
