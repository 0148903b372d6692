use crate::cmd::EmoticonArgs;
use crate::utils::load_emoticons;
use anyhow::{bail, Result};

pub async fn run_emoticon_command(args: EmoticonArgs) -> Result<()> {
    let rules = load_emoticons(&args.emoticons).await?;
    let Some((url, label)) = rules.resolve(args.name.as_str()) else {
        bail!("{:?} is not an emoticon code", args.name);
    };
    println!("{label}\t{url}");
    Ok(())
}
