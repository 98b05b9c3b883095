use clap::ArgMatches;
use clap_complete::{generate, Shell};
use heapflow::prelude::*;
use heapflow::{cli, hf_cha, hf_hierarchy, hf_pta};
use std::io;

fn main() -> HfResult<()> {
    let args = cli::heapflow().get_matches();

    match &args.subcommand() {
        Some(("cha", cmd_args)) => hf_cha::run(cmd_args),
        Some(("hierarchy", cmd_args)) => hf_hierarchy::run(cmd_args),
        Some(("pta", cmd_args)) => hf_pta::run(cmd_args),
        Some(("gen-completions", sub_args)) => subcommand_gen_completions(sub_args),
        Some((subcommand, _)) => Err(HfError::BadArguments(format!(
            "unknown subcommand '{subcommand}'"
        ))),
        None => Err(HfError::BadArguments("missing subcommand".to_string())),
    }
}

fn subcommand_gen_completions(sub_args: &ArgMatches) -> HfResult<()> {
    let generator = *sub_args
        .get_one::<Shell>("shell")
        .ok_or_else(|| HfError::BadArguments("--shell needed".to_string()))?;
    let mut cmd = cli::heapflow();
    let cmd_name = cmd.get_name().to_string();
    generate(generator, &mut cmd, cmd_name, &mut io::stdout());
    Ok(())
}
