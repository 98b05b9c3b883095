//! Main `HeapFlow` binary command line arguments options.
//!
//! This module declares a function to build `clap` command line arguments
//! parser, so that it can be used from other places than the main binary,
//! such as from bash completion file generator.

use clap::{value_parser, Arg, ArgAction, Command};
use clap_complete::Shell;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

fn arg_debug() -> Arg {
    Arg::new("debug")
        .short('d')
        .long("debug")
        .action(ArgAction::SetTrue)
        .help("Activate debug mode")
}

fn arg_verbose() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Activate verbose mode")
}

fn arg_ecslog() -> Arg {
    Arg::new("ecslog")
        .short('e')
        .long("ecslog")
        .action(ArgAction::SetTrue)
        .help("Output logs in ECS format")
}

fn arg_input() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .action(ArgAction::Set)
        .required(true)
        .help("Input program (JSON)")
}

fn arg_output(help: &str) -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .action(ArgAction::Set)
        .help(help.to_string())
}

fn arg_filter_method() -> Arg {
    Arg::new("filter-method")
        .long("filter-method")
        .action(ArgAction::Set)
        .help("Method(s) regex filter")
}

#[must_use]
pub fn heapflow() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author(AUTHORS)
        .about(DESCRIPTION)
        .subcommand(cha())
        .subcommand(hierarchy())
        .subcommand(pta())
        .subcommand(
            Command::new("gen-completions")
                .about("Generates completions file")
                .arg(
                    Arg::new("shell")
                        .short('s')
                        .long("shell")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(Shell))
                        .required(true)
                        .help("Shell type for completion generation"),
                ),
        )
}

#[must_use]
pub fn cha() -> Command {
    Command::new("cha")
        .bin_name("hf-cha")
        .version(VERSION)
        .author(AUTHORS)
        .about("Builds the call graph by class hierarchy analysis")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(arg_output("Output dot file"))
        .arg(arg_filter_method())
}

#[must_use]
pub fn hierarchy() -> Command {
    Command::new("hierarchy")
        .bin_name("hf-hierarchy")
        .version(VERSION)
        .author(AUTHORS)
        .about("Generates classes hierarchy graph")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(arg_output("Output dot file"))
        .arg(
            Arg::new("missing")
                .short('m')
                .long("missing")
                .action(ArgAction::SetTrue)
                .help("List classes that are referenced but not defined"),
        )
}

#[must_use]
pub fn pta() -> Command {
    Command::new("pta")
        .bin_name("hf-pta")
        .version(VERSION)
        .author(AUTHORS)
        .about("Runs the context-sensitive points-to analysis")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(
            Arg::new("context")
                .short('c')
                .long("context")
                .action(ArgAction::Set)
                .default_value("ci")
                .help("Context sensitivity: ci, <k>-call, <k>-obj or <k>-type"),
        )
        .arg(arg_output("Output call graph dot file"))
        .arg(
            Arg::new("pfg")
                .long("pfg")
                .action(ArgAction::Set)
                .help("Output pointer flow graph dot file"),
        )
        .arg(
            Arg::new("cs-callgraph")
                .long("cs-callgraph")
                .action(ArgAction::SetTrue)
                .help("Export the call graph with contexts"),
        )
        .arg(
            Arg::new("dump")
                .long("dump")
                .action(ArgAction::SetTrue)
                .help("Print points-to sets of variables"),
        )
        .arg(
            Arg::new("filter-var")
                .long("filter-var")
                .action(ArgAction::Set)
                .help("Variable(s) regex filter for the dump"),
        )
        .arg(arg_filter_method())
}
