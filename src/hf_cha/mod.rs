use crate::prelude::*;
use clap::ArgMatches;
use regex::Regex;
use std::fs::File;
use std::io::Write;

pub fn run(args: &ArgMatches) -> HfResult<()> {
    init_logger(args);

    let input_fname = args
        .get_one::<String>("input")
        .ok_or_else(|| HfError::BadArguments("--input needed".to_string()))?;
    let program = load_program(input_fname)?;

    let cg = match args.get_one::<String>("filter-method") {
        None => cha::build_call_graph(&program)?,
        Some(filter) => {
            let pattern = Regex::new(filter)?;
            log::debug!("filtering callgraph on method pattern {:?}", pattern);
            cha::build_call_graph(&program)?
                .filter(|m| pattern.is_match(&program[m].to_string()))
        }
    };

    log::info!(
        "callgraph contains {} methods and {} edges",
        cg.nb_reachable_methods(),
        cg.nb_edges()
    );

    if let Some(dot_filename) = args.get_one::<String>("output") {
        let mut file = File::create(dot_filename)?;
        file.write_all(cg.to_dot(|m| program[m].to_string()).as_bytes())?;
        log::info!("dot output written in {:?}", dot_filename);
    }

    Ok(())
}
