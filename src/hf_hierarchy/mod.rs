use crate::prelude::*;
use clap::ArgMatches;
use std::fs::File;
use std::io::Write;

pub fn run(args: &ArgMatches) -> HfResult<()> {
    init_logger(args);

    let input_fname = args
        .get_one::<String>("input")
        .ok_or_else(|| HfError::BadArguments("--input needed".to_string()))?;
    let program = load_program(input_fname)?;

    if args.get_flag("missing") {
        for name in program.iter_missing_classes() {
            println!("{name}");
        }
    }

    log::info!(
        "hierarchy contains {} classes and {} links",
        program.nb_classes(),
        program.hierarchy().nb_links()
    );
    if let Some(dot_filename) = args.get_one::<String>("output") {
        let mut file = File::create(dot_filename)?;
        file.write_all(program.hierarchy().to_dot(&program).as_bytes())?;
        log::info!("dot output written in {:?}", dot_filename);
    }
    Ok(())
}
