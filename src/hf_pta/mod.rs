use crate::prelude::*;
use clap::ArgMatches;
use nu_ansi_term::Color;
use regex::Regex;
use std::fs::File;
use std::io::Write;

pub fn run(args: &ArgMatches) -> HfResult<()> {
    init_logger(args);

    let input_fname = args
        .get_one::<String>("input")
        .ok_or_else(|| HfError::BadArguments("--input needed".to_string()))?;
    let program = load_program(input_fname)?;

    let sensitivity: ContextSensitivity = args
        .get_one::<String>("context")
        .ok_or_else(|| HfError::BadArguments("--context needed".to_string()))?
        .parse()?;
    let result = pta::analyze(&program, PtaOptions::new(sensitivity))?;

    for line in result.stats().to_string().lines() {
        log::info!("{line}");
    }

    let method_pattern = args
        .get_one::<String>("filter-method")
        .map(|r| Regex::new(r))
        .transpose()?;
    let var_pattern = args
        .get_one::<String>("filter-var")
        .map(|r| Regex::new(r))
        .transpose()?;
    let method_matches = |method: &Method| {
        method_pattern
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(&method.to_string()))
    };

    if let Some(dot_filename) = args.get_one::<String>("output") {
        let dot = if args.get_flag("cs-callgraph") {
            result
                .call_graph()
                .filter(|m| method_matches(&program[m.method()]))
                .to_dot(|m| result.cs_method_label(m))
        } else {
            result
                .ci_call_graph()
                .filter(|m| method_matches(&program[m]))
                .to_dot(|m| program[m].to_string())
        };
        let mut file = File::create(dot_filename)?;
        file.write_all(dot.as_bytes())?;
        log::info!("call graph written in {:?}", dot_filename);
    }

    if let Some(dot_filename) = args.get_one::<String>("pfg") {
        let mut file = File::create(dot_filename)?;
        file.write_all(result.pfg_to_dot().as_bytes())?;
        log::info!("pointer flow graph written in {:?}", dot_filename);
    }

    if args.get_flag("dump") {
        for method in result.ci_call_graph().reachable_methods() {
            let method = &program[method];
            if !method_matches(method) {
                continue;
            }
            for var in method.vars() {
                let var = &program[*var];
                if let Some(pattern) = &var_pattern {
                    if !pattern.is_match(var.name()) {
                        continue;
                    }
                }
                let objs = result.var_points_to(var.uid());
                if objs.is_empty() {
                    continue;
                }
                println!(
                    "{}/{}",
                    Color::Blue.paint(method.to_string()),
                    Color::Green.bold().paint(var.name())
                );
                for obj in objs {
                    println!("    {}", result.object(obj).display(&program));
                }
            }
        }
    }

    Ok(())
}
