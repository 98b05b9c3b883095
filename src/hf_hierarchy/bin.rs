use heapflow::prelude::HfResult;
use heapflow::{cli, hf_hierarchy};

fn main() -> HfResult<()> {
    let args = cli::hierarchy().get_matches();
    hf_hierarchy::run(&args)
}
