use heapflow::prelude::HfResult;
use heapflow::{cli, hf_pta};

fn main() -> HfResult<()> {
    let args = cli::pta().get_matches();
    hf_pta::run(&args)
}
