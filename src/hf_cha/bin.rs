use heapflow::prelude::HfResult;
use heapflow::{cli, hf_cha};

fn main() -> HfResult<()> {
    let args = cli::cha().get_matches();
    hf_cha::run(&args)
}
