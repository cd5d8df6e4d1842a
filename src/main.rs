use clap::Parser;
use snafu::ErrorCompat;

mod args;
mod conv;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    match conv::run_conversion(&args) {
        Ok(num_records) => {
            println!("Wrote {} records to {}", num_records, args.out);
        }
        Err(e) => {
            eprintln!("An error occured {}", e);
            if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
                eprintln!("trace: {}", bt);
            }
            std::process::exit(1);
        }
    }
}
