use std::env;
use log::{error, info};
use rp5_archive::initialization::{init, parse_args, USAGE};
use rp5_archive::worker::{self, Source};

fn main() {
    let args = match parse_args(env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => { eprintln!("{}", e); std::process::exit(1); }
    };
    if args.help {
        println!("{}", USAGE);
        return;
    }

    let config = match init(&args) {
        Ok(c) => c,
        Err(e) => { eprintln!("Error during initialization: {:#}", e); std::process::exit(1); }
    };

    let source = match &args.from_html {
        Some(path) => Source::Snapshot(path.clone()),
        None => Source::Live,
    };

    match worker::run(&config, source) {
        Ok(Some(path)) => info!("data saved to {}", path.display()),
        Ok(None) => info!("no data parsed"),
        Err(e) => error!("archive run failed: {}", e),
    }
}
