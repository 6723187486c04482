use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use opalc_drv::{Config, Session};

fn main() {
    let config = Config::parse();

    let level = if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = SimpleLogger::new().with_level(level).init();

    if let Err(e) = Session::new(config).run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
