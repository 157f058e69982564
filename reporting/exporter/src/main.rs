//! EPT 重建结果分析与导出入口.

use log::LevelFilter;

mod export;
mod runner;

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    let Some(args) = runner::parse_args() else {
        eprintln!("usage: exporter <input_stem> <dataset_name> [working_dir]");
        std::process::exit(2);
    };
    runner::run(&args);
}
