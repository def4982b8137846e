use std::process;

fn main() {
    if let Err(e) = taskwright::cli::run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
