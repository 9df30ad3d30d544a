//! Inspector front end: prints a human-readable report of one or more SLBF
//! container files.

use std::env;
use std::fs;
use std::process;

use slbf::format::Container;
use slbf::inspect::dump;

fn run(args: &[String]) -> Result<(), String> {
    let mut files: Vec<String> = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => {
                eprintln!("usage: slbf_dump file...");
                return Ok(());
            }
            a if a.starts_with('-') => return Err(format!("unknown option '{}'", a)),
            a => files.push(a.to_string()),
        }
    }
    if files.is_empty() {
        return Err("no input files".to_string());
    }
    for path in &files {
        let bytes = fs::read(path).map_err(|e| format!("cannot read '{}': {}", path, e))?;
        let container = Container::from_bytes(&bytes).map_err(|e| format!("{}: {}", path, e))?;
        println!("[FILE] {}", path);
        print!("{}", dump(&container)?);
        println!();
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("slbf_dump: error: {}", err);
        process::exit(1);
    }
}
