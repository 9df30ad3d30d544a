//! Linker front end: merges SLBF object files into a library or executable.

use std::env;
use std::fs;
use std::process;

use slbf::format::Container;
use slbf::linker::{link, LinkInput, LinkMode};

fn usage() {
    eprintln!("usage: slbf_ld [options] file...");
    eprintln!("  -o FILE         output file (default a.mx, or a.mlib with --lib)");
    eprintln!("  --lib           produce a relocatable library instead of an executable");
    eprintln!("  --entry NAME    entry symbol for executables (default main)");
    eprintln!("  -v, --verbose   report progress on stderr");
    eprintln!("  -h, --help      show this message");
}

fn run(args: &[String]) -> Result<(), String> {
    let mut output: Option<String> = None;
    let mut entry = "main".to_string();
    let mut lib = false;
    let mut verbose = false;
    let mut files: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                usage();
                return Ok(());
            }
            "-v" | "--verbose" => verbose = true,
            "--lib" => lib = true,
            "--entry" => {
                i += 1;
                entry = args
                    .get(i)
                    .ok_or_else(|| "--entry requires a symbol name".to_string())?
                    .clone();
            }
            "-o" => {
                i += 1;
                output = args
                    .get(i)
                    .ok_or_else(|| "-o requires a file name".to_string())
                    .map(|s| Some(s.clone()))?;
            }
            arg if arg.starts_with('-') => return Err(format!("unknown option '{}'", arg)),
            arg => files.push(arg.to_string()),
        }
        i += 1;
    }

    if files.is_empty() {
        return Err("no input files".to_string());
    }
    let mode = if lib { LinkMode::Library } else { LinkMode::Executable };
    let output = output.unwrap_or_else(|| if lib { "a.mlib" } else { "a.mx" }.to_string());

    let mut inputs = Vec::new();
    for path in &files {
        if verbose {
            eprintln!("slbf_ld: reading {}", path);
        }
        let bytes = fs::read(path).map_err(|e| format!("cannot read '{}': {}", path, e))?;
        let container =
            Container::from_bytes(&bytes).map_err(|e| format!("{}: {}", path, e))?;
        inputs.push(LinkInput { name: path.clone(), container });
    }

    if verbose {
        eprintln!("slbf_ld: linking {} input(s), entry '{}'", inputs.len(), entry);
    }
    let merged = link(mode, &entry, &inputs)?;
    fs::write(&output, merged.to_bytes())
        .map_err(|e| format!("cannot write '{}': {}", output, e))?;
    if verbose {
        eprintln!("slbf_ld: wrote {}", output);
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("slbf_ld: error: {}", err);
        process::exit(1);
    }
}
