//! Flat-loader front end: renders an SLBF executable as a Logisim memory
//! image with no section relocation.

use std::env;
use std::fs;
use std::process;

use slbf::format::Container;
use slbf::image::export_flat;

fn usage() {
    eprintln!("usage: slbf_flat [options] file");
    eprintln!("  -o FILE         output file (default a.lsi)");
    eprintln!("  -v, --verbose   report progress on stderr");
    eprintln!("  -h, --help      show this message");
}

fn run(args: &[String]) -> Result<(), String> {
    let mut output = "a.lsi".to_string();
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
            "-o" => {
                i += 1;
                output = args
                    .get(i)
                    .ok_or_else(|| "-o requires a file name".to_string())?
                    .clone();
            }
            arg if arg.starts_with('-') => return Err(format!("unknown option '{}'", arg)),
            arg => files.push(arg.to_string()),
        }
        i += 1;
    }

    if files.is_empty() {
        return Err("no executable file specified".to_string());
    }
    if files.len() > 1 {
        eprintln!("slbf_flat: warning: extra input files ignored, using {}", files[0]);
    }

    let bytes =
        fs::read(&files[0]).map_err(|e| format!("cannot read '{}': {}", files[0], e))?;
    let container =
        Container::from_bytes(&bytes).map_err(|e| format!("{}: {}", files[0], e))?;
    let lines = export_flat(&container)?;
    if verbose {
        eprintln!("slbf_flat: {} image line(s)", lines.len() - 1);
    }
    fs::write(&output, lines.join("\n") + "\n")
        .map_err(|e| format!("cannot write '{}': {}", output, e))?;
    if verbose {
        eprintln!("slbf_flat: wrote {}", output);
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("slbf_flat: error: {}", err);
        process::exit(1);
    }
}
