//! The program driver: read a Scheme program, interpret it, exit.
//!
//! Source comes from standard input, or from a file named as the single
//! command-line argument. Any parse or evaluation error prints a diagnostic
//! and exits with status 1; every error is fatal to the session.

use std::env;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

use rusp::interp::Interp;

fn main() {
    let interp = Interp::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match env::args().nth(1) {
        Some(path) => match File::open(&path) {
            Ok(file) => interp.interpret(BufReader::new(file), &mut out),
            Err(err) => {
                eprintln!("{}: {}", path, err);
                process::exit(1);
            }
        },
        None => {
            let stdin = io::stdin();
            let lock = stdin.lock();
            interp.interpret(lock, &mut out)
        }
    };

    if let Err(err) = result {
        let _ = out.flush();
        eprintln!("{}", err);
        process::exit(1);
    }
}
