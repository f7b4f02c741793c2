fn main() {
    // Delegate to CLI runner; the error chain is printed here.
    if let Err(err) = langstats::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
