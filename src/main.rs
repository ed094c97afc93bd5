fn main() {
    if let Err(e) = labtrack::run() {
        eprintln!("labtrack: {e}");
        std::process::exit(1);
    }
}
