fn main() {
    if let Err(e) = s2_docgen::run() {
        eprintln!("s2-docgen: {e}");
        std::process::exit(1);
    }
}
