fn main() {
    if let Err(err) = springview::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
