fn main() {
    if let Err(err) = map_label::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
