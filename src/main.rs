fn main() {
    pkgsync::run_cli();
}
