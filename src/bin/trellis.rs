//! `trellis` binary: schema and operator inspection from a terminal.

fn main() {
    trellis::cli::run();
}
