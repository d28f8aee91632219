fn main() {
    let outcome = rush_pnpm::run();
    std::process::exit(outcome.exit_status);
}
