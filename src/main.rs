fn main() -> std::process::ExitCode {
    platescan_lib::run()
}
