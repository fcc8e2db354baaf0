fn main() -> std::process::ExitCode {
    linguasort_lib::run()
}
