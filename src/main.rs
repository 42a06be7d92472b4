fn main() -> std::process::ExitCode {
    updater_lib::run()
}
