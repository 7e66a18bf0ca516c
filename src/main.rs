fn main() -> std::process::ExitCode {
    patchlauncher_lib::run()
}
