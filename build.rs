fn main() {
    if std::env::var_os("CARGO_CFG_UNIX").is_none() {
        panic!(
            "{} only works on unix targets (SIGTERM and sysconf are required)",
            env!("CARGO_PKG_NAME")
        );
    }

    println!("cargo:rerun-if-changed=build.rs");
}
