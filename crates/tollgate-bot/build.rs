use std::{env, fs, path::PathBuf};

const LIBS: [&str; 3] = ["serenity", "axum", "tokio"];

/// Find the resolved version of a package in a lockfile
fn locked_version<'a>(lock: &'a str, name: &str) -> Option<&'a str> {
    let header = format!("name = \"{name}\"");
    let mut lines = lock.lines();

    lines.find(|l| l.trim() == header)?;
    lines
        .next()?
        .trim()
        .strip_prefix("version = \"")?
        .strip_suffix('"')
}

fn main() {
    let lock = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap()).join("../../Cargo.lock");
    println!("cargo:rerun-if-changed={}", lock.display());

    let lock = fs::read_to_string(&lock).unwrap_or_default();

    for lib in LIBS {
        println!(
            "cargo:rustc-env=TOLLGATE_BOT_{}_VERSION={}",
            lib.to_uppercase(),
            locked_version(&lock, lib).unwrap_or("unknown")
        );
    }
}
