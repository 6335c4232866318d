use std::process::Command;

/// Commit hash for `schedval --version`. Release tarballs have no `.git`,
/// so packagers can pass `SCHEDVAL_GIT_HASH` instead.
fn git_hash() -> String {
    if let Ok(hash) = std::env::var("SCHEDVAL_GIT_HASH") {
        return hash;
    }
    Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/heads");
    println!("cargo:rerun-if-env-changed=SCHEDVAL_GIT_HASH");

    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", git_hash());

    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TARGET={}", target);
}
