fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    // Empty outside a git checkout (e.g. a published crate tarball).
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    println!("cargo:rustc-env=BUILD_GIT_HASH={hash}");
}
