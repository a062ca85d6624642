fn main() {
    // Version suffix: PRICER_GIT_HASH (for builds outside a checkout), else git short hash
    println!("cargo:rerun-if-env-changed=PRICER_GIT_HASH");
    let git_hash = std::env::var("PRICER_GIT_HASH").ok().unwrap_or_else(|| {
        std::process::Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    });

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
