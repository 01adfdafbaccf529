//! Stamps the binary with the git revision, build date and profile shown by
//! `smashpass --version` and the startup log line.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../.git/HEAD");

    let revision = git(&["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| "unknown".to_string());
    let build_date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=SMASHPASS_GIT_REV={}", revision);
    println!("cargo:rustc-env=SMASHPASS_BUILD_DATE={}", build_date);
    println!("cargo:rustc-env=SMASHPASS_BUILD_PROFILE={}", profile);
}

/// Trimmed stdout of a git command, `None` outside a checkout
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
