use std::env;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let version = match git_describe() {
        Some(tag) if tag.ends_with("-dirty") => format!("{}.{}", tag, build_time()),
        Some(tag) => tag,
        // Source tarball or no git binary: fall back to the manifest version.
        None => {
            let manifest = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".into());
            format!("{}+nogit.{}", manifest, build_time())
        }
    };

    println!("cargo:rustc-env=SLOTWATCH_VERSION={}", version);
}

/// `git describe` output without a leading `v`, or `None` outside a checkout.
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    let tag = described.strip_prefix('v').unwrap_or(described);

    (!tag.is_empty()).then(|| tag.to_string())
}

fn build_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
