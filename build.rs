use std::process::Command;

fn main() {
    // Bake the short commit hash into `plansight version` when building from a git checkout
    match Command::new("git").args(["rev-parse", "--short", "HEAD"]).output() {
        Ok(output) if output.status.success() => {
            let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !commit.is_empty() {
                println!("cargo:rustc-env=PLANSIGHT_GIT_COMMIT={}", commit);
            }
        },
        Ok(_) => println!("cargo:warning=Not a git checkout, version will omit the commit hash"),
        Err(e) => println!("cargo:warning=Failed to run git: {}", e),
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    // Also rerun if the build script itself changes
    println!("cargo:rerun-if-changed=build.rs");
}
