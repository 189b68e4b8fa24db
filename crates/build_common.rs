// Shared build script helper that turns a crate README into its rustdoc front page.
// Include this in build.rs files with: include!("../build_common.rs");
//
// Required imports in the including file:
//   use std::env;
//   use std::fs;
//   use std::path::Path;

/// Write `README_GENERATED.md` to `OUT_DIR` from the crate's README.md.
///
/// Links are rewritten so they resolve inside rustdoc:
/// - `](src/` prefixes and `.rs)` suffixes are dropped so links point at modules
/// - `../../README.md` becomes the workspace repository URL
///
/// A crate without a README gets a one-line page naming the crate, so the
/// `include_str!` in `lib.rs` always has something to include.
fn process_readme_for_rustdoc(crate_dir: &str) {
    println!("cargo:rerun-if-changed=README.md");
    println!("cargo:rerun-if-changed=../../Cargo.toml");

    let rustdoc_content = match fs::read_to_string(Path::new(crate_dir).join("README.md")) {
        Ok(content) => rewrite_links(&content, workspace_repo_url(crate_dir).as_deref()),
        Err(_) => {
            let name = env::var("CARGO_PKG_NAME").unwrap_or_default();
            format!("# {name}\n")
        }
    };

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    fs::write(Path::new(&out_dir).join("README_GENERATED.md"), rustdoc_content)
        .expect("OUT_DIR is writable");
}

fn rewrite_links(content: &str, repo_url: Option<&str>) -> String {
    let rewritten = content.replace("](src/", "](").replace(".rs)", ")");
    match repo_url {
        Some(url) => rewritten.replace("](../../README.md", &format!("]({url}")),
        None => rewritten,
    }
}

/// `repository = "..."` from the workspace Cargo.toml, if present.
fn workspace_repo_url(crate_dir: &str) -> Option<String> {
    let workspace_toml = Path::new(crate_dir).parent()?.parent()?.join("Cargo.toml");
    let content = fs::read_to_string(workspace_toml).ok()?;

    content.lines().map(str::trim).find_map(|line| {
        if !line.starts_with("repository") || !line.contains('=') {
            return None;
        }
        let start = line.find('"')?;
        let end = line.rfind('"')?;
        (start < end).then(|| line[start + 1..end].to_string())
    })
}
