// build.rs

use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Cargo points OUT_DIR at the per-build scratch directory
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

    // Emit a constant the binary include!()s at compile time
    fs::write(
        &dest_path,
        format!("pub const BUILD_DATE: &str = \"{}\";\n", build_date),
    )
    .unwrap();

    // Re-run only when the script itself changes so the date refreshes per build
    println!("cargo:rerun-if-changed=build.rs");
}
