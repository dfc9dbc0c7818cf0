use std::env;
use std::path::{Path, PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PDFIUM_LIB_DIR");

    let target = env::var("TARGET").unwrap();

    // Manual override via PDFIUM_LIB_DIR
    if let Ok(lib_dir) = env::var("PDFIUM_LIB_DIR") {
        let lib_dir = PathBuf::from(lib_dir);
        if !lib_dir.exists() {
            panic!(
                "pdfium-sys: PDFIUM_LIB_DIR does not exist: {}",
                lib_dir.display()
            );
        }
        println!("cargo:warning=Using PDFIUM_LIB_DIR: {}", lib_dir.display());
        setup_linking(&lib_dir, &target);
        return;
    }

    // Without a library directory nothing is linked. The declarations still
    // compile, so crates that never call them (the default pdfium-core
    // build) build and test without the native library.
    println!(
        "cargo:warning=PDFIUM_LIB_DIR not set; libpdfium will not be linked \
         (set it to build with the `pdfium` feature of pdfium-core)"
    );
}

fn setup_linking(lib_dir: &Path, target: &str) {
    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=dylib=pdfium");

    // Add rpath for runtime library discovery (macOS/Linux)
    if target.contains("apple") || target.contains("linux") {
        println!("cargo:rustc-link-arg=-Wl,-rpath,{}", lib_dir.display());
    }
}
