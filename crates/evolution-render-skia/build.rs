// File: crates/evolution-render-skia/build.rs
// Summary: Build script to link required Windows system libraries for Skia/ICU.

fn main() {
    #[cfg(target_os = "windows")]
    {
        // Skia's font manager reads the registry (RegOpenKeyExW, RegQueryInfoKeyW).
        println!("cargo:rustc-link-lib=advapi32");
    }
}
