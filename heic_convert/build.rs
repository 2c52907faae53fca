// Link-search paths for a Homebrew-installed libheif on macOS.
// Linux distributions put it on the default linker path.

fn main() {
    if cfg!(target_os = "macos") {
        let prefix = if cfg!(target_arch = "aarch64") {
            "/opt/homebrew"
        } else {
            "/usr/local"
        };

        println!("cargo:rustc-link-search=native={}/lib", prefix);
        println!("cargo:rustc-link-search=native={}/opt/libheif/lib", prefix);
    }
    println!("cargo:rerun-if-changed=build.rs");
}
