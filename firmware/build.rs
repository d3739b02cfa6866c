use std::{env, fs, path::PathBuf};

fn main() {
    // Put the linker script somewhere the linker can find it, so that
    // cortex-m-rt's link.x can INCLUDE memory.x.
    let out = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    fs::write(out.join("memory.x"), include_bytes!("memory.x")).unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}
