//! Build script for lowboot-hwinit.
//!
//! Assembles the real-mode trampoline when the `bios-thunk` feature is on
//! and the target is 32-bit x86. Everything else is pure Rust.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const ASM_BRIDGE: &[&str] = &["asm/bridge/call16.s"];

fn main() {
    let target = env::var("TARGET").unwrap_or_default();
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_BIOS_THUNK").is_none() {
        return;
    }

    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    if arch != "x86" {
        println!("cargo:warning=bios-thunk needs a 32-bit x86 target, got: {}", target);
        return;
    }

    let obj_format = if target.contains("windows") || target.contains("uefi") {
        "win32"
    } else {
        "elf32"
    };

    let mut objects = Vec::new();

    for path in ASM_BRIDGE.iter() {
        println!("cargo:rerun-if-changed={}", path);
        match assemble(path, &out_dir, obj_format) {
            Ok(obj) => objects.push(obj),
            Err(e) => panic!("ASM failed {}: {}", path, e),
        }
    }

    let lib = out_dir.join("libhwinit_bridge.a");
    let mut args: Vec<String> = vec!["crs".into(), lib.to_str().unwrap().into()];
    args.extend(objects.iter().map(|p| p.to_str().unwrap().into()));

    let out = Command::new("ar").args(&args).output().expect("ar failed");
    if !out.status.success() {
        panic!("ar failed: {}", String::from_utf8_lossy(&out.stderr));
    }

    println!("cargo:rustc-link-search=native={}", out_dir.display());
    println!("cargo:rustc-link-lib=static=hwinit_bridge");
}

fn assemble(path: &str, out_dir: &Path, fmt: &str) -> Result<PathBuf, String> {
    let obj_name = path.replace('/', "_").replace(".s", ".o");
    let obj = out_dir.join(&obj_name);

    let out = Command::new("nasm")
        .args(["-f", fmt, "-o", obj.to_str().unwrap(), "-I", "asm/", path])
        .output()
        .map_err(|e| e.to_string())?;

    if !out.status.success() {
        return Err(String::from_utf8_lossy(&out.stderr).into());
    }
    Ok(obj)
}
