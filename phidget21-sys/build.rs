use std::env;
use std::path::PathBuf;

// These helper functions are only used when phidget-sdk feature is enabled
#[allow(dead_code)]
/// Print a boxed warning block for visibility in cargo output
fn print_env_warning(title: &str, details: &[&str], fixes: &[&str]) {
    eprintln!();
    eprintln!("╔══════════════════════════════════════════════════════════════════╗");
    eprintln!("║ PHIDGET21 BUILD WARNING: {:<40} ║", title);
    eprintln!("╠══════════════════════════════════════════════════════════════════╣");
    for detail in details {
        eprintln!("║ {:<66} ║", detail);
    }
    eprintln!("╠══════════════════════════════════════════════════════════════════╣");
    eprintln!("║ HOW TO FIX:                                                      ║");
    for fix in fixes {
        eprintln!("║   {:<64} ║", fix);
    }
    eprintln!("╚══════════════════════════════════════════════════════════════════╝");
    eprintln!();
}

#[allow(dead_code)]
/// Check common install locations for libphidget21
fn find_phidget21_lib() -> Option<PathBuf> {
    let candidates = [
        ("/usr/lib", "libphidget21.so"),
        ("/usr/local/lib", "libphidget21.so"),
        ("/usr/lib/x86_64-linux-gnu", "libphidget21.so"),
        ("/usr/lib/aarch64-linux-gnu", "libphidget21.so"),
        ("/usr/local/lib", "libphidget21.dylib"),
        ("/Library/Frameworks", "Phidget21.framework"),
        ("C:\\Program Files\\Phidgets", "phidget21.lib"),
    ];

    for (dir, file) in &candidates {
        let p = PathBuf::from(dir);
        if p.join(file).exists() {
            return Some(p);
        }
    }
    None
}

#[allow(dead_code)]
/// Print diagnostic information about the environment
fn print_env_diagnostics() {
    eprintln!();
    eprintln!("=== phidget21 Build Diagnostics ===");
    eprintln!("PHIDGET21_LIB_DIR: {:?}", env::var("PHIDGET21_LIB_DIR").ok());
    eprintln!("LIBRARY_PATH: {:?}", env::var("LIBRARY_PATH").ok());
    eprintln!("LD_LIBRARY_PATH: {:?}", env::var("LD_LIBRARY_PATH").ok());
    if let Some(found) = find_phidget21_lib() {
        eprintln!("Auto-detected lib at: {:?}", found);
    }
    eprintln!("===================================");
    eprintln!();
}

fn main() {
    // Only emit link directives if the `phidget-sdk` feature is enabled.
    // Without it the declarations compile but nothing references the library.
    #[cfg(feature = "phidget-sdk")]
    {
        println!("cargo:rerun-if-env-changed=PHIDGET21_LIB_DIR");
        println!("cargo:rerun-if-env-changed=LIBRARY_PATH");

        let lib_dir = match env::var("PHIDGET21_LIB_DIR") {
            Ok(dir) => Some(PathBuf::from(dir)),
            Err(_) => {
                let found = find_phidget21_lib();
                if let Some(ref dir) = found {
                    println!(
                        "cargo:warning=PHIDGET21_LIB_DIR not set, auto-detected: {}",
                        dir.display()
                    );
                }
                found
            }
        };

        match lib_dir {
            Some(dir) if dir.exists() => {
                println!("cargo:rustc-link-search=native={}", dir.display());
            }
            Some(dir) => {
                println!(
                    "cargo:warning=phidget21 lib path does not exist: {}",
                    dir.display()
                );
                println!("cargo:warning=Linker will search LIBRARY_PATH and standard paths");
            }
            None => {
                print_env_diagnostics();
                print_env_warning(
                    "libphidget21 not found",
                    &[
                        "The phidget-sdk feature links the vendor phidget21 library.",
                        "No library was found in the usual install locations.",
                    ],
                    &[
                        "Install libphidget21 from the vendor packages",
                        "Or: export PHIDGET21_LIB_DIR=/path/to/lib",
                    ],
                );
                println!("cargo:warning=Linker will search LIBRARY_PATH and standard paths");
            }
        }

        // The vendor ships a framework on macOS and a plain library elsewhere.
        if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("macos") {
            println!("cargo:rustc-link-search=framework=/Library/Frameworks");
            println!("cargo:rustc-link-lib=framework=Phidget21");
        } else {
            println!("cargo:rustc-link-lib=phidget21");
        }
    }
}
