// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: a path to an external tool
fn tool_arg(name: &'static str, long: &'static str, tool: &'static str) -> Arg {
    Arg::new(name)
        .long(long)
        .value_name("PATH")
        .help(format!("Path to {} (default: looked up on PATH)", tool))
}

fn build_cli() -> Command {
    Command::new("dylib-relocate")
        .version(env!("CARGO_PKG_VERSION"))
        .author("dylib-relocate Contributors")
        .about("Copy dylibs and their dependencies under a prefix into a relocatable @rpath bundle")
        .arg(
            Arg::new("prefix")
                .value_name("PREFIX")
                .required(true)
                .help("Dependencies whose real path starts with this prefix are bundled"),
        )
        .arg(
            Arg::new("libraries")
                .value_name("LIBRARIES")
                .required(true)
                .num_args(1..)
                .help("Libraries to relocate"),
        )
        .arg(
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Output directory (default: macos/lib one level above the executable's directory)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file"),
        )
        .arg(tool_arg("otool", "otool", "otool"))
        .arg(tool_arg(
            "install_name_tool",
            "install-name-tool",
            "install_name_tool",
        ))
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show debug output"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("dylib-relocate.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
