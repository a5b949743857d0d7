//! Build automation tasks for simview
//!
//! Usage:
//!   cargo xtask build-web         # Build WASM and assemble dist/web
//!   cargo xtask package           # Zip dist/web for upload
//!   cargo xtask package-native    # Release binary plus sample config

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;

const BINARY: &str = "simview";
const MQ_JS_BUNDLE: &str = "https://raw.githubusercontent.com/not-fl3/macroquad/v0.4.14/js/mq_js_bundle.js";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for simview")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build WASM and assemble dist/web (index.html, JS bundle, wasm)
    BuildWeb {
        /// Mark as dev build (adds DEV to the page title)
        #[arg(long)]
        dev: bool,
    },
    /// Build the web version and zip it into dist/
    Package,
    /// Release binary for the host platform with a sample viewer.ron
    PackageNative,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildWeb { dev } => build_web(dev),
        Commands::Package => package(),
        Commands::PackageNative => package_native(),
    }
}

/// Get the project root directory
fn project_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask must live one level below the workspace root")
}

/// Run a command and check for success
fn run_cmd(cmd: &mut Command) -> Result<()> {
    let status = cmd.status().context("Failed to execute command")?;
    if !status.success() {
        anyhow::bail!("Command failed with status: {}", status);
    }
    Ok(())
}

/// Download a file from URL to destination
fn download_file(url: &str, dest: &Path) -> Result<()> {
    println!("Downloading {}...", url);
    run_cmd(Command::new("curl").args(["-L", "-o"]).arg(dest).arg(url))
}

/// Empty `dir`, creating it if needed
fn fresh_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).with_context(|| format!("removing {}", dir.display()))?;
    }
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(())
}

fn build_web(dev: bool) -> Result<()> {
    let root = project_root()?;
    let dist = root.join("dist/web");

    println!("Building WASM...");
    run_cmd(
        Command::new("cargo")
            .current_dir(&root)
            .args(["build", "--release", "--target", "wasm32-unknown-unknown"]),
    )?;

    // The JS bundle is kept across builds so offline rebuilds work
    let cached_bundle = root.join("target/mq_js_bundle.js");
    if !cached_bundle.exists() {
        download_file(MQ_JS_BUNDLE, &cached_bundle)?;
    }

    fresh_dir(&dist)?;
    println!("Copying files to dist/web...");
    let wasm = format!("{}.wasm", BINARY);
    std::fs::copy(root.join("target/wasm32-unknown-unknown/release").join(&wasm), dist.join(&wasm))
        .context("copying wasm binary")?;
    std::fs::copy(&cached_bundle, dist.join("mq_js_bundle.js")).context("copying JS bundle")?;

    let index = std::fs::read_to_string(root.join("web/index.html")).context("reading web/index.html")?;
    let index = if dev {
        println!("Applying DEV build modifications...");
        index.replace("<title>simview", "<title>[DEV] simview")
    } else {
        index
    };
    std::fs::write(dist.join("index.html"), index)?;

    println!("Web build complete: dist/web/");
    Ok(())
}

fn package() -> Result<()> {
    build_web(false)?;

    let root = project_root()?;
    let dist = root.join("dist");
    let zip_name = format!("{}-web.zip", BINARY);
    let zip_path = dist.join(&zip_name);
    if zip_path.exists() {
        std::fs::remove_file(&zip_path)?;
    }

    println!("Creating zip...");
    run_cmd(
        Command::new("zip")
            .current_dir(dist.join("web"))
            .args(["-r", &format!("../{}", zip_name), "."]),
    )?;

    println!("Package ready: dist/{}", zip_name);
    Ok(())
}

fn package_native() -> Result<()> {
    let root = project_root()?;
    let platform = if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "macos"
    } else {
        "linux"
    };
    let dist = root.join("dist/native").join(platform);

    println!("Building native release for {}...", platform);
    run_cmd(Command::new("cargo").current_dir(&root).args(["build", "--release"]))?;
    fresh_dir(&dist)?;

    let binary = if platform == "windows" { format!("{}.exe", BINARY) } else { BINARY.to_string() };
    std::fs::copy(root.join("target/release").join(&binary), dist.join(&binary)).context("copying binary")?;

    let sample = root.join("web/viewer.sample.ron");
    if sample.exists() {
        std::fs::copy(&sample, dist.join("viewer.ron"))?;
    }

    println!("Native build complete: dist/native/{}/", platform);
    Ok(())
}
