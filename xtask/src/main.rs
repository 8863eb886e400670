//! Release and CI chores for wharf.
//!
//! Usage: cargo xtask <command>

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

const BIN: &str = "wharf";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Release and CI chores for wharf")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the wharf binary
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run the test suites
    Test {
        /// Only the tests under tests/
        #[arg(long)]
        integration: bool,
    },
    /// Package a release tarball under dist/
    Dist {
        /// Target triple (e.g., x86_64-unknown-linux-gnu)
        #[arg(long)]
        target: Option<String>,
    },
    /// Copy the release binary to <prefix>/bin
    Install {
        #[arg(long, default_value = "/usr/local")]
        prefix: String,
    },
    /// Format check, clippy and tests
    Ci,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;
    sh.change_dir(project_root()?);

    match cli.command {
        Commands::Build { release } => build(&sh, release),
        Commands::Test { integration } => test(&sh, integration),
        Commands::Dist { target } => dist(&sh, target.as_deref()),
        Commands::Install { prefix } => install(&sh, &prefix),
        Commands::Ci => ci(&sh),
    }
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    if release {
        cmd!(sh, "cargo build --release --bin {BIN}").run()?;
    } else {
        cmd!(sh, "cargo build --bin {BIN}").run()?;
    }
    println!("✅ Built {}", BIN);
    Ok(())
}

fn test(sh: &Shell, integration: bool) -> Result<()> {
    if integration {
        cmd!(sh, "cargo test -p wharf --test '*'").run()?;
    } else {
        cmd!(sh, "cargo test --workspace").run()?;
    }
    Ok(())
}

fn release_binary(target: Option<&str>) -> Result<PathBuf> {
    let root = project_root()?;
    Ok(match target {
        Some(triple) => root.join(format!("target/{}/release/{}", triple, BIN)),
        None => root.join(format!("target/release/{}", BIN)),
    })
}

fn dist(sh: &Shell, target: Option<&str>) -> Result<()> {
    match target {
        Some(triple) => cmd!(sh, "cargo build --release --bin {BIN} --target {triple}").run()?,
        None => cmd!(sh, "cargo build --release --bin {BIN}").run()?,
    }

    let dist_dir = project_root()?.join("dist");
    sh.create_dir(&dist_dir)?;
    sh.copy_file(release_binary(target)?, dist_dir.join(BIN))?;

    let version = env!("CARGO_PKG_VERSION");
    let archive = match target {
        Some(triple) => format!("{}-{}-{}.tar.gz", BIN, version, triple),
        None => format!("{}-{}.tar.gz", BIN, version),
    };
    let archive_path = dist_dir.join(&archive);
    cmd!(sh, "tar -czf {archive_path} -C dist {BIN}")
        .run()
        .context("create release tarball")?;

    println!("📦 dist/{}", archive);
    Ok(())
}

fn install(sh: &Shell, prefix: &str) -> Result<()> {
    let binary = release_binary(None)?;
    if !binary.exists() {
        cmd!(sh, "cargo build --release --bin {BIN}").run()?;
    }

    let bin_dir = Path::new(prefix).join("bin");
    sh.create_dir(&bin_dir)?;
    let install_path = bin_dir.join(BIN);
    sh.copy_file(&binary, &install_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&install_path, std::fs::Permissions::from_mode(0o755))?;
    }

    println!("✅ Installed {}", install_path.display());
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo fmt --all -- --check").run()?;
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
    test(sh, false)?;
    println!("✅ CI checks passed");
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    match Path::new(env!("CARGO_MANIFEST_DIR")).parent() {
        Some(root) => Ok(root.to_path_buf()),
        None => bail!("xtask must live one level below the workspace root"),
    }
}
