use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for nesemu")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Library modules whose unit tests can be run on their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Module {
    Cpu,
    Ppu,
    Bus,
    Cartridge,
    Apu,
    Input,
    Emulator,
    Debug,
}

impl Module {
    fn path(self) -> &'static str {
        match self {
            Module::Cpu => "cpu::",
            Module::Ppu => "ppu::",
            Module::Bus => "bus::",
            Module::Cartridge => "cartridge::",
            Module::Apu => "apu::",
            Module::Input => "input::",
            Module::Emulator => "emulator::",
            Module::Debug => "debug::",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        #[arg(long)]
        ignored: bool,
        /// Run only the unit tests of these modules (repeatable)
        #[arg(short, long, value_enum)]
        module: Vec<Module>,
    },
    /// Run the external single-instruction CPU vector suite
    Vectors {
        /// Directory holding 00.json .. ff.json
        dir: String,
    },
    /// Run benchmarks
    Bench,
    /// Run a ROM headlessly
    RomTest {
        /// Path to ROM file
        rom_path: String,
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Save the final frame as a PNG
        #[arg(long)]
        screenshot: bool,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Pre-commit hook (fmt, clippy, test)
    PreCommit,
    /// Install git hooks
    InstallHooks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Check { verbose } => run_check(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            ignored,
            module,
        } => run_test(doc, ignored, &module),
        Commands::Vectors { dir } => run_vectors(&dir),
        Commands::Bench => run_bench(),
        Commands::RomTest {
            rom_path,
            frames,
            screenshot,
            release,
        } => run_rom_test(&rom_path, frames, screenshot, release),
        Commands::PreCommit => run_pre_commit(),
        Commands::InstallHooks => install_hooks(),
    }
}

fn cargo(subcommand: &str) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg(subcommand);
    cmd
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build", || run_build(false), verbose)?;
    run_task("Test", || run_test(false, false, &[]), verbose)?;
    run_task("Doc Test", || run_test(true, false, &[]), verbose)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_check(verbose: bool) -> Result<()> {
    println!("{}", "=== Running Quick Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ Checks passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = cargo("fmt");
    cmd.arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = cargo("clippy");
    cmd.arg("--workspace").arg("--all-targets");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = cargo("build");

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

fn run_test(doc: bool, ignored: bool, modules: &[Module]) -> Result<()> {
    if doc || modules.is_empty() {
        let mut cmd = cargo("test");
        if doc {
            cmd.arg("--doc");
        }
        if ignored {
            cmd.arg("--").arg("--ignored");
        }
        return execute_command(&mut cmd);
    }

    let mut failed = Vec::new();

    for &module in modules {
        let name = format!("{:?}", module);
        println!("{} Running {} tests...", "→".blue(), name.bold());

        let mut cmd = cargo("test");
        cmd.arg("--lib").arg(module.path());
        if ignored {
            cmd.arg("--").arg("--ignored");
        }

        match execute_command(&mut cmd) {
            Ok(_) => println!("{} {} tests passed\n", "✓".green(), name),
            Err(e) => {
                println!("{} {} tests failed\n", "✗".red(), name);
                if modules.len() == 1 {
                    return Err(e);
                }
                failed.push(name);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Module tests failed: {}", failed.join(", "))
    }
}

fn run_vectors(dir: &str) -> Result<()> {
    if !Path::new(dir).is_dir() {
        println!("{} Not a directory: {}", "✗".red().bold(), dir.yellow());
        anyhow::bail!("vector directory not found");
    }

    let mut cmd = cargo("test");
    cmd.arg("--release")
        .arg("--test")
        .arg("cpu_vectors")
        .arg("--")
        .arg("--ignored")
        .arg("--nocapture")
        .env("NESEMU_CPU_VECTORS", dir);

    execute_command(&mut cmd)
}

fn run_bench() -> Result<()> {
    execute_command(&mut cargo("bench"))
}

fn run_rom_test(rom_path: &str, frames: u64, screenshot: bool, release: bool) -> Result<()> {
    println!("{}", "=== ROM Test ===".bold().blue());

    if !Path::new(rom_path).exists() {
        println!(
            "{} ROM file not found: {}",
            "✗".red().bold(),
            rom_path.yellow()
        );
        anyhow::bail!("ROM file not found");
    }

    if !rom_path.to_lowercase().ends_with(".nes") {
        println!("{} File does not have .nes extension", "⚠".yellow().bold());
    }

    println!("{} ROM file: {}", "✓".green(), rom_path.cyan());
    println!("{} Frames: {}", "→".blue(), frames.to_string().bold());
    println!(
        "{} Build mode: {}",
        "→".blue(),
        if release {
            "release".green().bold()
        } else {
            "debug".yellow().bold()
        }
    );
    println!();

    let start = Instant::now();

    let mut cmd = cargo("run");
    cmd.arg("--bin").arg("nesemu");
    if release {
        cmd.arg("--release");
    }
    cmd.arg("--")
        .arg(rom_path)
        .arg("--frames")
        .arg(frames.to_string());
    if screenshot {
        cmd.arg("--screenshot");
    }

    if let Err(e) = execute_command(&mut cmd) {
        println!("\n{} ROM test failed", "✗".red().bold());
        return Err(e);
    }

    let elapsed = start.elapsed();
    println!(
        "\n{} ROM test completed in {}",
        "✓".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_pre_commit() -> Result<()> {
    println!("{}", "=== Pre-commit Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), false)?;
    run_task("Clippy", || run_clippy(false), false)?;
    run_task("Test", || run_test(false, false, &[]), false)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ Pre-commit checks passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn install_hooks() -> Result<()> {
    use std::fs;

    println!("{}", "Installing git hooks...".bold());

    let hook_content = r#"#!/bin/sh
# Auto-generated by cargo x install-hooks
set -e

echo "Running pre-commit checks..."
cargo x pre-commit
"#;

    let hook_path = ".git/hooks/pre-commit";
    fs::write(hook_path, hook_content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(hook_path, perms)?;
    }

    println!("{}", "✓ Git hooks installed".green());
    println!("  Pre-commit hook will run: fmt, clippy, test");

    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(_) => {
            let elapsed = start.elapsed();
            println!(
                "{} {}",
                "✓".green().bold(),
                if verbose {
                    format!("({:.2}s)", elapsed.as_secs_f64())
                } else {
                    String::new()
                }
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
