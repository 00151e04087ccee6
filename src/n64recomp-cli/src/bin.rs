// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use n64recomp::addresses::Vram;
use n64recomp::config::RecompConfigBuilder;
use n64recomp::context::ContextBuilder;

mod cli_error;
mod elf_loader;
mod policy_tables;
mod utils;

use cli_error::CliError;

/// n64recomp-cli: recompiles a MIPS III (N64) ELF into portable C sources.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the statically-linked, big-endian ELF32 input.
    input_elf: PathBuf,
    /// Entrypoint vram, as a C-style integer literal (decimal, 0x.., 0..).
    entrypoint: String,
    /// Directory the generated .c/.h sources are written into.
    output_dir: PathBuf,
}

fn parse_entrypoint(text: &str) -> Result<Vram, CliError> {
    let (digits, radix) = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(oct) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
        (oct, 8)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    u32::from_str_radix(digits, radix)
        .map(Vram::new)
        .map_err(|_| CliError::BadEntrypoint { text: text.to_string() })
}

fn main() -> ExitCode {
    // Mirrors the original tool's `argc != 3` check: any unparseable
    // argument list (including wrong arity) just prints usage and exits 0,
    // it is not treated as a fatal error.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            print!("{err}");
            return ExitCode::SUCCESS;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    println!("input path: {:?}", args.input_elf);
    let entrypoint = parse_entrypoint(&args.entrypoint)?;

    print!("Reading elf");
    let start = utils::get_time_now();
    let binary_data = fs::read(&args.input_elf).map_err(|source| CliError::Io { path: args.input_elf.clone(), source })?;
    let loaded = elf_loader::load(&args.input_elf, &binary_data)?;
    let end = utils::get_time_now();
    println!(": {:?}", end - start);

    print!("context");
    let start = utils::get_time_now();
    let policy = policy_tables::build();
    let config = RecompConfigBuilder::new().with_endian(loaded.endian).with_policy(policy.clone()).build();

    let context = ContextBuilder::new(entrypoint, loaded.endian, policy)
        .with_sections(loaded.sections)
        .with_symbols(loaded.symbols)
        .build()?;
    let end = utils::get_time_now();
    println!(": {:?}", end - start);

    println!("Function count: {}", context.functions().len());

    fs::create_dir_all(&args.output_dir).map_err(|source| CliError::Io { path: args.output_dir.clone(), source })?;

    print!("recompile");
    let start = utils::get_time_now();
    for index in context.emittable_indices() {
        let record = context.function(index).expect("emittable_indices yields valid indices");
        let source = n64recomp::recompile_function(&context, &config, index)
            .map_err(|source| CliError::Emit { function_name: record.name().to_string(), source })?;

        let out_path = args.output_dir.join(format!("{}.c", record.name()));
        fs::write(&out_path, source).map_err(|source| CliError::Io { path: out_path, source })?;
    }
    let end = utils::get_time_now();
    println!(": {:?}", end - start);

    write_linkage(&args.output_dir, &context, entrypoint, &args.input_elf)?;

    Ok(())
}

fn write_linkage(output_dir: &Path, context: &n64recomp::Context, entrypoint: Vram, elf_path: &Path) -> Result<(), CliError> {
    let header_path = output_dir.join("funcs.h");
    fs::write(&header_path, n64recomp::emit_header(context)).map_err(|source| CliError::Io { path: header_path, source })?;

    let lookup_path = output_dir.join("lookup.c");
    let lookup = n64recomp::emit_lookup_table(context, entrypoint, elf_path);
    fs::write(&lookup_path, lookup).map_err(|source| CliError::Io { path: lookup_path, source })?;

    Ok(())
}
