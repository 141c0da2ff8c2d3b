//! Chakra IDL Compiler CLI
//!
//! Run with: cargo run --bin chakra-idlc -- Source/Scripting/idl Source/Scripting/ScriptingGlue --aggregate

use std::path::PathBuf;

use chakra_idl::{compile_directory, CompileOptions, DriverOptions};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "chakra-idlc")]
#[command(about = "Generate ChakraCore binding glue from IDL files")]
struct Args {
    /// Directory containing the IDL sources
    source_dir: PathBuf,

    /// Directory receiving the generated code (created if missing)
    dest_dir: PathBuf,

    /// Append every file into a single output instead of one output per source
    #[arg(short, long)]
    aggregate: bool,

    /// File name of the aggregate output
    #[arg(long, default_value = "ScriptingGlue.cpp")]
    aggregate_name: String,

    /// Extension of IDL sources
    #[arg(long, default_value = "idl")]
    source_ext: String,

    /// Extension of per-file outputs
    #[arg(long, default_value = "cpp")]
    output_ext: String,

    /// Namespace of the native binding helpers
    #[arg(long, default_value = "Zmey::Chakra::Binding")]
    binding_namespace: String,

    /// Log every interface and delegate
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn driver_options(&self) -> DriverOptions {
        let options = DriverOptions::default()
            .with_source_extension(&self.source_ext)
            .with_output_extension(&self.output_ext)
            .with_compile_options(CompileOptions::default().with_binding_namespace(&self.binding_namespace));

        if self.aggregate {
            options.aggregate(&self.aggregate_name)
        } else {
            options
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let report = match compile_directory(&args.source_dir, &args.dest_dir, &args.driver_options()) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Compiled {} file(s), skipped {}, wrote {}",
        report.compiled.len(),
        report.skipped.len(),
        report.written.len()
    );
    Ok(())
}
