//! Directory driver
//!
//! Compiles every IDL file directly inside a source directory. Files are
//! processed one at a time in file-name order, so the aggregate output is the
//! same on every platform.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::ast::flatten_qualified_name;
use crate::error::{IdlError, Result};
use crate::{compile, CompileOptions};

/// Where generated code goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// `name.idl` becomes `name.<output_extension>`
    PerFile,
    /// Every file is appended to one destination file
    Aggregate { file_name: String },
}

/// Driver options
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Extension identifying IDL sources, without the dot
    pub source_extension: String,
    /// Extension of per-file outputs, without the dot
    pub output_extension: String,
    pub mode: OutputMode,
    pub compile: CompileOptions,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            source_extension: "idl".to_string(),
            output_extension: "cpp".to_string(),
            mode: OutputMode::PerFile,
            compile: CompileOptions::default(),
        }
    }
}

impl DriverOptions {
    /// Append everything into `file_name` under the destination directory
    pub fn aggregate(mut self, file_name: impl Into<String>) -> Self {
        self.mode = OutputMode::Aggregate {
            file_name: file_name.into(),
        };
        self
    }

    pub fn with_source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = extension.into();
        self
    }

    pub fn with_output_extension(mut self, extension: impl Into<String>) -> Self {
        self.output_extension = extension.into();
        self
    }

    pub fn with_compile_options(mut self, compile: CompileOptions) -> Self {
        self.compile = compile;
        self
    }
}

/// Summary of a directory run
#[derive(Debug, Clone, Default)]
pub struct DriverReport {
    /// Sources that produced code
    pub compiled: Vec<PathBuf>,
    /// Sources that declared nothing
    pub skipped: Vec<PathBuf>,
    /// Files written under the destination directory
    pub written: Vec<PathBuf>,
}

/// Destination of a single output stream
enum Sink {
    PerFile,
    Aggregate { path: PathBuf, file: File },
}

/// Compile every IDL file in `source_dir` into `dest_dir`.
///
/// A malformed file stops the run with an error naming that file. Files that
/// declare nothing are logged and skipped.
pub fn compile_directory(source_dir: &Path, dest_dir: &Path, options: &DriverOptions) -> Result<DriverReport> {
    fs::create_dir_all(dest_dir).map_err(|e| IdlError::io(dest_dir, e))?;
    let sources = list_sources(source_dir, &options.source_extension)?;
    debug!(count = sources.len(), dir = %source_dir.display(), "found IDL sources");

    let mut sink = match &options.mode {
        OutputMode::PerFile => Sink::PerFile,
        OutputMode::Aggregate { file_name } => {
            let path = dest_dir.join(file_name);
            let file = File::create(&path).map_err(|e| IdlError::io(&path, e))?;
            Sink::Aggregate { path, file }
        }
    };

    let mut report = DriverReport::default();
    // Flattened name -> declaring file, across the aggregate compilation unit
    let mut declared: HashMap<String, PathBuf> = HashMap::new();
    let mut declared_delegates: HashMap<String, PathBuf> = HashMap::new();

    for source in sources {
        let text = fs::read_to_string(&source).map_err(|e| IdlError::io(&source, e))?;
        let result = compile(&text, &options.compile).map_err(|e| e.in_file(&source))?;

        if result.is_empty() {
            warn!("{} declares no interface or delegate, skipping", source.display());
            report.skipped.push(source);
            continue;
        }

        match &mut sink {
            Sink::PerFile => {
                let file_name = source.file_name().unwrap_or_default();
                let destination = dest_dir.join(file_name).with_extension(&options.output_extension);
                fs::write(&destination, &result.code).map_err(|e| IdlError::io(&destination, e))?;
                info!("Done with file {}", destination.display());
                report.written.push(destination);
            }
            Sink::Aggregate { path, file } => {
                for (flat, qualified) in result.flattened_names.iter().zip(&result.interfaces) {
                    if declared.insert(flat.clone(), source.clone()).is_some() {
                        return Err(IdlError::duplicate(qualified).in_file(&source));
                    }
                }
                for qualified in &result.delegates {
                    let flat = flatten_qualified_name(qualified);
                    if declared_delegates.insert(flat, source.clone()).is_some() {
                        return Err(IdlError::duplicate_delegate(qualified).in_file(&source));
                    }
                }
                file.write_all(result.code.as_bytes())
                    .map_err(|e| IdlError::io(path.as_path(), e))?;
                info!("Appended {} to {}", source.display(), path.display());
            }
        }
        report.compiled.push(source);
    }

    if let Sink::Aggregate { path, mut file } = sink {
        file.flush().map_err(|e| IdlError::io(&path, e))?;
        report.written.push(path);
    }

    Ok(report)
}

/// Regular files directly inside `dir` with the given extension, sorted by name
fn list_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| IdlError::io(dir, e))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IdlError::io(dir, e))?;
        let path = entry.path();
        if path.extension().and_then(OsStr::to_str) != Some(extension) {
            continue;
        }
        // Follows symlinks, so a linked source counts as a file
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => sources.push(path),
            Ok(_) => debug!("{} is not a regular file, skipping", path.display()),
            Err(e) => warn!("cannot stat {}: {}, skipping", path.display(), e),
        }
    }

    sources.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(sources)
}
