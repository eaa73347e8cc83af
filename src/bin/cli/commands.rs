//! Command implementations for the CLI tool.

use std::io::{self, Write};
use std::path::Path;

use arcfs::detect::detect_mime;
use arcfs::{Archive, Error, FileHint, OpenOptions};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{ArchiveSummary, create_formatter, humanize_bytes};

/// Options shared by every command that opens an archive.
pub struct OpenConfig<'a> {
    pub archive: &'a str,
    pub hint: &'a [String],
    pub mime: Option<&'a str>,
    pub inline_hint: Option<char>,
    pub limit: Option<u64>,
}

impl OpenConfig<'_> {
    fn options(&self) -> OpenOptions {
        let mut options = OpenOptions::new().hint(FileHint::new(self.hint.iter().cloned()));
        if let Some(mime) = self.mime {
            options = options.mime(mime);
        }
        if let Some(marker) = self.inline_hint {
            options = options.inline_hint(marker);
        }
        if let Some(limit) = self.limit {
            options = options.size_limit(limit);
        }
        options
    }
}

fn open_archive(config: &OpenConfig<'_>) -> Result<Archive, ExitCode> {
    Archive::open_with_options(config.archive, config.options()).map_err(|e| report(&e))
}

fn report(error: &Error) -> ExitCode {
    eprintln!("Error: {}", error);
    error_to_exit_code(error)
}

/// List command implementation
pub fn list(config: &OpenConfig<'_>, format: OutputFormat) -> ExitCode {
    let archive = match open_archive(config) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match archive.list() {
        Ok(members) => {
            print!("{}", create_formatter(format).format_list(&members));
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Cat command implementation: writes one member to stdout
pub fn cat(config: &OpenConfig<'_>, member: &str) -> ExitCode {
    let archive = match open_archive(config) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = archive.open_member(member).and_then(|mut stream| {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        let copied = stream.copy_to(&mut lock)?;
        lock.flush()?;
        Ok(copied)
    });

    match result {
        Ok(copied) => {
            log::debug!("wrote {} bytes of {}", copied, member);
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Get command implementation: copies one member to a file
pub fn get(config: &OpenConfig<'_>, member: &str, output: Option<&Path>, quiet: bool) -> ExitCode {
    let archive = match open_archive(config) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let target = match output {
        Some(path) => path.to_path_buf(),
        None => match Path::new(member).file_name() {
            Some(name) => name.into(),
            None => {
                eprintln!("Error: cannot derive an output name from \"{}\"", member);
                return ExitCode::BadArgs;
            }
        },
    };

    match archive
        .open_member(member)
        .and_then(|mut stream| stream.copy_to_path(&target))
    {
        Ok(copied) => {
            if !quiet {
                println!("{} -> {} ({})", member, target.display(), humanize_bytes(copied));
            }
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Find command implementation
pub fn find(config: &OpenConfig<'_>, filename: &str, format: OutputFormat) -> ExitCode {
    let archive = match open_archive(config) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let found = archive.find_file(filename);
    print!(
        "{}",
        create_formatter(format).format_found(filename, found.as_deref())
    );
    if found.is_some() {
        ExitCode::Success
    } else {
        ExitCode::NotFound
    }
}

/// Info command implementation
pub fn info(config: &OpenConfig<'_>, format: OutputFormat) -> ExitCode {
    let archive = match open_archive(config) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let summary = ArchiveSummary {
        path: archive.path().display().to_string(),
        backend: archive.backend_kind().to_string(),
        directio: archive.directio(),
        used_hint: archive.used_hint(),
        members: archive.list().ok().map(|members| members.len()),
    };
    print!("{}", create_formatter(format).format_info(&summary));
    ExitCode::Success
}

/// Type command implementation
pub fn detect_type(path: &str, format: OutputFormat) -> ExitCode {
    match detect_mime(Path::new(path)) {
        Ok(mime) => {
            print!("{}", create_formatter(format).format_type(path, mime));
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}
