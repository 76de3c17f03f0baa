//! File-to-file conversion.
//!
//! A conversion resolves both formats from the paths first, so an unsupported
//! extension fails before anything is read. The output is encoded completely
//! in memory, written to a temporary file next to the destination and renamed
//! into place, so a failed conversion never leaves a truncated output behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::value::Value;

/// Step of a running conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertPhase {
    Reading,
    Decoding,
    Encoding,
    Writing,
    Complete,
}

impl ConvertPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ConvertPhase::Reading => "reading",
            ConvertPhase::Decoding => "decoding",
            ConvertPhase::Encoding => "encoding",
            ConvertPhase::Writing => "writing",
            ConvertPhase::Complete => "complete",
        }
    }
}

/// Progress notification passed to a [`ConvertProgressCallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertProgress {
    pub phase: ConvertPhase,
    pub current: usize,
    pub total: usize,
    pub message: Option<String>,
}

impl ConvertProgress {
    pub fn new(phase: ConvertPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            message: None,
        }
    }

    pub fn with_message(
        phase: ConvertPhase,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            message: Some(message.into()),
        }
    }
}

/// Receives one [`ConvertProgress`] per phase.
pub type ConvertProgressCallback<'a> = &'a dyn Fn(&ConvertProgress);

const STEPS: usize = 4;

/// Summary of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub input_format: Format,
    pub output_format: Format,
    pub bytes_read: usize,
    pub bytes_written: usize,
}

/// A conversion whose formats have been resolved but which has not run yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    input: PathBuf,
    output: PathBuf,
    input_format: Format,
    output_format: Format,
}

impl Conversion {
    /// Resolve the formats of both paths. Touches no files.
    ///
    /// # Errors
    /// Returns [`ConvertError::UnsupportedFormat`] if either extension is not
    /// supported. The output path is checked first.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<Self> {
        let (input, output) = (input.as_ref(), output.as_ref());
        let output_format = Format::from_path(output)?;
        let input_format = Format::from_path(input)?;
        Ok(Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            input_format,
            output_format,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn input_format(&self) -> Format {
        self.input_format
    }

    pub fn output_format(&self) -> Format {
        self.output_format
    }

    /// Run the conversion.
    ///
    /// # Errors
    /// Returns the first failing step's error; see [`ConvertError`].
    pub fn run(&self) -> Result<ConversionReport> {
        self.run_with_progress(&|_| {})
    }

    /// Run the conversion, reporting each phase to `progress`.
    ///
    /// # Errors
    /// Returns the first failing step's error; see [`ConvertError`].
    pub fn run_with_progress(&self, progress: ConvertProgressCallback) -> Result<ConversionReport> {
        tracing::info!(
            "Converting {}→{}: {} → {}",
            self.input_format,
            self.output_format,
            self.input.display(),
            self.output.display()
        );

        progress(&ConvertProgress::with_message(
            ConvertPhase::Reading,
            1,
            STEPS,
            format!("Reading {}...", self.input.display()),
        ));
        let text = read_input(&self.input, self.input_format)?;
        let bytes_read = text.len();

        progress(&ConvertProgress::with_message(
            ConvertPhase::Decoding,
            2,
            STEPS,
            format!("Parsing {bytes_read} bytes of {}...", self.input_format),
        ));
        let value = self.input_format.decode(&text)?;
        tracing::debug!(kind = value.type_name(), "decoded input");

        progress(&ConvertProgress::with_message(
            ConvertPhase::Encoding,
            3,
            STEPS,
            format!("Encoding as {}...", self.output_format),
        ));
        let encoded = self.output_format.encode(&value)?;

        progress(&ConvertProgress::with_message(
            ConvertPhase::Writing,
            4,
            STEPS,
            format!("Writing {}...", self.output.display()),
        ));
        write_output(&self.output, encoded.as_bytes())?;

        progress(&ConvertProgress::new(ConvertPhase::Complete, STEPS, STEPS));
        tracing::info!(bytes_read, bytes_written = encoded.len(), "conversion complete");

        Ok(ConversionReport {
            input_format: self.input_format,
            output_format: self.output_format,
            bytes_read,
            bytes_written: encoded.len(),
        })
    }
}

/// Convert `input` into `output`, picking both formats by extension.
///
/// # Errors
/// See [`Conversion::run`].
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ConversionReport> {
    Conversion::new(input, output)?.run()
}

/// [`convert`] with a progress callback.
///
/// # Errors
/// See [`Conversion::run`].
pub fn convert_with_progress(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    progress: ConvertProgressCallback,
) -> Result<ConversionReport> {
    Conversion::new(input, output)?.run_with_progress(progress)
}

/// Read and decode one file, picking the format by extension.
///
/// # Errors
/// Returns [`ConvertError::UnsupportedFormat`], [`ConvertError::InputNotFound`],
/// [`ConvertError::InputUnreadable`] or [`ConvertError::Decode`].
pub fn load_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let text = read_input(path, format)?;
    format.decode(&text)
}

/// Encode `value` and write it to `path`, picking the format by extension.
///
/// # Errors
/// Returns [`ConvertError::UnsupportedFormat`], [`ConvertError::Encode`] or
/// [`ConvertError::OutputWrite`].
pub fn save_file(path: impl AsRef<Path>, value: &Value) -> Result<()> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let encoded = format.encode(value)?;
    write_output(path, encoded.as_bytes())
}

fn read_input(path: &Path, format: Format) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConvertError::InputNotFound {
                path: path.to_path_buf(),
                source,
            }
        } else {
            ConvertError::InputUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    String::from_utf8(bytes).map_err(|err| {
        ConvertError::decode(format, format!("input is not valid UTF-8: {err}"))
    })
}

fn write_output(path: &Path, contents: &[u8]) -> Result<()> {
    write_atomically(path, contents).map_err(|source| ConvertError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write to a temporary sibling of `path`, then rename it over `path`.
fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".fmtconv-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Regular file mode; the process umask still applies.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    let mut file = builder.tempfile_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
