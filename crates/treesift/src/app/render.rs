//! Rendering filtered mappings as JSON.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};

use crate::domain::model::FilteredMapping;
use crate::infra::config::Config;

/// Options controlling the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub indent: usize,
    /// Escape every character outside printable ASCII as `\uXXXX`.
    pub ensure_ascii: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            ensure_ascii: true,
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            indent: config.output.indent(),
            ensure_ascii: config.output.ensure_ascii(),
        }
    }
}

/// Render the mapping as an indented JSON object, without a trailing newline.
pub fn render_mapping(mapping: &FilteredMapping, options: &RenderOptions) -> Result<String> {
    let indent = " ".repeat(options.indent);
    let pretty = PrettyFormatter::with_indent(indent.as_bytes());
    let mut buffer = Vec::new();

    let serialized = if options.ensure_ascii {
        let mut serializer = Serializer::with_formatter(&mut buffer, AsciiFormatter(pretty));
        mapping.serialize(&mut serializer)
    } else {
        let mut serializer = Serializer::with_formatter(&mut buffer, pretty);
        mapping.serialize(&mut serializer)
    };
    serialized.context("failed to serialize filtered mapping")?;

    String::from_utf8(buffer).context("rendered mapping is not valid UTF-8")
}

/// Destination for the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputSink {
    #[default]
    Stdout,
    File(PathBuf),
}

/// Write the rendered document followed by a newline.
pub fn write_output(rendered: &str, sink: &OutputSink) -> Result<()> {
    match sink {
        OutputSink::Stdout => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{rendered}").context("failed to write to stdout")?;
            handle.flush().context("failed to flush stdout")
        }
        OutputSink::File(path) => write_file(path, rendered),
    }
}

fn write_file(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }
    fs::write(path, format!("{rendered}\n"))
        .with_context(|| format!("failed to write output to {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote filtered mapping");
    Ok(())
}

/// Pretty formatter that writes every character outside printable ASCII as a `\uXXXX` escape.
struct AsciiFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}
