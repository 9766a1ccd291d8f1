use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::input::InputError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutSource {
    File(PathBuf),
    Stdin,
}

impl LayoutSource {
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == "-" {
            LayoutSource::Stdin
        } else {
            LayoutSource::File(arg.to_path_buf())
        }
    }
}

pub fn read_layout_text(source: &LayoutSource) -> Result<String, InputError> {
    match source {
        LayoutSource::File(path) => {
            if !path.exists() {
                return Err(InputError::MissingInput(format!(
                    "layout file {}",
                    path.display()
                )));
            }
            Ok(std::fs::read_to_string(path)?)
        }
        LayoutSource::Stdin => {
            eprintln!(
                "Paste the plate layout (rows on lines, columns separated by tabs); finish with an empty line or END:"
            );
            let stdin = std::io::stdin();
            read_pasted_layout(stdin.lock())
        }
    }
}

/// Collects pasted lines up to an empty line, a line reading `END`, or end of input.
pub fn read_pasted_layout<R: BufRead>(mut reader: R) -> Result<String, InputError> {
    let mut buf = String::new();
    let mut lines = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() || line.trim() == "END" {
            break;
        }
        lines.push(line.to_string());
    }
    Ok(lines.join("\n"))
}
