// Input and output sinks shared by all commands. `-` means stdin/stdout.

use crate::error::TacosError;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;

pub const STDIO: &str = "-";

/// Read the whole input. Refuses to block on an interactive terminal.
pub fn read_input(path: &str) -> Result<String, TacosError> {
    if path == STDIO {
        let mut stdin = io::stdin();
        if stdin.is_terminal() {
            return Err(TacosError::InteractiveStdin);
        }
        let mut buf = String::new();
        stdin.read_to_string(&mut buf).map_err(|source| TacosError::Io {
            path: "<stdin>".into(),
            source,
        })?;
        return Ok(buf);
    }
    fs::read_to_string(Path::new(path)).map_err(|source| TacosError::Io {
        path: path.to_string(),
        source,
    })
}

/// Write `text` followed by a newline unless it already ends with one.
pub fn write_output(path: &str, text: &str) -> Result<(), TacosError> {
    let mut data = text.to_string();
    if !data.ends_with('\n') {
        data.push('\n');
    }
    if path == STDIO {
        let mut out = io::stdout().lock();
        return out
            .write_all(data.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|source| TacosError::Io {
                path: "<stdout>".into(),
                source,
            });
    }
    fs::write(path, data).map_err(|source| TacosError::Io {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_output_gets_trailing_newline_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let path = path.to_str().unwrap();

        write_output(path, "{}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{}\n");

        write_output(path, "{}\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{}\n");
        assert_eq!(read_input(path).unwrap(), "{}\n");
    }

    #[test]
    fn missing_input_is_io_error() {
        let err = read_input("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TacosError::Io { .. }));
    }
}
