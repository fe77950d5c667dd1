// util.rs

use std::io::{self, Write};

/// Writes one command per line, optionally numbered from 1. A closed pipe
/// on the other end (`cli-stash list | head`) is not an error.
pub fn write_commands<W: Write>(mut out: W, commands: &[String], numbered: bool) -> io::Result<()> {
    let result = commands.iter().enumerate().try_for_each(|(i, command)| {
        if numbered {
            writeln!(out, "{}. {}", i + 1, command)
        } else {
            writeln!(out, "{command}")
        }
    });
    match result.and_then(|()| out.flush()) {
        Err(ref e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbered_output() {
        let mut out = Vec::new();
        write_commands(&mut out, &["ls".into(), "pwd".into()], true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1. ls\n2. pwd\n");
    }

    #[test]
    fn broken_pipe_is_ignored() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        assert!(write_commands(Closed, &["ls".into()], false).is_ok());
    }
}
