//! Transient client credentials
//!
//! The root password reaches client tools as an option file read from an
//! anonymous pipe (`/dev/fd/N`). Nothing is written to persistent storage,
//! and the descriptor closes when the [`Passfile`] is dropped.

use std::io::{self, PipeReader, Write};
use std::os::fd::AsRawFd;

use nix::fcntl::{fcntl, FcntlArg, FdFlag};

use crate::config::MAX_ROOT_PASSWORD_BYTES;

/// Client option file held open for the duration of one child invocation
#[derive(Debug)]
pub struct Passfile {
    reader: PipeReader,
}

impl Passfile {
    /// Build an option file carrying `password`.
    ///
    /// `None` or an empty password yields an empty option file, so the client
    /// connects without a password. The file is written before any reader
    /// exists, so passwords over [`MAX_ROOT_PASSWORD_BYTES`] are refused.
    pub fn new(password: Option<&str>) -> io::Result<Self> {
        if password.is_some_and(|p| p.len() > MAX_ROOT_PASSWORD_BYTES) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "password too long for the credential pipe",
            ));
        }
        let (reader, mut writer) = io::pipe()?;

        // Children must inherit the read end.
        fcntl(reader.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::empty())).map_err(io::Error::from)?;

        if let Some(password) = password.filter(|p| !p.is_empty()) {
            writer.write_all(Self::render(password).as_bytes())?;
        }
        drop(writer);

        Ok(Self { reader })
    }

    fn render(password: &str) -> String {
        format!("[client]\npassword=\"{}\"\n", password)
    }

    /// `--defaults-extra-file` argument pointing at the descriptor
    pub fn option_arg(&self) -> String {
        format!("--defaults-extra-file=/dev/fd/{}", self.reader.as_raw_fd())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_option_arg_points_at_descriptor() {
        let passfile = Passfile::new(Some("pw")).unwrap();
        let arg = passfile.option_arg();
        assert!(arg.starts_with("--defaults-extra-file=/dev/fd/"));
    }

    #[test]
    fn test_contents() {
        let mut passfile = Passfile::new(Some("s3cret")).unwrap();
        let mut contents = String::new();
        passfile.reader.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "[client]\npassword=\"s3cret\"\n");
    }

    #[test]
    fn test_empty_password_yields_empty_file() {
        for password in [None, Some("")] {
            let mut passfile = Passfile::new(password).unwrap();
            let mut contents = String::new();
            passfile.reader.read_to_string(&mut contents).unwrap();
            assert!(contents.is_empty());
        }
    }

    #[test]
    fn test_oversized_password_refused() {
        let password = "x".repeat(MAX_ROOT_PASSWORD_BYTES + 1);
        let err = Passfile::new(Some(&password)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let password = "x".repeat(MAX_ROOT_PASSWORD_BYTES);
        let mut passfile = Passfile::new(Some(&password)).unwrap();
        let mut contents = String::new();
        passfile.reader.read_to_string(&mut contents).unwrap();
        assert!(contents.contains(&password));
    }
}
