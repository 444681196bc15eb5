// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::Error;

use std::path::Path;
use std::process::{Command, Stdio};

/// Program and leading arguments of the desktop's default document viewer.
fn launcher() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    }
}

/// Builds the command opening `path`, with `program` replacing the platform
/// launcher when given.
fn command(path: &Path, program: Option<&str>) -> Command {
    let (program, args) = match program {
        Some(program) => (program, &[][..]),
        None => launcher(),
    };
    let mut command = Command::new(program);
    command
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

/// Opens `path` in `program`, or the default viewer, without waiting for it
/// to exit.
pub fn open<P: AsRef<Path>>(path: P, program: Option<&str>) -> Result<(), Error> {
    let path = path.as_ref();
    let name = program.unwrap_or_else(|| launcher().0);
    debug!("opening {} with {}", path.display(), name);
    command(path, program)
        .spawn()
        .map(|_| ())
        .map_err(|source| Error::Viewer {
            program: name.to_string(),
            source,
        })
}
