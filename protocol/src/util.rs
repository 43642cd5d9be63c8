use {
    anyhow::{Context as _, Result, bail},
    fs_err::OpenOptions,
    std::{
        io::{self, Write},
        path::Path,
    },
    tempfile::NamedTempFile,
};

/// Returns a log destination: the specified file (appending) or stderr.
///
/// Stdout is left alone because generated output may be written there.
pub fn log_writer(log_file: Option<&Path>) -> Result<Box<dyn Write + Send + Sync>> {
    if let Some(log_file) = log_file {
        if let Some(dir) = log_file.parent() {
            fs_err::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        Ok(Box::new(file))
    } else {
        Ok(Box::new(io::stderr()))
    }
}

fn stage(path: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs_err::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    file.write_all(contents)?;
    file.flush()?;
    Ok(file)
}

/// Writes several files, in order, so that either all of them are written or none is.
///
/// Each file is staged as a temporary file in its destination directory and then
/// renamed, so readers never see a partial file. All files are staged before the
/// first one is moved into place. If moving one of them fails, the files already
/// moved by this call are removed again.
pub fn write_all_atomically(files: &[(&Path, &[u8])]) -> Result<()> {
    for (index, (path, _)) in files.iter().enumerate() {
        if files.iter().skip(index.saturating_add(1)).any(|(other, _)| other == path) {
            bail!("{} is listed more than once", path.display());
        }
    }
    let staged = files
        .iter()
        .map(|&(path, contents)| Ok((path, stage(path, contents)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut written: Vec<&Path> = Vec::with_capacity(staged.len());
    for (path, file) in staged {
        if let Err(err) = file.persist(path) {
            let err = anyhow::Error::from(err.error)
                .context(format!("failed to write {}", path.display()));
            for done in written {
                fs_err::remove_file(done)
                    .with_context(|| format!("failed to clean up after error: {err:#}"))?;
            }
            return Err(err);
        }
        written.push(path);
    }
    Ok(())
}
