pub mod cli;
pub mod config;

use {
    anyhow::{Context as _, Result, bail},
    cli::{Cli, Command},
    config::Config,
    ldseal_protocol::{
        Password,
        util::{log_writer, write_all_atomically},
    },
    ldseal_sdk::{Document, crypto, document::MASTER_PASSWORD_META, render_document},
    std::{
        io::{self, Write},
        path::{Path, PathBuf},
        sync::Mutex,
    },
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, prelude::*},
};

/// Output files of one `render` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub passwords_file: Option<PathBuf>,
    pub listing: bool,
}

#[inline]
pub fn run(cli: Cli, mut config: Config) -> Result<()> {
    match cli.command {
        Command::Render {
            input,
            output,
            passwords_file,
            listing,
            ld_path,
        } => {
            if let Some(ld_path) = ld_path {
                config.ld_path = ld_path;
            }
            let job = RenderJob {
                output: output.unwrap_or_else(|| input.with_extension("html")),
                passwords_file: passwords_file.or_else(|| config.passwords_file.clone()),
                listing: listing || config.passwords_listing,
                input,
            };
            render_file(&config, &job)?;
        }
        Command::GeneratePassword { length } => {
            let password = Password::generate(length)?;
            writeln!(io::stdout().lock(), "{}", password.as_unmasked_str())?;
        }
        Command::Decrypt { envelope } => {
            let password: Password = rpassword::prompt_password("Password: ")?.parse()?;
            let plaintext = crypto::open_str(&password, envelope.trim())?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&plaintext)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Renders `job.input` and writes the page and, if requested, the password manifest.
///
/// Either all output files are written or none of them. The manifest is moved
/// into place before the page, so a page is never left without its passwords.
#[inline]
pub fn render_file(config: &Config, job: &RenderJob) -> Result<()> {
    if job.listing && job.passwords_file.is_none() {
        bail!("password listing requires a passwords file");
    }
    let text = fs_err::read_to_string(&job.input)?;
    let mut document: Document = json5::from_str(&text)
        .with_context(|| format!("failed to parse {}", job.input.display()))?;
    if let Some(master_password) = &config.master_password {
        document
            .meta
            .entry(MASTER_PASSWORD_META.to_owned())
            .or_insert_with(|| master_password.as_unmasked_str().to_owned());
    }

    let rendered = render_document(&document, &config.render_settings())
        .with_context(|| format!("failed to render {}", job.input.display()))?;
    let mut files = match &job.passwords_file {
        Some(passwords_file) => rendered
            .manifest
            .external_files(passwords_file, job.listing)?,
        None => Vec::new(),
    };
    files.push((job.output.clone(), rendered.html));
    let files: Vec<(&Path, &[u8])> = files
        .iter()
        .map(|(path, contents)| (path.as_path(), contents.as_bytes()))
        .collect();
    write_all_atomically(&files)?;

    info!(
        input = %job.input.display(),
        output = %job.output.display(),
        solutions = rendered.manifest.len(),
        "rendered document"
    );
    if let Some(passwords_file) = &job.passwords_file {
        info!(path = %passwords_file.display(), listing = job.listing, "wrote password manifest");
    }
    Ok(())
}

#[inline]
pub fn setup_logger(log_file: Option<&Path>, log_filter: &str) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_ansi(log_file.is_none())
        .with_writer(Mutex::new(log_writer(log_file)?));
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(EnvFilter::try_new(log_filter)?)
        .init();
    Ok(())
}
