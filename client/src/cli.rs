use {
    anyhow::{Result, anyhow},
    clap::{Parser, Subcommand},
    ldseal_protocol::DEFAULT_PASSWORD_LENGTH,
    std::path::PathBuf,
};

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Config file. Defaults to `ldseal.json5` in the user config directory.
    #[clap(long)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Render a JSON5 document tree to an HTML page.
    Render {
        input: PathBuf,
        /// Defaults to the input path with the `html` extension.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write the unencrypted password manifest to this file.
        #[arg(long)]
        passwords_file: Option<PathBuf>,
        /// Also write a human-readable listing next to the manifest file.
        #[arg(long)]
        listing: bool,
        /// Location of the LectureDoc scripts and stylesheets.
        #[arg(long)]
        ld_path: Option<String>,
    },
    /// Print a new random password.
    GeneratePassword {
        #[arg(short, long, default_value_t = DEFAULT_PASSWORD_LENGTH)]
        length: usize,
    },
    /// Decrypt a sealed block. The password is read from the terminal.
    Decrypt { envelope: String },
}

#[inline]
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| anyhow!("cannot find config dir"))?;
    Ok(config_dir.join("ldseal.json5"))
}
