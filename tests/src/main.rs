mod generate;
mod verify;

use {
    anyhow::{Context as _, Result, bail, ensure},
    clap::Parser,
    fs_err::{read_to_string, write},
    generate::{random_document, random_invalid_document},
    ldseal::{RenderJob, config::Config, render_file},
    ldseal_sdk::Document,
    rand::{SeedableRng, rngs::StdRng},
    std::{path::Path, process::exit},
    tempfile::TempDir,
    tracing::{debug, error, info},
    tracing_subscriber::EnvFilter,
    verify::{verify_manifest_file, verify_page},
};

/// Renders random documents and checks the sealed output.
#[derive(Debug, Parser)]
struct Args {
    #[clap(long, default_value_t = 30)]
    iterations: u32,
    /// Seed of a previous run to reproduce it.
    #[clap(long)]
    seed: Option<u64>,
}

fn main() {
    if let Err(err) = try_main() {
        error!("{err:?}");
        exit(1);
    }
}

fn write_job(dir: &Path, name: &str, document: &Document) -> Result<RenderJob> {
    let input = dir.join(format!("{name}.json5"));
    write(&input, serde_json::to_string_pretty(document)?)?;
    Ok(RenderJob {
        output: input.with_extension("html"),
        passwords_file: Some(dir.join(format!("{name}.passwords.json"))),
        listing: true,
        input,
    })
}

fn check_valid(rng: &mut StdRng, dir: &Path, iteration: u32, config: &Config) -> Result<()> {
    let generated = random_document(rng)?;
    let job = write_job(dir, &format!("valid{iteration}"), &generated.document)?;
    render_file(config, &job)?;

    let passwords_file = job.passwords_file.as_deref().context("no passwords file")?;
    let passwords = verify_manifest_file(passwords_file, &generated)?;
    let html = read_to_string(&job.output)?;
    verify_page(&html, &generated, &passwords)?;

    // Generated passwords differ between runs, so only pinned documents are byte-stable.
    if generated.solutions.iter().all(|s| s.password.is_some()) {
        render_file(config, &job)?;
        ensure!(
            read_to_string(&job.output)? == html,
            "output of {} is not reproducible",
            job.input.display()
        );
    }
    debug!(
        iteration,
        solutions = generated.solutions.len(),
        notes = generated.notes.len(),
        "valid document ok"
    );
    Ok(())
}

fn check_invalid(rng: &mut StdRng, dir: &Path, iteration: u32, config: &Config) -> Result<()> {
    let document = random_invalid_document(rng)?;
    let job = write_job(dir, &format!("invalid{iteration}"), &document)?;
    let Err(err) = render_file(config, &job) else {
        bail!("invalid document {} was rendered", job.input.display());
    };
    debug!(iteration, "rejected as expected: {err:#}");
    ensure!(!job.output.exists(), "page written for invalid document");
    if let Some(passwords_file) = &job.passwords_file {
        ensure!(!passwords_file.exists(), "manifest written for invalid document");
    }
    Ok(())
}

fn try_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new("info,ldseal=warn,ldseal_sdk=warn")?)
        .init();
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, iterations = args.iterations, "starting");

    let mut rng = StdRng::seed_from_u64(seed);
    let dir = TempDir::new()?;
    let config = Config::default();
    for iteration in 0..args.iterations {
        check_valid(&mut rng, dir.path(), iteration, &config)
            .with_context(|| format!("iteration {iteration} (seed {seed})"))?;
        check_invalid(&mut rng, dir.path(), iteration, &config)
            .with_context(|| format!("iteration {iteration} (seed {seed})"))?;
    }
    info!("all checks passed");
    Ok(())
}
