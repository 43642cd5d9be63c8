use {
    crate::generate::Generated,
    anyhow::{Context as _, Result, bail, ensure},
    fs_err::read_to_string,
    ldseal_protocol::{MANIFEST_META_NAME, ManifestRecord, Password},
    ldseal_sdk::crypto,
    std::path::Path,
};

/// Envelopes of all visible blocks with the specified class, in document order.
fn sealed_blocks<'a>(html: &'a str, class: &str) -> Vec<&'a str> {
    let prefix = format!("class=\"{class} ld-encrypted\">");
    html.split(prefix.as_str())
        .skip(1)
        .filter_map(|rest| rest.split('<').next())
        .collect()
}

fn embedded_manifest(html: &str) -> Option<&str> {
    let prefix = format!("<meta name=\"{MANIFEST_META_NAME}\" content=\"");
    html.split(prefix.as_str()).nth(1)?.split('"').next()
}

fn open_utf8(password: &str, envelope: &str) -> Result<String> {
    let plaintext = crypto::open_str(&password.parse()?, envelope)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Reads the external manifest and checks it against the generated document.
///
/// Returns the solution passwords in document order.
pub fn verify_manifest_file(path: &Path, generated: &Generated) -> Result<Vec<String>> {
    let text = read_to_string(path)?;
    let records: Vec<ManifestRecord> =
        serde_json::from_str(&text).with_context(|| format!("invalid {}", path.display()))?;

    if generated.solutions.is_empty() {
        ensure!(text == "[]", "expected empty manifest, got {text}");
        return Ok(Vec::new());
    }
    let mut records = records.into_iter();
    if let Some(master_password) = &generated.master_password {
        ensure!(
            records.next() == Some(ManifestRecord::MasterPassword(master_password.clone())),
            "master password record mismatch"
        );
    }
    let Some(ManifestRecord::Passwords(passwords)) = records.next() else {
        bail!("missing passwords record");
    };
    ensure!(records.next().is_none(), "unexpected trailing records");
    ensure!(
        passwords.len() == generated.solutions.len(),
        "expected {} passwords, got {}",
        generated.solutions.len(),
        passwords.len()
    );
    for ((label, password), expected) in passwords.iter().zip(&generated.solutions) {
        ensure!(*label == expected.label, "label mismatch: {label:?} != {:?}", expected.label);
        if let Some(expected_password) = &expected.password {
            ensure!(password == expected_password, "password mismatch for {label:?}");
        }
        password
            .parse::<Password>()
            .with_context(|| format!("invalid password for {label:?}"))?;
    }

    let listing = read_to_string(path.with_extension("md"))?;
    let master_lines = usize::from(generated.master_password.is_some());
    ensure!(
        listing.lines().count() == passwords.len() + master_lines,
        "unexpected listing:\n{listing}"
    );
    Ok(passwords.into_iter().map(|(_, password)| password).collect())
}

pub fn verify_page(html: &str, generated: &Generated, passwords: &[String]) -> Result<()> {
    ensure!(
        !html.contains("\"master-password\""),
        "master password meta leaked into the page"
    );

    let solutions = sealed_blocks(html, "ld-exercise-solution");
    ensure!(
        solutions.len() == generated.solutions.len(),
        "expected {} sealed solutions, found {}",
        generated.solutions.len(),
        solutions.len()
    );
    for ((envelope, password), expected) in solutions.iter().zip(passwords).zip(&generated.solutions)
    {
        let plaintext = open_utf8(password, envelope)
            .with_context(|| format!("cannot open solution {:?}", expected.label))?;
        ensure!(
            plaintext == expected.plaintext,
            "solution {:?} mismatch:\n{plaintext}\n!=\n{}",
            expected.label,
            expected.plaintext
        );
    }

    let notes = sealed_blocks(html, "ld-presenter-note");
    ensure!(
        notes.len() == generated.notes.len(),
        "expected {} sealed notes, found {}",
        generated.notes.len(),
        notes.len()
    );
    let embedded = embedded_manifest(html);
    let Some(master_password) = &generated.master_password else {
        ensure!(embedded.is_none(), "manifest embedded without master password");
        return Ok(());
    };
    for (envelope, expected) in notes.iter().zip(&generated.notes) {
        ensure!(
            open_utf8(master_password, envelope)? == *expected,
            "presenter note mismatch"
        );
    }

    match embedded {
        Some(envelope) => {
            ensure!(!passwords.is_empty(), "manifest embedded without solutions");
            let json = open_utf8(master_password, envelope)?;
            let records: Vec<ManifestRecord> = serde_json::from_str(&json)?;
            ensure!(
                records.len() == 2,
                "embedded manifest has {} records",
                records.len()
            );
        }
        None => ensure!(passwords.is_empty(), "embedded manifest is missing"),
    }
    Ok(())
}
