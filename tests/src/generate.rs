use {
    anyhow::Result,
    ldseal_protocol::Password,
    ldseal_sdk::{Document, Node, crypto, document::MASTER_PASSWORD_META},
    rand::{
        Rng,
        distr::{Alphanumeric, SampleString},
        rngs::StdRng,
    },
    std::ops::RangeInclusive,
};

pub struct ExpectedSolution {
    pub label: String,
    /// `None` if the password is generated during rendering.
    pub password: Option<String>,
    pub plaintext: String,
}

/// Random document together with what its rendering must contain.
pub struct Generated {
    pub document: Document,
    pub master_password: Option<String>,
    pub solutions: Vec<ExpectedSolution>,
    /// Plaintext of presenter notes that are not inside a solution.
    pub notes: Vec<String>,
}

pub fn random_word(rng: &mut StdRng, len: RangeInclusive<usize>) -> String {
    let len = rng.random_range(len);
    Alphanumeric.sample_string(rng, len)
}

fn random_paragraph(rng: &mut StdRng) -> Node {
    Node::Html {
        html: format!("<p>{}</p>", random_word(rng, 1..=30)),
    }
}

fn sealed_note(master_password: &str, text: &str) -> Result<String> {
    let envelope = crypto::seal(&master_password.parse()?, text.as_bytes())?;
    Ok(format!(
        "<aside class=\"ld-presenter-note ld-encrypted\">{envelope}</aside>"
    ))
}

fn random_solution(
    rng: &mut StdRng,
    label: String,
    master_password: Option<&str>,
    solutions: &mut Vec<ExpectedSolution>,
) -> Result<Node> {
    let password = rng
        .random_bool(0.5)
        .then(|| random_word(rng, 3..=10));
    let mut plaintext = String::new();
    let mut children = Vec::new();
    for _ in 0..rng.random_range(0..=4) {
        match rng.random_range(0..4) {
            0 => {
                let word = random_word(rng, 1..=20);
                plaintext.push_str(&word);
                children.push(Node::Text { text: word });
            }
            1 => {
                plaintext.push_str("x &lt; y &amp;&amp; y &gt; z");
                children.push(Node::Text {
                    text: "x < y && y > z".into(),
                });
            }
            2 => {
                let html = format!("<b>{}</b>", random_word(rng, 1..=20));
                plaintext.push_str(&html);
                children.push(Node::Html { html });
            }
            _ => {
                if let Some(master_password) = master_password {
                    let text = random_word(rng, 0..=20);
                    plaintext.push_str(&sealed_note(master_password, &text)?);
                    children.push(Node::PresenterNote {
                        line: None,
                        children: vec![Node::Text { text }],
                    });
                }
            }
        }
    }
    let node = Node::Solution {
        password: password.as_deref().map(str::parse::<Password>).transpose()?,
        line: None,
        children,
    };
    solutions.push(ExpectedSolution {
        label,
        password,
        plaintext,
    });
    Ok(node)
}

fn random_exercise(
    rng: &mut StdRng,
    number: u32,
    master_password: Option<&str>,
    solutions: &mut Vec<ExpectedSolution>,
) -> Result<Node> {
    let title = match rng.random_range(0..3) {
        0 => None,
        1 => Some("  ".to_owned()),
        _ => Some(random_word(rng, 1..=10)),
    };
    let label = match title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("{number} - {title}"),
        None => number.to_string(),
    };
    let mut children = vec![Node::Text {
        text: random_word(rng, 1..=20),
    }];
    if rng.random_bool(0.7) {
        children.push(random_solution(rng, label, master_password, solutions)?);
    }
    if rng.random_bool(0.3) {
        children.push(random_paragraph(rng));
    }
    Ok(Node::Exercise {
        title,
        line: None,
        children,
    })
}

pub fn random_document(rng: &mut StdRng) -> Result<Generated> {
    let master_password = rng
        .random_bool(0.7)
        .then(|| random_word(rng, 3..=12));
    let mut generated = Generated {
        document: Document {
            title: Some(random_word(rng, 1..=20)),
            meta: master_password
                .iter()
                .map(|master| (MASTER_PASSWORD_META.to_owned(), master.clone()))
                .collect(),
            ..Document::default()
        },
        master_password: master_password.clone(),
        solutions: Vec::new(),
        notes: Vec::new(),
    };

    let mut exercise_count = 0;
    for _ in 0..rng.random_range(0..=8) {
        let node = match rng.random_range(0..3) {
            0 => random_paragraph(rng),
            1 => {
                exercise_count += 1;
                random_exercise(
                    rng,
                    exercise_count,
                    master_password.as_deref(),
                    &mut generated.solutions,
                )?
            }
            _ => match &master_password {
                Some(_) => {
                    let text = random_word(rng, 1..=20);
                    generated.notes.push(text.clone());
                    Node::PresenterNote {
                        line: None,
                        children: vec![Node::Text { text }],
                    }
                }
                None => random_paragraph(rng),
            },
        };
        generated.document.body.push(node);
    }
    Ok(generated)
}

/// Document violating one of the block rules somewhere after a valid prefix.
pub fn random_invalid_document(rng: &mut StdRng) -> Result<Document> {
    let password = || -> Result<Option<Password>> { Ok(Some("abc".parse()?)) };
    let solution = || -> Result<Node> {
        Ok(Node::Solution {
            password: password()?,
            line: None,
            children: Vec::new(),
        })
    };
    let exercise = |children| Node::Exercise {
        title: None,
        line: None,
        children,
    };
    let note = |children| Node::PresenterNote {
        line: None,
        children,
    };

    let mut master_password = Some(random_word(rng, 3..=12));
    let invalid = match rng.random_range(0..6) {
        0 => solution()?,
        1 => exercise(vec![exercise(Vec::new())]),
        2 => exercise(vec![solution()?, solution()?]),
        3 => {
            master_password = None;
            note(Vec::new())
        }
        4 => exercise(vec![Node::Solution {
            password: password()?,
            line: None,
            children: vec![solution()?],
        }]),
        _ => note(vec![note(Vec::new())]),
    };

    let mut body: Vec<Node> = (0..rng.random_range(0..=3))
        .map(|_| random_paragraph(rng))
        .collect();
    body.push(invalid);
    Ok(Document {
        meta: master_password
            .into_iter()
            .map(|master| (MASTER_PASSWORD_META.to_owned(), master))
            .collect(),
        body,
        ..Document::default()
    })
}
