use {
    crate::{
        crypto,
        error::{BlockKind, Error, StructuralError},
        manifest::PasswordManifest,
    },
    ldseal_protocol::{CipherEnvelope, DEFAULT_PASSWORD_LENGTH, Password},
    std::mem,
    tracing::{debug, info},
};

#[derive(Debug)]
enum ExerciseState {
    Idle,
    InExercise { label: String },
    InSolution { label: String, password: Password },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteState {
    Idle,
    InNote,
}

/// A block whose rendered content is replaced by its envelope.
///
/// The variant decides which password seals the content and whether the
/// password is recorded in the manifest.
#[derive(Debug)]
pub enum SealableBlock {
    /// Sealed with its own password, recorded under the exercise label.
    Solution { label: String, password: Password },
    /// Sealed with the document master password, not recorded.
    PresenterNote,
}

impl SealableBlock {
    #[must_use]
    #[inline]
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Solution { .. } => BlockKind::Solution,
            Self::PresenterNote => BlockKind::PresenterNote,
        }
    }
}

/// Supervises protectable blocks while one document is rendered.
///
/// Exercises/solutions and presenter notes are tracked independently.
/// Any rule violation is returned as [`StructuralError`] and must abort the conversion.
#[derive(Debug)]
pub struct BlockTracker {
    exercise: ExerciseState,
    note: NoteState,
    exercise_count: u32,
    sealed_notes: u32,
    manifest: PasswordManifest,
}

impl BlockTracker {
    #[must_use]
    #[inline]
    pub fn new(master_password: Option<Password>) -> Self {
        Self {
            exercise: ExerciseState::Idle,
            note: NoteState::Idle,
            exercise_count: 0,
            sealed_notes: 0,
            manifest: PasswordManifest::new(master_password),
        }
    }

    #[must_use]
    #[inline]
    pub fn manifest(&self) -> &PasswordManifest {
        &self.manifest
    }

    /// Label of the exercise that is currently open.
    #[must_use]
    #[inline]
    pub fn current_label(&self) -> Option<&str> {
        match &self.exercise {
            ExerciseState::Idle => None,
            ExerciseState::InExercise { label } | ExerciseState::InSolution { label, .. } => {
                Some(label)
            }
        }
    }

    /// Opens an exercise and returns its label: the 1-based exercise number,
    /// followed by `" - title"` if a non-empty title is given.
    #[inline]
    pub fn enter_exercise(&mut self, title: Option<&str>) -> Result<String, Error> {
        if let Some(outer) = self.current_label() {
            return Err(StructuralError::NestedExercise {
                outer: outer.to_owned(),
            }
            .into());
        }
        self.exercise_count = self.exercise_count.saturating_add(1);
        let label = match title.map(str::trim).filter(|title| !title.is_empty()) {
            Some(title) => format!("{} - {title}", self.exercise_count),
            None => self.exercise_count.to_string(),
        };
        self.exercise = ExerciseState::InExercise {
            label: label.clone(),
        };
        Ok(label)
    }

    #[inline]
    pub fn exit_exercise(&mut self) -> Result<(), Error> {
        match &self.exercise {
            ExerciseState::InExercise { .. } => {
                self.exercise = ExerciseState::Idle;
                Ok(())
            }
            ExerciseState::Idle | ExerciseState::InSolution { .. } => {
                Err(StructuralError::UnbalancedExit(BlockKind::Exercise).into())
            }
        }
    }

    /// Opens the solution of the current exercise.
    ///
    /// Without an explicit password a new one is generated.
    #[inline]
    pub fn enter_solution(&mut self, password: Option<Password>) -> Result<(), Error> {
        let label = match &self.exercise {
            ExerciseState::Idle => return Err(StructuralError::SolutionOutsideExercise.into()),
            ExerciseState::InSolution { label, .. } => {
                return Err(StructuralError::NestedSolution {
                    label: label.clone(),
                }
                .into());
            }
            ExerciseState::InExercise { label } => label.clone(),
        };
        if self.manifest.contains(&label) {
            return Err(StructuralError::DuplicateSolution { label }.into());
        }
        let password = match password {
            Some(password) => password,
            None => {
                debug!(%label, "generating solution password");
                Password::generate(DEFAULT_PASSWORD_LENGTH)?
            }
        };
        self.exercise = ExerciseState::InSolution { label, password };
        Ok(())
    }

    /// Closes the current solution and seals its rendered content.
    #[inline]
    pub fn exit_solution(&mut self, rendered: &str) -> Result<CipherEnvelope, Error> {
        match mem::replace(&mut self.exercise, ExerciseState::Idle) {
            ExerciseState::InSolution { label, password } => {
                self.exercise = ExerciseState::InExercise {
                    label: label.clone(),
                };
                self.seal(SealableBlock::Solution { label, password }, rendered)
            }
            other @ (ExerciseState::Idle | ExerciseState::InExercise { .. }) => {
                self.exercise = other;
                Err(StructuralError::UnbalancedExit(BlockKind::Solution).into())
            }
        }
    }

    #[inline]
    pub fn enter_note(&mut self) -> Result<(), Error> {
        if self.manifest.master_password().is_none() {
            return Err(StructuralError::MissingMasterPassword.into());
        }
        if self.note == NoteState::InNote {
            return Err(StructuralError::NestedNote.into());
        }
        self.note = NoteState::InNote;
        Ok(())
    }

    /// Closes the current presenter note and seals it with the master password.
    #[inline]
    pub fn exit_note(&mut self, rendered: &str) -> Result<CipherEnvelope, Error> {
        if self.note != NoteState::InNote {
            return Err(StructuralError::UnbalancedExit(BlockKind::PresenterNote).into());
        }
        self.note = NoteState::Idle;
        self.seal(SealableBlock::PresenterNote, rendered)
    }

    fn seal(&mut self, block: SealableBlock, rendered: &str) -> Result<CipherEnvelope, Error> {
        let password = match &block {
            SealableBlock::Solution { password, .. } => password,
            SealableBlock::PresenterNote => self
                .manifest
                .master_password()
                .ok_or(StructuralError::MissingMasterPassword)?,
        };
        let envelope = crypto::seal(password, rendered.as_bytes())?;
        let kind = block.kind();
        match block {
            SealableBlock::Solution { label, password } => {
                debug!(%label, %kind, "sealed block");
                self.manifest.record(label, password);
            }
            SealableBlock::PresenterNote => {
                self.sealed_notes = self.sealed_notes.saturating_add(1);
                debug!(number = self.sealed_notes, %kind, "sealed block");
            }
        }
        Ok(envelope)
    }

    /// Ends the document. All blocks must be closed.
    #[inline]
    pub fn finish(self) -> Result<PasswordManifest, Error> {
        match self.exercise {
            ExerciseState::Idle => {}
            ExerciseState::InExercise { .. } => {
                return Err(StructuralError::UnclosedBlock(BlockKind::Exercise).into());
            }
            ExerciseState::InSolution { .. } => {
                return Err(StructuralError::UnclosedBlock(BlockKind::Solution).into());
            }
        }
        if self.note == NoteState::InNote {
            return Err(StructuralError::UnclosedBlock(BlockKind::PresenterNote).into());
        }
        info!(
            exercises = self.exercise_count,
            solutions = self.manifest.len(),
            presenter_notes = self.sealed_notes,
            "sealed protected blocks"
        );
        Ok(self.manifest)
    }
}
