use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::areas::stage::Stage;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepoError;
use std::cell::{RefCell, RefMut};
use std::path::Path;

/// Repository coordinator
///
/// Owns every component and the configuration they derive from: the
/// workspace root and the `.lit` directory below it. Components receive
/// their paths here, by value, at construction; nothing reads ambient
/// global state.
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    stage: RefCell<Stage>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: &str, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = Path::new(path).canonicalize()?;

        let repo_path = path.join(".lit");
        let stage = Stage::new(repo_path.join("index").into_boxed_path());
        let database = Database::new(repo_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(repo_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            stage: RefCell::new(stage),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn repo_path(&self) -> Box<Path> {
        self.path.join(".lit").into_boxed_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn stage(&'_ self) -> RefMut<'_, Stage> {
        self.stage.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Commit HEAD currently points at
    pub fn head_commit(&self) -> anyhow::Result<Commit> {
        let head_oid = self.refs.resolve_head()?;
        self.database.load_commit(&head_oid)
    }

    /// Resolve a full or abbreviated commit id against the object store
    ///
    /// Fails with `CommitNotFound` when the prefix matches no commit or is
    /// ambiguous.
    pub fn resolve_commit_id(&self, target: &str) -> anyhow::Result<ObjectId> {
        if target.is_empty()
            || target.len() > OBJECT_ID_LENGTH
            || !target.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(RepoError::CommitNotFound(target.to_string()).into());
        }

        let mut candidates = self
            .database
            .find_objects_by_prefix(target)?
            .into_iter()
            .filter(|oid| {
                matches!(self.database.parse_object_as_commit(oid), Ok(Some(_)))
            })
            .collect::<Vec<_>>();

        match (candidates.pop(), candidates.is_empty()) {
            (Some(oid), true) => Ok(oid),
            // zero or several matches
            _ => Err(RepoError::CommitNotFound(target.to_string()).into()),
        }
    }
}
