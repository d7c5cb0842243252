use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context};
use tempfile::NamedTempFile;

use crate::error::{Result, TaskError};
use crate::model::{Scope, Task, TaskId, TaskPatch, TaskStatus};
use crate::repository::traits::{newest_first, TaskRepository};

const DEFAULT_FILE_NAME: &str = "tasks.json";
const DEFAULT_DIR_NAME: &str = ".taskdeck";

/// JSON-array store on local disk. Each mutation is one
/// read-modify-write cycle under `lock`.
pub struct FileTaskRepository {
    file_path: PathBuf,
    lock: Mutex<()>,
}

pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}

impl FileTaskRepository {
    pub fn new(base_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut path = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&path)
            .with_context(|| format!("creating data directory {}", path.display()))?;
        path.push(DEFAULT_FILE_NAME);

        if !path.exists() {
            replace_file(&path, |writer| {
                serde_json::to_writer_pretty(writer, &Vec::<Task>::new())?;
                Ok(())
            })?;
        }

        tracing::debug!(path = %path.display(), "file task store ready");
        Ok(FileTaskRepository {
            file_path: path,
            lock: Mutex::new(()),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| TaskError::Backend(anyhow!("task store lock poisoned")))
    }

    fn read_tasks(&self) -> Result<Vec<Task>> {
        let file = File::open(&self.file_path)
            .with_context(|| format!("opening {}", self.file_path.display()))?;
        let reader = BufReader::new(file);
        let tasks = serde_json::from_reader(reader)
            .with_context(|| format!("decoding {}", self.file_path.display()))?;
        Ok(tasks)
    }

    fn write_tasks(&self, tasks: &[Task]) -> Result<()> {
        replace_file(&self.file_path, |writer| {
            serde_json::to_writer_pretty(writer, tasks).context("encoding tasks")
        })?;
        Ok(())
    }

    fn modify<F>(&self, scope: &Scope, id: &TaskId, change: F) -> Result<Task>
    where
        F: FnOnce(&mut Task),
    {
        let _guard = self.guard()?;
        let mut tasks = self.read_tasks()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == *id && scope.allows(&t.user_id))
            .ok_or_else(|| TaskError::NotFound(id.clone()))?;
        change(task);
        let updated = task.clone();
        self.write_tasks(&tasks)?;
        Ok(updated)
    }
}

/// Writes a complete new document next to `path` and renames it over `path`.
/// Readers only ever see the old document or the new one.
fn replace_file<F>(path: &Path, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut dyn Write) -> anyhow::Result<()>,
{
    let dir = path
        .parent()
        .ok_or_else(|| anyhow!("{} has no parent directory", path.display()))?;
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("staging a write in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        write(&mut writer)?;
        writer.flush().context("flushing task store")?;
    }
    staged.as_file().sync_all().context("syncing task store")?;
    staged
        .persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

impl TaskRepository for FileTaskRepository {
    fn list(&self, scope: &Scope) -> Result<Vec<Task>> {
        let _guard = self.guard()?;
        let mut tasks: Vec<Task> = self
            .read_tasks()?
            .into_iter()
            .filter(|t| scope.allows(&t.user_id))
            .collect();
        newest_first(&mut tasks);
        Ok(tasks)
    }

    fn get(&self, scope: &Scope, id: &TaskId) -> Result<Option<Task>> {
        let _guard = self.guard()?;
        Ok(self
            .read_tasks()?
            .into_iter()
            .find(|t| t.id == *id && scope.allows(&t.user_id)))
    }

    fn insert(&self, task: Task) -> Result<Task> {
        let _guard = self.guard()?;
        let mut tasks = self.read_tasks()?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(TaskError::Conflict(task.id));
        }
        tasks.push(task.clone());
        self.write_tasks(&tasks)?;
        Ok(task)
    }

    fn update(&self, scope: &Scope, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        self.modify(scope, id, |task| task.apply(patch))
    }

    fn delete(&self, scope: &Scope, id: &TaskId) -> Result<()> {
        let _guard = self.guard()?;
        let mut tasks = self.read_tasks()?;
        let initial_len = tasks.len();
        tasks.retain(|t| !(t.id == *id && scope.allows(&t.user_id)));

        if tasks.len() == initial_len {
            return Err(TaskError::NotFound(id.clone()));
        }

        self.write_tasks(&tasks)
    }

    fn set_status(&self, scope: &Scope, id: &TaskId, status: TaskStatus) -> Result<Task> {
        self.modify(scope, id, |task| task.apply(&TaskPatch::status(status)))
    }
}
