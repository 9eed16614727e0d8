use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{self, AsyncReadExt, AsyncWriteExt},
};
use tracing::trace;

/// Path of the sidecar file used to coordinate access to `path` between processes.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

async fn open_lock(path: &Path) -> Result<File, io::Error> {
    File::options()
        .write(true)
        .create(true)
        .read(true)
        .truncate(false)
        .open(lock_path(path))
        .await
}

/// Reads the whole file under a shared lock. A missing file is reported as `None`.
pub async fn read_locked(path: &Path) -> Result<Option<String>, io::Error> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }
    let lock = open_lock(path).await?;
    lock.lock_shared()?;
    let result = read_if_exists(path).await;
    lock.unlock_async().await?;
    result
}

async fn read_if_exists(path: &Path) -> Result<Option<String>, io::Error> {
    match File::open(path).await {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content).await?;
            Ok(Some(content))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Replaces the content of `path` with `content` under an exclusive lock. Data is written into a
/// temporary sibling first and then renamed over the target, so readers never observe a half
/// written file.
pub async fn write_atomically(path: &Path, content: &[u8]) -> Result<(), io::Error> {
    let lock = open_lock(path).await?;
    lock.lock_exclusive()?;
    let result = write_and_rename(path, content).await;
    lock.unlock_async().await?;
    result
}

async fn write_and_rename(path: &Path, content: &[u8]) -> Result<(), io::Error> {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    let temporary = path.with_file_name(name);

    let mut file = File::create(&temporary).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);

    trace!("Renaming {temporary:?} over {path:?}");
    tokio::fs::rename(&temporary, path).await
}

/// Removes `path` and its lock file. Missing files are ignored.
pub async fn remove_locked(path: &Path) -> Result<(), io::Error> {
    for target in [path.to_path_buf(), lock_path(path)] {
        match tokio::fs::remove_file(&target).await {
            Ok(()) => (),
            Err(e) if e.kind() == ErrorKind::NotFound => (),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
