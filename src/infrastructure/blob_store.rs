//! 键值存储 - 基础设施层
//!
//! 只暴露 get / set 两种能力，不认识 Topic

use crate::error::{AppError, AppResult};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// 不透明的键值存储
///
/// 职责：
/// - 按键读写整块字符串
/// - 键不存在时返回 `None`，不算错误
/// - 不解析内容
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, blob: &str) -> AppResult<()>;
}

/// 基于目录的存储，每个键对应一个文件
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("读取 {} ({} 字节)", path.display(), content.len());
                Ok(Some(content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::storage_read_failed(key, e)),
        }
    }

    fn set(&self, key: &str, blob: &str) -> AppResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| AppError::storage_write_failed(key, e))?;

        // 先写临时文件再改名，避免写到一半留下残缺内容
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, blob).map_err(|e| AppError::storage_write_failed(key, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| AppError::storage_write_failed(key, e))?;

        debug!("写入 {} ({} 字节)", path.display(), blob.len());
        Ok(())
    }
}

/// 进程内存储
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, String>>,
    fail_writes: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一条记录
    pub fn with_entry(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let store = Self::new();
        store.lock().insert(key.into(), blob.into());
        store
    }

    /// 所有写入都失败的存储（模拟配额耗尽）
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, blob: &str) -> AppResult<()> {
        if self.fail_writes {
            return Err(AppError::storage_write_failed(
                key,
                io::Error::new(io::ErrorKind::Other, "存储空间已满"),
            ));
        }
        self.lock().insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

impl<T: BlobStore + ?Sized> BlobStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, blob: &str) -> AppResult<()> {
        (**self).set(key, blob)
    }
}
