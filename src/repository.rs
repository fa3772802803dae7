//! Folder data the web pages act on.
//!
//! Handlers talk to a [`FolderRepository`]; the desktop application plugs
//! in its own implementation. [`MemoryRepository`] backs the demo binary
//! and the tests.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncProfile {
    Manual,
    AutoDownload,
    Mirror,
    BackupSource,
    BackupTarget,
}

impl SyncProfile {
    pub const ALL: [SyncProfile; 5] = [
        SyncProfile::Manual,
        SyncProfile::AutoDownload,
        SyncProfile::Mirror,
        SyncProfile::BackupSource,
        SyncProfile::BackupTarget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncProfile::Manual => "manual",
            SyncProfile::AutoDownload => "auto-download",
            SyncProfile::Mirror => "mirror",
            SyncProfile::BackupSource => "backup-source",
            SyncProfile::BackupTarget => "backup-target",
        }
    }
}

impl fmt::Display for SyncProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown sync profile {s:?}"))
    }
}

/// Summary of a folder as shown on the pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderInfo {
    pub name: String,
    pub profile: SyncProfile,
    pub file_count: usize,
    pub total_size: u64,
}

#[derive(Debug, Clone)]
pub struct FileContent {
    pub bytes: Vec<u8>,
    pub modified: SystemTime,
}

pub trait FolderRepository: Send + Sync {
    fn folders(&self) -> Vec<FolderInfo>;

    fn folder(&self, name: &str) -> Option<FolderInfo>;

    /// Relative paths of the files in a folder, sorted.
    fn files(&self, folder: &str) -> Vec<String>;

    /// Stops sharing a folder. Returns false if no such folder exists.
    fn leave_folder(&self, name: &str) -> bool;

    fn set_sync_profile(&self, name: &str, profile: SyncProfile) -> bool;

    fn read_file(&self, folder: &str, path: &str) -> Option<FileContent>;
}

#[derive(Debug, Clone)]
struct StoredFolder {
    profile: SyncProfile,
    files: BTreeMap<String, FileContent>,
}

impl StoredFolder {
    fn info(&self, name: &str) -> FolderInfo {
        FolderInfo {
            name: name.to_string(),
            profile: self.profile,
            file_count: self.files.len(),
            total_size: self.files.values().map(|f| f.bytes.len() as u64).sum(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    folders: RwLock<BTreeMap<String, StoredFolder>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository with a couple of folders, for running the binary
    /// without a host application.
    pub fn demo() -> Self {
        let repo = Self::new()
            .with_folder("Documents", SyncProfile::AutoDownload)
            .with_folder("Photos", SyncProfile::Mirror);
        repo.add_file("Documents", "readme.txt", b"Shared from the desktop.\n".to_vec());
        repo.add_file("Photos", "index.html", b"<h1>Photos</h1>".to_vec());
        repo
    }

    pub fn with_folder(self, name: &str, profile: SyncProfile) -> Self {
        self.folders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                name.to_string(),
                StoredFolder {
                    profile,
                    files: BTreeMap::new(),
                },
            );
        self
    }

    /// Adds a file to an existing folder. Returns false if the folder is unknown.
    pub fn add_file(&self, folder: &str, path: &str, bytes: Vec<u8>) -> bool {
        let mut folders = self.folders.write().unwrap_or_else(PoisonError::into_inner);
        match folders.get_mut(folder) {
            Some(stored) => {
                stored.files.insert(
                    path.to_string(),
                    FileContent {
                        bytes,
                        modified: SystemTime::now(),
                    },
                );
                true
            }
            None => false,
        }
    }
}

impl FolderRepository for MemoryRepository {
    fn folders(&self) -> Vec<FolderInfo> {
        self.folders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, stored)| stored.info(name))
            .collect()
    }

    fn folder(&self, name: &str) -> Option<FolderInfo> {
        self.folders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|stored| stored.info(name))
    }

    fn files(&self, folder: &str) -> Vec<String> {
        self.folders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(folder)
            .map(|stored| stored.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn leave_folder(&self, name: &str) -> bool {
        self.folders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    fn set_sync_profile(&self, name: &str, profile: SyncProfile) -> bool {
        let mut folders = self.folders.write().unwrap_or_else(PoisonError::into_inner);
        match folders.get_mut(name) {
            Some(stored) => {
                stored.profile = profile;
                true
            }
            None => false,
        }
    }

    fn read_file(&self, folder: &str, path: &str) -> Option<FileContent> {
        self.folders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(folder)?
            .files
            .get(path)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_profile_names_round_trip() {
        for profile in SyncProfile::ALL {
            assert_eq!(profile.as_str().parse::<SyncProfile>(), Ok(profile));
        }
        assert!("sideways".parse::<SyncProfile>().is_err());
    }

    #[test]
    fn test_folder_info_counts_files() {
        let repo = MemoryRepository::new().with_folder("Docs", SyncProfile::Manual);
        assert!(repo.add_file("Docs", "a.txt", b"abc".to_vec()));
        assert!(repo.add_file("Docs", "b.txt", b"de".to_vec()));
        assert!(!repo.add_file("Nope", "c.txt", Vec::new()));

        let info = repo.folder("Docs").unwrap();
        assert_eq!(info.file_count, 2);
        assert_eq!(info.total_size, 5);
        assert_eq!(repo.files("Docs"), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_leave_and_change_profile() {
        let repo = MemoryRepository::demo();
        assert!(repo.set_sync_profile("Photos", SyncProfile::BackupTarget));
        assert_eq!(repo.folder("Photos").unwrap().profile, SyncProfile::BackupTarget);

        assert!(repo.leave_folder("Photos"));
        assert!(!repo.leave_folder("Photos"));
        assert!(repo.folder("Photos").is_none());
        assert!(!repo.set_sync_profile("Photos", SyncProfile::Manual));
        assert_eq!(repo.folders().len(), 1);
    }
}
