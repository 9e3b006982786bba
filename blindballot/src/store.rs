use crate::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable storage for elections
///
/// A store only ever receives complete election snapshots; the ledger decides what to write.
pub trait Store: Send + Sync {
    /// Write an election, replacing any previous version
    fn put_election(&self, id: ElectionId, election: &Election) -> Result<(), Error>;

    /// Read an election
    fn get_election(&self, id: ElectionId) -> Result<Option<Election>, Error>;

    /// List all stored elections
    fn election_ids(&self) -> Result<Vec<ElectionId>, Error>;
}

/// A simple store that uses an in-memory BTreeMap
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<BTreeMap<ElectionId, Election>>,
}

impl Store for MemStore {
    fn put_election(&self, id: ElectionId, election: &Election) -> Result<(), Error> {
        self.inner.lock()?.insert(id, election.clone());
        Ok(())
    }

    fn get_election(&self, id: ElectionId) -> Result<Option<Election>, Error> {
        Ok(self.inner.lock()?.get(&id).cloned())
    }

    fn election_ids(&self) -> Result<Vec<ElectionId>, Error> {
        Ok(self.inner.lock()?.keys().copied().collect())
    }
}

/// A store that keeps one CBOR file per election in a directory
pub struct FileStore {
    dir: PathBuf,
}

const FILE_EXTENSION: &str = "cbor";

impl FileStore {
    /// Open a store in the given directory, creating it if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    fn path_for(&self, id: ElectionId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, FILE_EXTENSION))
    }
}

impl Store for FileStore {
    fn put_election(&self, id: ElectionId, election: &Election) -> Result<(), Error> {
        let bytes = serde_cbor::to_vec(election)?;

        // Write then rename so readers never see a partial file
        let path = self.path_for(id);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;

        Ok(())
    }

    fn get_election(&self, id: ElectionId) -> Result<Option<Election>, Error> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_cbor::from_slice(&bytes)?))
    }

    fn election_ids(&self) -> Result<Vec<ElectionId>, Error> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<ElectionId>().ok());
            match id {
                Some(id) => ids.push(id),
                None => log::warn!("ignoring unrecognised file {}", path.display()),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn election() -> Election {
        let authority = Authority::generate(512).unwrap();
        Election::new(NewElection {
            multiple_choice: false,
            opens_at: 0,
            closes_at: 10,
            candidates: vec!["yes".to_string(), "no".to_string()],
            authority: authority.public_key(),
        })
        .unwrap()
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("blindballot-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_mem_store() {
        let store = MemStore::default();
        let id = ElectionId::new();
        assert!(store.get_election(id).unwrap().is_none());

        store.put_election(id, &election()).unwrap();
        assert_eq!(store.get_election(id).unwrap().unwrap().candidate_count(), 2);
        assert_eq!(store.election_ids().unwrap(), vec![id]);
    }

    #[test]
    fn test_file_store() {
        let dir = temp_dir();
        let store = FileStore::open(&dir).unwrap();
        let id = ElectionId::new();
        assert!(store.get_election(id).unwrap().is_none());

        let election = election();
        store.put_election(id, &election).unwrap();
        fs::write(dir.join("notes.txt"), b"not an election").unwrap();

        // A second handle on the same directory sees the election
        let reopened = FileStore::open(&dir).unwrap();
        assert_eq!(reopened.election_ids().unwrap(), vec![id]);
        let loaded = reopened.get_election(id).unwrap().unwrap();
        assert_eq!(loaded.authority(), election.authority());
        assert_eq!(loaded.candidates(), election.candidates());

        fs::remove_dir_all(&dir).unwrap();
    }
}
