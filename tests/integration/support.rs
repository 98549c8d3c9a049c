//! Shared fixtures: a recording store and a mock upstream bundle.

use bundle_patcher::patches::{KNOWN_ANCHOR, SPINNER_VERBS};
use bundle_patcher::{ArtifactStore, FsStore, StagedFile};
use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Stage { temp: PathBuf, target: PathBuf },
    Commit { temp: PathBuf, target: PathBuf },
    Remove { target: PathBuf },
}

/// Real filesystem store that logs every stage, commit and remove.
#[derive(Default)]
pub struct RecordingStore {
    inner: FsStore,
    fail_sidecar_stage: bool,
    pub events: RefCell<Vec<Event>>,
}

impl RecordingStore {
    /// A store that refuses to stage any `*.hash` file.
    pub fn failing_sidecar() -> Self {
        Self {
            fail_sidecar_stage: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.events.borrow().len()
    }
}

impl ArtifactStore for RecordingStore {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.inner.read_to_string(path)
    }

    fn stage(&self, target: &Path, contents: &[u8]) -> io::Result<StagedFile> {
        if self.fail_sidecar_stage && target.extension().is_some_and(|ext| ext == "hash") {
            return Err(io::Error::new(io::ErrorKind::Other, "sidecar write refused"));
        }
        let staged = self.inner.stage(target, contents)?;
        assert!(staged.temp_path.exists(), "staged file must be on disk");
        assert_ne!(staged.temp_path, staged.target);
        self.events.borrow_mut().push(Event::Stage {
            temp: staged.temp_path.clone(),
            target: staged.target.clone(),
        });
        Ok(staged)
    }

    fn commit(&self, staged: StagedFile) -> io::Result<()> {
        self.events.borrow_mut().push(Event::Commit {
            temp: staged.temp_path.clone(),
            target: staged.target.clone(),
        });
        self.inner.commit(staged)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.events.borrow_mut().push(Event::Remove {
            target: path.to_path_buf(),
        });
        self.inner.remove(path)
    }
}

/// A small stand-in for the upstream bundle with every built-in target.
pub fn mock_bundle() -> String {
    let plan = format!(
        "function U(){{let G=Y.useContext(C);{KNOWN_ANCHOR};k5.useEffect(()=>{{}},[]);\
         if(G.toolPermissionContext.isBypassPermissionsModeAvailable){{}}\
         N(\"yes-bypass-permissions\")}}"
    );
    let verbs = format!("var V={SPINNER_VERBS};");

    [
        "var x3={isDocker:!1};function a(){return x3.getIsDocker()}",
        "var net={hasInternetAccess:qZ1};if(!net.hasInternetAccess())log(\"offline\");",
        "if(process.getuid()===0)throw Error(\"root\");",
        "const p=require(\"punycode\");",
        plan.as_str(),
        verbs.as_str(),
        "function XX(){if(_6(process.env.DISABLE_AUTOUPDATER))return\"DISABLE_AUTOUPDATER set\";return null}",
    ]
    .join("\n")
}
