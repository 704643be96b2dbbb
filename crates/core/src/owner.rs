use std::collections::{BTreeSet, HashMap};

use crate::model::WILDCARD;

/// Owner name attached to entries whose uid cannot be resolved (deleted
/// account, stale export, foreign filesystem).
pub const UNKNOWN_OWNER: &str = "unknown-owner";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no passwd entry for uid {0}")]
    NoSuchUser(u32),
    #[error("passwd lookup failed for uid {uid}: errno {errno}")]
    Lookup { uid: u32, errno: i32 },
}

/// Host passwd-database boundary. Production code goes through
/// [`SystemIdentity`]; tests and embedders can plug in a fixed table.
pub trait IdentityLookup {
    fn lookup(&self, uid: u32) -> Result<String, ResolveError>;
}

/// `getpwuid_r`-backed lookup against the local passwd database.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentity;

#[cfg(unix)]
impl IdentityLookup for SystemIdentity {
    fn lookup(&self, uid: u32) -> Result<String, ResolveError> {
        use std::ffi::CStr;

        let mut pwd = std::mem::MaybeUninit::<libc::passwd>::uninit();
        let mut pwd_ptr: *mut libc::passwd = std::ptr::null_mut();
        let mut buffer = vec![0_u8; 4096];

        loop {
            let rc = unsafe {
                libc::getpwuid_r(
                    uid,
                    pwd.as_mut_ptr(),
                    buffer.as_mut_ptr() as *mut libc::c_char,
                    buffer.len(),
                    &mut pwd_ptr,
                )
            };
            if rc == libc::ERANGE && buffer.len() < (1 << 20) {
                buffer.resize(buffer.len() * 2, 0);
                continue;
            }
            if rc != 0 {
                return Err(ResolveError::Lookup { uid, errno: rc });
            }
            if pwd_ptr.is_null() {
                return Err(ResolveError::NoSuchUser(uid));
            }
            let passwd = unsafe { pwd.assume_init() };
            let name = unsafe { CStr::from_ptr(passwd.pw_name) };
            return Ok(name.to_string_lossy().into_owned());
        }
    }
}

#[cfg(not(unix))]
impl IdentityLookup for SystemIdentity {
    fn lookup(&self, uid: u32) -> Result<String, ResolveError> {
        Err(ResolveError::NoSuchUser(uid))
    }
}

/// Fixed uid table, handy for tests and for replaying exports from another
/// host whose passwd file is known.
impl IdentityLookup for HashMap<u32, String> {
    fn lookup(&self, uid: u32) -> Result<String, ResolveError> {
        self.get(&uid)
            .cloned()
            .ok_or(ResolveError::NoSuchUser(uid))
    }
}

/// Memoizing uid -> username resolver.
///
/// Lookup outcomes, failures included, are cached for the process lifetime:
/// the uid -> name mapping is treated as stable for the duration of a run.
/// Every name handed out (the sentinel too) lands in the seen-owner set that
/// feeds [`OwnerResolver::known_owners`].
pub struct OwnerResolver<L = SystemIdentity> {
    lookup: L,
    cache: HashMap<u32, Option<String>>,
    seen: BTreeSet<String>,
}

impl OwnerResolver<SystemIdentity> {
    pub fn system() -> Self {
        Self::new(SystemIdentity)
    }
}

impl Default for OwnerResolver<SystemIdentity> {
    fn default() -> Self {
        Self::system()
    }
}

impl<L: IdentityLookup> OwnerResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: HashMap::new(),
            seen: BTreeSet::new(),
        }
    }

    /// Resolve a uid to a username, falling back to [`UNKNOWN_OWNER`] when
    /// the passwd database has no answer. Never fails.
    pub fn resolve(&mut self, uid: u32) -> String {
        let cached = match self.cache.get(&uid) {
            Some(outcome) => outcome.clone(),
            None => {
                let outcome = match self.lookup.lookup(uid) {
                    Ok(name) => Some(name),
                    Err(err) => {
                        tracing::debug!(uid, %err, "owner resolution failed");
                        None
                    }
                };
                self.cache.insert(uid, outcome.clone());
                outcome
            }
        };
        let name = cached.unwrap_or_else(|| UNKNOWN_OWNER.to_string());
        self.seen.insert(name.clone());
        name
    }

    /// Owners encountered so far, sorted, with the `"*"` wildcard first.
    pub fn known_owners(&self) -> Vec<String> {
        std::iter::once(WILDCARD.to_string())
            .chain(self.seen.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Table lookup that counts how often the underlying database is hit.
    struct Counting {
        table: HashMap<u32, String>,
        hits: RefCell<u32>,
    }

    impl IdentityLookup for Counting {
        fn lookup(&self, uid: u32) -> Result<String, ResolveError> {
            *self.hits.borrow_mut() += 1;
            self.table.lookup(uid)
        }
    }

    fn counting() -> Counting {
        Counting {
            table: HashMap::from([(1000, "alice".to_string()), (1001, "bob".to_string())]),
            hits: RefCell::new(0),
        }
    }

    #[test]
    fn resolve_memoizes_hits_and_misses() {
        let mut resolver = OwnerResolver::new(counting());
        assert_eq!(resolver.resolve(1000), "alice");
        assert_eq!(resolver.resolve(1000), "alice");
        assert_eq!(resolver.resolve(9999), UNKNOWN_OWNER);
        assert_eq!(resolver.resolve(9999), UNKNOWN_OWNER);
        assert_eq!(*resolver.lookup.hits.borrow(), 2);
    }

    #[test]
    fn unresolved_uid_becomes_sentinel() {
        let mut resolver = OwnerResolver::new(HashMap::new());
        assert_eq!(resolver.resolve(42), UNKNOWN_OWNER);
    }

    #[test]
    fn known_owners_sorted_with_leading_wildcard() {
        let mut resolver = OwnerResolver::new(counting());
        resolver.resolve(1001);
        resolver.resolve(1000);
        resolver.resolve(9999);
        assert_eq!(
            resolver.known_owners(),
            vec!["*", "alice", "bob", UNKNOWN_OWNER]
        );
    }

    #[test]
    fn known_owners_empty_before_any_resolution() {
        let resolver = OwnerResolver::new(HashMap::new());
        assert_eq!(resolver.known_owners(), vec!["*"]);
    }
}
