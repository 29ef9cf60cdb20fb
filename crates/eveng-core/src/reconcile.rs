// ── Reconciliation ──
//
// One generic `Reconciler` drives every managed kind. A kind plugs in by
// implementing `Resource`: how to build payloads, how its identifier is
// shaped, and (optionally) how to find it in its parent's listing when the
// direct read fails. The reconciler owns the lifecycle rules shared by all
// kinds: reads clear the identifier on drift, deletes tolerate "not
// found", a failed create never leaves an identifier behind.

use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;

use eveng_api::Session;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// What a read produced: the refreshed desired-state view plus computed
/// attributes.
pub type Observed<R> = (<R as Resource>::Spec, <R as Resource>::State);

/// Per-kind handler descriptor.
///
/// Every method receives the session explicitly; handlers hold no state.
pub trait Resource: Sized + 'static {
    /// Human-readable kind name used in diagnostics (`"network"`).
    const KIND: &'static str;

    /// User-settable attributes. `None` means "not set": omitted from
    /// create payloads and never considered for updates.
    type Spec: Clone + Debug + Default + PartialEq + Send + Sync;

    /// Computed attributes filled in by reads.
    type State: Clone + Debug + Default + PartialEq + Send + Sync;

    /// Parsed identifier.
    type Key: Clone + Debug + Send + Sync;

    fn parse_id(id: &str) -> Option<Self::Key>;

    fn format_id(key: &Self::Key) -> String;

    /// Create the object. Returns its identifier and whatever computed
    /// state only the create reply carries (usually the default).
    fn create(
        session: &Session,
        spec: &Self::Spec,
    ) -> impl Future<Output = Result<(Self::Key, Self::State), CoreError>> + Send;

    /// Direct read. `prior` supplies attributes the platform never echoes
    /// back (passwords, lifecycle flags, export payloads).
    fn read(
        session: &Session,
        key: &Self::Key,
        prior: &Record<Self>,
    ) -> impl Future<Output = Result<Observed<Self>, CoreError>> + Send;

    /// Fallback read through the parent collection. `Ok(None)` means the
    /// object is not listed, or the kind has no listing.
    fn read_from_list(
        _session: &Session,
        _key: &Self::Key,
        _prior: &Record<Self>,
    ) -> impl Future<Output = Result<Option<Observed<Self>>, CoreError>> + Send {
        async { Ok(None) }
    }

    /// Push the attributes that changed between `prior` and `desired`.
    /// Returns the (possibly new) identifier.
    fn update(
        _session: &Session,
        key: &Self::Key,
        _prior: &Self::Spec,
        _desired: &Self::Spec,
    ) -> impl Future<Output = Result<Self::Key, CoreError>> + Send {
        let key = key.clone();
        async move { Ok(key) }
    }

    fn delete(
        session: &Session,
        key: &Self::Key,
        spec: &Self::Spec,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Whether a recreate-only attribute differs.
    fn requires_replacement(prior: &Self::Spec, desired: &Self::Spec) -> bool;

    /// Whether an updatable attribute differs.
    fn has_changes(_prior: &Self::Spec, _desired: &Self::Spec) -> bool {
        false
    }
}

// ── Diff helpers ────────────────────────────────────────────────────

/// The desired value if it is set and differs from `prior`.
pub fn changed<T: PartialEq + Clone>(prior: &Option<T>, desired: &Option<T>) -> Option<T> {
    match desired {
        Some(value) if prior.as_ref() != Some(value) => Some(value.clone()),
        _ => None,
    }
}

/// Whether `desired` is set and differs from `prior`.
pub fn differs<T: PartialEq>(prior: &Option<T>, desired: &Option<T>) -> bool {
    desired.as_ref().is_some_and(|d| prior.as_ref() != Some(d))
}

// ── Record ──────────────────────────────────────────────────────────

/// Local view of one managed object.
///
/// `id` is `Some` exactly while the object is believed to exist remotely.
pub struct Record<R: Resource> {
    pub id: Option<String>,
    pub spec: R::Spec,
    pub state: R::State,
}

impl<R: Resource> Record<R> {
    /// A record with no remote counterpart yet.
    pub fn absent() -> Self {
        Self {
            id: None,
            spec: R::Spec::default(),
            state: R::State::default(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.id.is_some()
    }
}

impl<R: Resource> Default for Record<R> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<R: Resource> Clone for Record<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            spec: self.spec.clone(),
            state: self.state.clone(),
        }
    }
}

impl<R: Resource> Debug for Record<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("kind", &R::KIND)
            .field("id", &self.id)
            .field("spec", &self.spec)
            .field("state", &self.state)
            .finish()
    }
}

impl<R: Resource> PartialEq for Record<R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.spec == other.spec && self.state == other.state
    }
}

/// What [`Reconciler::apply`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Created,
    Replaced,
    Updated,
    Unchanged,
}

// ── Reconciler ──────────────────────────────────────────────────────

/// Drives the create/read/update/delete cycle for one kind.
pub struct Reconciler<'a, R> {
    session: &'a Session,
    kind: PhantomData<fn() -> R>,
}

impl<'a, R: Resource> Reconciler<'a, R> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            kind: PhantomData,
        }
    }

    /// Create from `spec`, then read back. A failed create, or one whose
    /// object cannot be read back, returns the error and produces no
    /// record.
    pub async fn create(&self, spec: R::Spec) -> Result<Record<R>, CoreError> {
        let (key, state) = R::create(self.session, &spec)
            .await
            .map_err(|e| e.during("create", R::KIND))?;
        let id = R::format_id(&key);
        info!(kind = R::KIND, %id, "created");

        let mut record = Record {
            id: Some(id.clone()),
            spec,
            state,
        };
        self.read(&mut record).await?;
        ensure_present(&record, "create", &id)?;
        Ok(record)
    }

    /// Refresh `record` from the platform.
    ///
    /// A malformed identifier, a failed direct read with no list hit, or a
    /// failed list read all clear `record.id` without error. Only a missing
    /// session or rejected credentials propagate.
    pub async fn read(&self, record: &mut Record<R>) -> Result<(), CoreError> {
        let Some(id) = record.id.clone() else {
            return Ok(());
        };
        let Some(key) = R::parse_id(&id) else {
            warn!(kind = R::KIND, %id, "identifier does not match this kind; forgetting it");
            record.id = None;
            return Ok(());
        };

        let observed = match R::read(self.session, &key, record).await {
            Ok(observed) => Some(observed),
            Err(e) if is_fatal(&e) => return Err(e),
            Err(e) => {
                warn!(kind = R::KIND, %id, error = %e, "direct read failed, trying list");
                match R::read_from_list(self.session, &key, record).await {
                    Ok(found) => found,
                    Err(e) if is_fatal(&e) => return Err(e),
                    Err(e) => {
                        warn!(kind = R::KIND, %id, error = %e, "list read failed");
                        None
                    }
                }
            }
        };

        match observed {
            Some((spec, state)) => {
                record.spec = spec;
                record.state = state;
            }
            None => {
                info!(kind = R::KIND, %id, "no longer present; clearing identifier");
                record.id = None;
            }
        }
        Ok(())
    }

    /// Push changed attributes, then read back. An object that vanished
    /// after the write is an error.
    pub async fn update(&self, record: &mut Record<R>, desired: R::Spec) -> Result<(), CoreError> {
        let key = self.key_of(record)?;
        let new_key = R::update(self.session, &key, &record.spec, &desired)
            .await
            .map_err(|e| e.during("update", R::KIND))?;

        let id = R::format_id(&new_key);
        debug!(kind = R::KIND, %id, "updated");
        record.id = Some(id.clone());
        record.spec = desired;
        self.read(record).await?;
        ensure_present(record, "update", &id)
    }

    /// Delete and forget. "Not found" counts as success, and an absent
    /// record is a no-op.
    pub async fn delete(&self, record: &mut Record<R>) -> Result<(), CoreError> {
        if record.id.is_none() {
            return Ok(());
        }
        let key = self.key_of(record)?;

        match R::delete(self.session, &key, &record.spec).await {
            Ok(()) => info!(kind = R::KIND, id = ?record.id, "deleted"),
            Err(e) if e.is_not_found() => {
                debug!(kind = R::KIND, id = ?record.id, "already gone");
            }
            Err(e) => return Err(e.during("delete", R::KIND)),
        }
        record.id = None;
        Ok(())
    }

    /// Adopt an existing object by identifier.
    pub async fn import(&self, id: &str) -> Result<Record<R>, CoreError> {
        let mut record = Record {
            id: Some(id.to_owned()),
            spec: R::Spec::default(),
            state: R::State::default(),
        };
        self.read(&mut record).await?;
        if record.id.is_none() {
            return Err(CoreError::NotFound {
                kind: R::KIND,
                id: id.to_owned(),
            });
        }
        Ok(record)
    }

    /// Converge `record` towards `desired`: refresh, then create, replace,
    /// update, or leave it alone.
    pub async fn apply(
        &self,
        record: &mut Record<R>,
        desired: R::Spec,
    ) -> Result<Applied, CoreError> {
        self.read(record).await?;

        if record.id.is_none() {
            *record = self.create(desired).await?;
            return Ok(Applied::Created);
        }

        if R::requires_replacement(&record.spec, &desired) {
            debug!(kind = R::KIND, id = ?record.id, "recreate-only attribute changed");
            self.delete(record).await?;
            *record = self.create(desired).await?;
            return Ok(Applied::Replaced);
        }

        if R::has_changes(&record.spec, &desired) {
            self.update(record, desired).await?;
            return Ok(Applied::Updated);
        }

        Ok(Applied::Unchanged)
    }

    fn key_of(&self, record: &Record<R>) -> Result<R::Key, CoreError> {
        let id = record.id.as_deref().unwrap_or_default();
        R::parse_id(id).ok_or_else(|| CoreError::Identity {
            id: id.to_owned(),
            expected: R::KIND,
        })
    }
}

/// A write reported success but the read-back found nothing.
fn ensure_present<R: Resource>(
    record: &Record<R>,
    operation: &'static str,
    id: &str,
) -> Result<(), CoreError> {
    if record.is_present() {
        return Ok(());
    }
    Err(CoreError::Operation {
        operation,
        kind: R::KIND,
        message: format!("'{id}' could not be read back"),
    })
}

/// Errors a read must not swallow: the caller has to fix its session.
fn is_fatal(err: &CoreError) -> bool {
    matches!(
        err,
        CoreError::NoSession | CoreError::Authentication { .. }
    )
}
