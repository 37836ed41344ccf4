//! Reference Resolver: entity ↔ global id
//!
//! Format global id: `gid://<app>/<Model>/<id>`
//!
//! Segmen id di-percent-encode (`%` → `%25`, `/` → `%2F`) sehingga id
//! bergaya slug seperti `2024/intro` tetap bisa round-trip.
//!
//! Resolver adalah kolaborator eksternal; modul ini hanya mendefinisikan
//! boundary-nya plus `InMemoryLocator` untuk test dan demo.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ResolverError;

const GID_SCHEME: &str = "gid://";

/// Domain object yang bisa dialamatkan lewat global id
pub trait Entity: fmt::Debug + Send + Sync {
    /// Nama model, misalnya `Person`
    fn model_name(&self) -> &str;

    /// Identitas persisten. `None` untuk record yang belum disimpan.
    fn id(&self) -> Option<String>;
}

/// Handle ke entity yang sudah di-resolve
///
/// Dua handle sama jika model dan id-nya sama (bukan identitas alokasi),
/// karena entity hasil deserialize selalu di-resolve ulang.
#[derive(Clone)]
pub struct EntityHandle(Arc<dyn Entity>);

impl EntityHandle {
    pub fn new<E: Entity + 'static>(entity: E) -> Self {
        Self(Arc::new(entity))
    }

    #[inline(always)]
    pub fn model_name(&self) -> &str {
        self.0.model_name()
    }

    #[inline(always)]
    pub fn id(&self) -> Option<String> {
        self.0.id()
    }

    #[inline(always)]
    pub fn as_entity(&self) -> &dyn Entity {
        self.0.as_ref()
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl PartialEq for EntityHandle {
    fn eq(&self, other: &Self) -> bool {
        self.model_name() == other.model_name() && self.id() == other.id()
    }
}

/// Global identifier sebuah entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalId {
    app: String,
    model_name: String,
    model_id: String,
}

impl GlobalId {
    /// Membuat global id
    ///
    /// Semua bagian wajib non-empty. App dan model tidak boleh memuat `/`;
    /// id boleh berisi karakter apa saja.
    pub fn new(
        app: impl Into<String>,
        model_name: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Result<Self, ResolverError> {
        let gid = Self {
            app: app.into(),
            model_name: model_name.into(),
            model_id: model_id.into(),
        };

        let path = [&gid.app, &gid.model_name];
        if gid.model_id.is_empty() || path.iter().any(|p| p.is_empty() || p.contains('/')) {
            return Err(ResolverError::InvalidGlobalId(gid.to_string()));
        }

        Ok(gid)
    }

    /// Parse dari string `gid://app/Model/id`
    pub fn parse(s: &str) -> Result<Self, ResolverError> {
        let invalid = || ResolverError::InvalidGlobalId(s.to_owned());

        let rest = s.strip_prefix(GID_SCHEME).ok_or_else(invalid)?;
        let mut parts = rest.splitn(3, '/');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(app), Some(model), Some(id)) if !id.contains('/') => {
                let id = decode_id(id).ok_or_else(invalid)?;
                Self::new(app, model, id).map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}/{}/{}",
            GID_SCHEME,
            self.app,
            self.model_name,
            encode_id(&self.model_id)
        )
    }
}

fn encode_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for ch in id.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode `%XX`; `None` untuk escape yang rusak atau hasil non-UTF-8
fn decode_id(segment: &str) -> Option<String> {
    if !segment.contains('%') {
        return Some(segment.to_owned());
    }

    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = segment.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

impl FromStr for GlobalId {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Boundary ke layanan resolusi identifier
///
/// Implementasi harus aman untuk concurrent read; resolver dikonfigurasi
/// sekali saat startup.
pub trait ReferenceResolver: Send + Sync {
    fn to_global_id(&self, entity: &dyn Entity) -> Result<GlobalId, ResolverError>;

    fn locate(&self, gid: &GlobalId) -> Result<EntityHandle, ResolverError>;
}

/// Resolver in-memory: `(model, id)` → entity untuk satu app
///
/// Diisi sebelum dibagikan, read-only setelahnya.
#[derive(Debug, Default)]
pub struct InMemoryLocator {
    app: String,
    models: HashMap<String, HashMap<String, EntityHandle>>,
}

impl InMemoryLocator {
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            models: HashMap::new(),
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// Daftarkan entity; entity tanpa id ditolak
    pub fn insert<E: Entity + 'static>(&mut self, entity: E) -> Result<GlobalId, ResolverError> {
        let handle = EntityHandle::new(entity);
        let gid = self.to_global_id(handle.as_entity())?;

        self.models
            .entry(gid.model_name().to_owned())
            .or_default()
            .insert(gid.model_id().to_owned(), handle);

        Ok(gid)
    }

    /// Builder-style insert
    pub fn with<E: Entity + 'static>(mut self, entity: E) -> Result<Self, ResolverError> {
        self.insert(entity)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.models.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReferenceResolver for InMemoryLocator {
    fn to_global_id(&self, entity: &dyn Entity) -> Result<GlobalId, ResolverError> {
        let id = entity.id().ok_or_else(|| ResolverError::MissingId {
            model: entity.model_name().to_owned(),
        })?;

        GlobalId::new(self.app.as_str(), entity.model_name(), id)
    }

    fn locate(&self, gid: &GlobalId) -> Result<EntityHandle, ResolverError> {
        if gid.app() != self.app {
            return Err(ResolverError::UnknownApp(gid.app().to_owned()));
        }

        self.models
            .get(gid.model_name())
            .ok_or_else(|| ResolverError::UnknownModel(gid.model_name().to_owned()))?
            .get(gid.model_id())
            .cloned()
            .ok_or_else(|| ResolverError::NotFound(gid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Person {
        id: Option<u32>,
    }

    impl Entity for Person {
        fn model_name(&self) -> &str {
            "Person"
        }

        fn id(&self) -> Option<String> {
            self.id.map(|id| id.to_string())
        }
    }

    #[test]
    fn test_global_id_roundtrip() {
        let gid = GlobalId::new("app", "Person", "5").unwrap();
        assert_eq!(gid.to_string(), "gid://app/Person/5");

        let parsed: GlobalId = "gid://app/Person/5".parse().unwrap();
        assert_eq!(parsed, gid);
    }

    #[test]
    fn test_global_id_rejects_malformed() {
        for input in [
            "",
            "Person/5",
            "gid://app/Person",
            "gid://app//5",
            "gid:///Person/5",
            "gid://app/Person/5/extra",
            "http://app/Person/5",
        ] {
            assert!(
                matches!(GlobalId::parse(input), Err(ResolverError::InvalidGlobalId(_))),
                "expected {:?} to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_global_id_escapes_slug_ids() {
        let gid = GlobalId::new("app", "Page", "2024/intro").unwrap();
        assert_eq!(gid.to_string(), "gid://app/Page/2024%2Fintro");
        assert_eq!(GlobalId::parse(&gid.to_string()).unwrap(), gid);

        let gid = GlobalId::new("app", "Page", "50%").unwrap();
        assert_eq!(gid.to_string(), "gid://app/Page/50%25");
        assert_eq!(GlobalId::parse("gid://app/Page/50%25").unwrap().model_id(), "50%");

        for input in [
            "gid://app/Page/50%",
            "gid://app/Page/%zz",
            "gid://app/Page/%+1",
            "gid://app/Page/%FF",
        ] {
            assert!(matches!(
                GlobalId::parse(input),
                Err(ResolverError::InvalidGlobalId(_))
            ));
        }
    }

    #[test]
    fn test_locator_roundtrip() {
        let mut locator = InMemoryLocator::new("app");
        let gid = locator.insert(Person { id: Some(5) }).unwrap();

        let entity = locator.locate(&gid).unwrap();
        assert_eq!(entity.model_name(), "Person");
        assert_eq!(entity.id().as_deref(), Some("5"));
        assert_eq!(locator.len(), 1);
    }

    #[test]
    fn test_locator_errors() {
        let locator = InMemoryLocator::new("app")
            .with(Person { id: Some(5) })
            .unwrap();

        let other_app = GlobalId::new("other", "Person", "5").unwrap();
        assert!(matches!(
            locator.locate(&other_app),
            Err(ResolverError::UnknownApp(_))
        ));

        let other_model = GlobalId::new("app", "Comment", "5").unwrap();
        assert!(matches!(
            locator.locate(&other_model),
            Err(ResolverError::UnknownModel(_))
        ));

        let missing = GlobalId::new("app", "Person", "6").unwrap();
        assert!(matches!(
            locator.locate(&missing),
            Err(ResolverError::NotFound(_))
        ));
    }

    #[test]
    fn test_unsaved_entity_has_no_global_id() {
        let mut locator = InMemoryLocator::new("app");
        assert!(matches!(
            locator.insert(Person { id: None }),
            Err(ResolverError::MissingId { .. })
        ));
        assert!(locator.is_empty());
    }

    #[test]
    fn test_handles_compare_by_identity_not_allocation() {
        let a = EntityHandle::new(Person { id: Some(1) });
        let b = EntityHandle::new(Person { id: Some(1) });
        let c = EntityHandle::new(Person { id: Some(2) });

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
