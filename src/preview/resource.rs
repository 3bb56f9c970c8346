use std::fmt;

/// Address of a display resource, rendered as `blob:livetex/<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:livetex/{}", self.0)
    }
}

/// Compiled document bytes behind an addressable handle.
///
/// Only [`ResourceManager`] creates or drops these; everyone else borrows.
#[derive(Debug)]
pub struct DisplayResource {
    id: ResourceId,
    bytes: Box<[u8]>,
}

impl DisplayResource {
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub installed: u64,
    pub released: u64,
}

impl ResourceStats {
    pub fn live(&self) -> u64 {
        self.installed - self.released
    }
}

/// Owns the single live display resource.
///
/// Installing releases the predecessor. Releasing is idempotent and keyed
/// by id, so a stale id can never release the current resource.
#[derive(Debug, Default)]
pub struct ResourceManager {
    next_id: u64,
    live: Option<DisplayResource>,
    stats: ResourceStats,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `bytes` as the new live resource, releasing the previous one.
    pub fn install(&mut self, bytes: Vec<u8>) -> &DisplayResource {
        self.next_id += 1;
        let resource = DisplayResource {
            id: ResourceId(self.next_id),
            bytes: bytes.into_boxed_slice(),
        };
        crate::debug!("resource"; "install {} ({} bytes)", resource.id, resource.len());

        self.stats.installed += 1;
        if let Some(previous) = self.live.take() {
            self.drop_resource(previous);
        }

        self.live.insert(resource)
    }

    /// Release `id` if it is the live resource. Returns whether anything was freed.
    pub fn release(&mut self, id: ResourceId) -> bool {
        match self.live.take_if(|live| live.id == id) {
            Some(resource) => {
                self.drop_resource(resource);
                true
            }
            None => false,
        }
    }

    pub fn live(&self) -> Option<&DisplayResource> {
        self.live.as_ref()
    }

    pub fn stats(&self) -> ResourceStats {
        self.stats
    }

    fn drop_resource(&mut self, resource: DisplayResource) {
        crate::debug!("resource"; "release {}", resource.id);
        self.stats.released += 1;
        drop(resource);
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        if let Some(resource) = self.live.take() {
            self.drop_resource(resource);
        }
    }
}
