/// The lifecycle state of a loadable resource.
///
/// Valid transitions are `Unloaded -> Loading -> {Loaded, Failed}` and
/// `{Loaded, Failed} -> Unloaded`. A reload is an unload followed by a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ResourceState {
    Unloaded = 0,
    Loading = 1,
    Loaded = 2,
    Failed = 3,
}

impl ResourceState {
    #[inline]
    pub(crate) fn from_u8(v: u8) -> Self {
        match v {
            0 => ResourceState::Unloaded,
            1 => ResourceState::Loading,
            2 => ResourceState::Loaded,
            _ => ResourceState::Failed,
        }
    }
}

impl Default for ResourceState {
    fn default() -> Self {
        ResourceState::Unloaded
    }
}
