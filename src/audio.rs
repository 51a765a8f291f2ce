//! Audio collaborator interface
//!
//! The sector never plays sound itself; it resolves music tracks
//! through the `MusicPlayer` trait at load time and switches between
//! them by mode during play. The embedding game supplies the backend.

/// Opaque handle to a loaded music track. Backends map the id to
/// whatever resource they manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MusicHandle(pub u32);

/// Which track the sector is currently asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MusicKind {
    /// The sector's normal level track.
    #[default]
    Level,
    /// The sped-up variant played when time runs short.
    HurryUp,
    /// The bonus / invincibility track.
    Bonus,
    /// Silence.
    Halt,
}

/// Music backend contract.
pub trait MusicPlayer {
    fn load_music(&mut self, path: &str) -> MusicHandle;
    fn exists_music(&self, path: &str) -> bool;
    fn play_music(&mut self, handle: MusicHandle);
    fn halt_music(&mut self);
}

/// Derive the hurry-up variant of a track path by filename
/// convention: strip the extension, append `-fast`, re-append the
/// extension. Paths without an extension just get the suffix.
pub fn fast_variant(path: &str) -> String {
    match path.rfind('.') {
        Some(dot) => format!("{}-fast{}", &path[..dot], &path[dot..]),
        None => format!("{path}-fast"),
    }
}
