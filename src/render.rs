use crate::math::Vector;

/// Rendering collaborator contract.
///
/// The sector applies the camera transform once per frame: it pushes a
/// scope, sets the camera translation, asks every valid object to draw
/// inside that scope, then pops. Drawing primitives themselves live in
/// the embedding game's renderer, not in this crate.
pub trait DrawingContext {
    fn push_transform(&mut self);
    fn pop_transform(&mut self);
    fn set_translation(&mut self, translation: Vector);
}
