/// Restricts which types outside of this crate can implement
/// marker-ish traits like [`Marker`].
///
/// [`Marker`]: crate::types::id::marker::Marker
pub trait Sealed {}
