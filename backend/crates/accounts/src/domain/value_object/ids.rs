//! Typed identifiers for accounts records
//!
//! All identifiers are UUID v4 wrapped in `kernel::id::Id` so a document id
//! can never be passed where a slot id is expected.

use kernel::id::Id;

pub use kernel::id::UserId;

pub struct DocumentMarker;
pub type DocumentId = Id<DocumentMarker>;

pub struct SpecialtyMarker;
pub type SpecialtyId = Id<SpecialtyMarker>;

pub struct SlotMarker;
pub type SlotId = Id<SlotMarker>;
