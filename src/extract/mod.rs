//! Screenshot extraction: fixed 1920x1080 layout coordinates, OCR text
//! cleanup, roster and metadata readers, the timeline event scanner, and
//! per-round signal readers.

pub mod layout;
pub mod metadata;
pub mod players;
pub mod rounds;
pub mod scanner;
pub mod text;

pub use metadata::{MatchMetadata, MetadataExtractor};
pub use players::{Roster, RosterExtractor};
pub use rounds::{first_blood_side, RoundSignals};
pub use scanner::{EventScanner, RawEvent};
