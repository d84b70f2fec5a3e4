// Extraction client: the form side of the demo, driven from the terminal binary.
// Talks to the service only over HTTP; shares the result schema and its decode defaults.

pub mod api;
pub mod render;
pub mod session;

pub use api::{ClientError, ExtractApi, ExtractionClient, Received};
pub use session::{ClientSession, FormState, SubmitOutcome, ViewMode};
