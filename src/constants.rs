// Constants shared across the library and the CLI handlers.

// Fields used in Qdrant payloads
/// The field name used for storing an object's dataset UID in point payloads.
pub const FIELD_DATASET_UID: &str = "dataset_uid";
/// The field name used for storing the caption text.
pub const FIELD_CAPTION: &str = "caption";
/// The field name used for storing the source file of a render point.
pub const FIELD_SOURCE_FILE: &str = "source_file";
/// The field name used for storing how many renders fed an object point.
pub const FIELD_RENDER_COUNT: &str = "render_count";

// Vector storage layout
/// Name of the vector slot every point stores its embedding under.
pub const DEFAULT_VECTOR_NAME: &str = "default";
/// Dimension of the stored embeddings.
pub const DEFAULT_VECTOR_DIMENSION: u64 = 512;

// Collections
/// Default name of the collection holding one point per render image.
pub const DEFAULT_RENDER_COLLECTION: &str = "renders";
/// Default name of the collection holding one aggregated point per object.
pub const DEFAULT_OBJECT_COLLECTION: &str = "objects";

// Other constants
/// Default batch size for Qdrant upsert operations.
pub const BATCH_SIZE: usize = 128;
/// Fixed message printed when the liveness assertion fails.
pub const LIVENESS_FAILURE_MESSAGE: &str = "vector store is not live";
/// Timeout (seconds) for fetching an LFS pointer file.
pub const POINTER_FETCH_TIMEOUT_SECS: u64 = 10;
/// Timeout (seconds) for downloading the captions CSV.
pub const CAPTIONS_FETCH_TIMEOUT_SECS: u64 = 60;
/// How many leading vector components `inspect` prints.
pub const VECTOR_PREVIEW_LEN: usize = 4;
