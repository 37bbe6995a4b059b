pub mod compression;
pub mod error;
pub mod models;
pub mod schedule;

// 重新导出常用模块和函数，方便直接使用
pub use compression::{to_compressed, from_compressed, to_binary, from_binary, validate_compressed_data, FORMAT_VERSION};
pub use error::{CodecError, IndexBuildError, PostError};
pub use models::{OutlineEntry, Post, PostCollection, RawPost, TagGroup, Taxonomy, ALL_CATEGORY};
pub use schedule::{Debouncer, FrameGate, Ticket};
