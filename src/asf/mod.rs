// ASF (WMA) container support
//
// ASF Structure:
// - Header Object (GUID 75B22630-..., u64 size, u32 child count, 2 reserved)
//   - File Properties, Stream Properties, Content Description,
//     Extended Content Description, Header Extension (-> Metadata,
//     Metadata Library, Language List), ...
// - Data Object (packets)
// - Index Objects (optional)
//
// Every object is a 16-byte GUID plus a u64 LE size that includes the
// 24-byte object header. There is no padding.

pub mod decoders;
pub mod guid;
pub mod object;
pub mod reader;

pub use decoders::{ContentDescription, MetadataContainer, MetadataDescriptor, MetadataKind, MetadataValue};
pub use guid::Guid;
pub use object::ObjectHeader;
pub use reader::read;
