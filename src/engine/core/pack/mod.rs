mod extractor;
mod packer;

pub use extractor::FieldExtractor;
pub use packer::RecordPacker;
