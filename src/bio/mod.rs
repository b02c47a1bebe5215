pub mod annotation;
pub mod sequence;

pub use annotation::{strip_attribute_prefix, Annotation, AttributeValue, Attributes, Strand};
pub use sequence::Sequence;
