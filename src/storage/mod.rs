pub mod memory;
pub mod traits;

pub use memory::InMemoryRepository;
pub use traits::AnnotationRepository;
