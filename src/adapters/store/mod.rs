mod memory;

pub use memory::MemoryActionRepository;
