mod id_allocator;
mod mutex;
#[cfg(test)]
mod tests;

pub use id_allocator::*;
pub(crate) use mutex::*;
