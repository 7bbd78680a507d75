mod blob_generator;

pub use blob_generator::BlobGenerator;
