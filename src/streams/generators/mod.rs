mod blob;

pub use blob::BlobGenerator;
