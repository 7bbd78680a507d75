mod headers;

pub use headers::{example, header_binary, header_three_class};
