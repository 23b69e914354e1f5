pub mod bytes;

pub mod prelude {
    pub use super::bytes::BytesResource;
}
