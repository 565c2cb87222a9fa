use std::sync::Arc;

/// Stable identifier of a node in the source dependency graph.
///
/// Identifiers are interned as `Arc<str>` so that views, artifacts and error
/// messages can share them without copying.
pub type NodeId = Arc<str>;

/// A 32-byte BLAKE3 hash used to fingerprint generation inputs.
///
/// The fingerprint of a [`crate::CompiledUnit`] captures everything that went
/// into its generator invocation (source files, options, plugin flags), so an
/// external action layer can detect when a node's derived code is stale
/// without re-reading any file contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash32([u8; 32]);

impl<T> From<T> for Hash32
where
    T: Into<[u8; 32]>,
{
    fn from(value: T) -> Self {
        Hash32(value.into())
    }
}

impl Hash32 {
    pub fn hash(buffer: impl AsRef<[u8]>) -> Self {
        blake3::Hasher::new()
            .update(buffer.as_ref())
            .finalize()
            .into()
    }

    pub fn to_hex(self) -> String {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut acc = vec![0u8; 64];

        for (i, &byte) in self.0.iter().enumerate() {
            acc[i * 2] = HEX[(byte >> 4) as usize];
            acc[i * 2 + 1] = HEX[(byte & 0xF) as usize];
        }

        String::from_utf8(acc).unwrap()
    }
}

impl std::fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}
