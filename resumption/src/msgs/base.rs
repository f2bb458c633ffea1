use core::fmt;

use zeroize::Zeroize;

use crate::error::InvalidMessage;
use crate::msgs::codec::{Codec, Reader};

/// An arbitrary, unknown-content, u8-length-prefixed payload.
///
/// Construction is only possible with contents that fit the prefix:
/// see [`PayloadU8::new`].
#[derive(Clone, Eq, PartialEq)]
pub struct PayloadU8(pub(crate) Vec<u8>);

impl PayloadU8 {
    /// Wrap `bytes`, returning `None` if they do not fit a one-byte length.
    pub(crate) fn new(bytes: Vec<u8>) -> Option<Self> {
        match bytes.len() <= usize::from(u8::MAX) {
            true => Some(Self(bytes)),
            false => None,
        }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Codec<'_> for PayloadU8 {
    fn encode(&self, bytes: &mut Vec<u8>) {
        debug_assert!(self.0.len() <= usize::from(u8::MAX));
        (self.0.len() as u8).encode(bytes);
        bytes.extend_from_slice(&self.0);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let len = u8::read(r)? as usize;
        let mut sub = r.sub(len)?;
        let body = sub.rest().to_vec();
        Ok(Self(body))
    }
}

impl Zeroize for PayloadU8 {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for PayloadU8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // contents are usually secret
        write!(f, "PayloadU8(len={})", self.0.len())
    }
}
