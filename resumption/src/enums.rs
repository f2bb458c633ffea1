#![allow(non_camel_case_types)]
#![allow(missing_docs)]

enum_builder! {
    /// The protocol version as carried inside resumption state.
    ///
    /// This is the compact, one-byte form used by the ticket layout
    /// (`TLSv1_2` is 33, `TLSv1_3` is 34), not the two-byte value
    /// sent on the wire during the handshake.
    #[repr(u8)]
    pub enum ProtocolVersion {
        SSLv3 => 30,
        TLSv1_0 => 31,
        TLSv1_1 => 32,
        TLSv1_2 => 33,
        TLSv1_3 => 34,
    }
}

enum_builder! {
    /// The `CipherSuite` TLS protocol enum.  Values in this enum are taken
    /// from the various RFCs covering TLS, and are listed by IANA.
    /// The `Unknown` item is used when processing unrecognized ordinals.
    #[repr(u16)]
    pub enum CipherSuite {
        TLS_RSA_WITH_AES_128_GCM_SHA256 => 0x009c,
        TLS_RSA_WITH_AES_256_GCM_SHA384 => 0x009d,
        TLS13_AES_128_GCM_SHA256 => 0x1301,
        TLS13_AES_256_GCM_SHA384 => 0x1302,
        TLS13_CHACHA20_POLY1305_SHA256 => 0x1303,
        TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 => 0xc02b,
        TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384 => 0xc02c,
        TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256 => 0xc02f,
        TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384 => 0xc030,
        TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256 => 0xcca8,
        TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256 => 0xcca9,
    }
}

enum_builder! {
    /// The hash underlying a cipher suite's PRF, and therefore the
    /// HMAC algorithm of any PSK derived under that suite.
    #[repr(u8)]
    pub enum HashAlgorithm {
        SHA256 => 0x04,
        SHA384 => 0x05,
    }
}

impl HashAlgorithm {
    /// Output length of the hash, in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::SHA256 => 32,
            Self::SHA384 => 48,
            Self::Unknown(_) => 0,
        }
    }
}

enum_builder! {
    /// Leading byte of serialized resumption state, selecting its layout.
    #[repr(u8)]
    pub enum SerializedFormatVersion {
        Tls12 => 1,
        Tls13 => 2,
    }
}
