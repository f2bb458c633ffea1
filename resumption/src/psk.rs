use core::fmt;

use zeroize::Zeroizing;

use crate::enums::HashAlgorithm;
use crate::error::{Error, InvalidPsk};
use crate::time_provider::UnixTime;

/// Where a PSK came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PskType {
    /// Provisioned out-of-band by the application.
    External,
    /// Recovered from a session ticket.
    Resumption,
}

/// A pre-shared key a connection may offer or accept.
pub struct Psk {
    typ: PskType,
    identity: Vec<u8>,
    secret: Zeroizing<Vec<u8>>,
    hmac_alg: HashAlgorithm,
    ticket_age_add: u32,
    ticket_issue_time: UnixTime,
}

impl Psk {
    /// Make an external PSK.
    ///
    /// Neither `identity` nor `secret` may be empty.
    pub fn external(identity: &[u8], secret: &[u8], hmac_alg: HashAlgorithm) -> Result<Self, Error> {
        if secret.is_empty() {
            return Err(InvalidPsk::EmptySecret.into());
        }

        Self::new(
            PskType::External,
            identity,
            secret,
            hmac_alg,
            0,
            UnixTime::from_nanos(0),
        )
    }

    /// Make a resumption PSK from the contents of a ticket.
    ///
    /// The secret may be empty; the identity may not.
    pub fn resumption(
        identity: &[u8],
        secret: &[u8],
        hmac_alg: HashAlgorithm,
        ticket_age_add: u32,
        ticket_issue_time: UnixTime,
    ) -> Result<Self, Error> {
        Self::new(
            PskType::Resumption,
            identity,
            secret,
            hmac_alg,
            ticket_age_add,
            ticket_issue_time,
        )
    }

    fn new(
        typ: PskType,
        identity: &[u8],
        secret: &[u8],
        hmac_alg: HashAlgorithm,
        ticket_age_add: u32,
        ticket_issue_time: UnixTime,
    ) -> Result<Self, Error> {
        if identity.is_empty() {
            return Err(InvalidPsk::EmptyIdentity.into());
        }

        Ok(Self {
            typ,
            identity: identity.to_vec(),
            secret: Zeroizing::new(secret.to_vec()),
            hmac_alg,
            ticket_age_add,
            ticket_issue_time,
        })
    }

    /// Where this PSK came from.
    pub fn psk_type(&self) -> PskType {
        self.typ
    }

    /// The identity offered to the peer.  For a resumption PSK this is
    /// the ticket, as issued.
    pub fn identity(&self) -> &[u8] {
        &self.identity
    }

    /// The secret.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// The HMAC used for binders, from the PRF hash of the suite the PSK
    /// was established under.
    pub fn hmac_alg(&self) -> HashAlgorithm {
        self.hmac_alg
    }

    /// The ticket's age obfuscator; zero for external PSKs.
    pub fn ticket_age_add(&self) -> u32 {
        self.ticket_age_add
    }

    /// When the ticket was issued; the epoch for external PSKs.
    pub fn ticket_issue_time(&self) -> UnixTime {
        self.ticket_issue_time
    }

    /// The `obfuscated_ticket_age` a client sends for this PSK at `now`.
    ///
    /// The ticket age is in milliseconds, truncated to 32 bits, and masked
    /// by wrapping addition of `ticket_age_add`.
    pub fn obfuscated_ticket_age(&self, now: UnixTime) -> u32 {
        let age_nanos = now
            .as_nanos()
            .saturating_sub(self.ticket_issue_time.as_nanos());
        let age_millis = (age_nanos / 1_000_000) as u32;
        age_millis.wrapping_add(self.ticket_age_add)
    }
}

impl fmt::Debug for Psk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Psk")
            .field("type", &self.typ)
            .field("identity_len", &self.identity.len())
            .field("hmac_alg", &self.hmac_alg)
            .field("ticket_issue_time", &self.ticket_issue_time)
            .finish_non_exhaustive()
    }
}

/// The ordered PSKs held by one connection.
///
/// Identities are unique, and at most one entry is a resumption PSK.
#[derive(Debug, Default)]
pub struct PskList {
    psks: Vec<Psk>,
}

impl PskList {
    /// Make an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `psk` to the end of the list.
    ///
    /// Fails if another PSK has the same identity, or if `psk` is a second
    /// resumption PSK; the list is unchanged on failure.
    pub fn append(&mut self, psk: Psk) -> Result<(), Error> {
        if self.contains_identity(psk.identity()) {
            return Err(InvalidPsk::DuplicateIdentity.into());
        }
        if psk.typ == PskType::Resumption && self.resumption_psk().is_some() {
            return Err(InvalidPsk::DuplicateResumption.into());
        }
        self.psks.push(psk);
        Ok(())
    }

    /// Replace any resumption PSK with `psk`.
    ///
    /// External PSKs keep their relative order, and the new entry goes last.
    pub fn insert_resumption_psk(&mut self, psk: Psk) -> Result<(), Error> {
        if psk.typ != PskType::Resumption {
            return Err(InvalidPsk::NotResumption.into());
        }
        if self
            .psks
            .iter()
            .any(|p| p.typ == PskType::External && p.identity == psk.identity)
        {
            return Err(InvalidPsk::DuplicateIdentity.into());
        }

        self.psks
            .retain(|p| p.typ != PskType::Resumption);
        self.psks.push(psk);
        Ok(())
    }

    /// The resumption PSK, if one is held.
    pub fn resumption_psk(&self) -> Option<&Psk> {
        self.psks
            .iter()
            .find(|p| p.typ == PskType::Resumption)
    }

    /// Remove every PSK.
    pub fn clear(&mut self) {
        self.psks.clear();
    }

    /// The PSK at `index`.
    pub fn get(&self, index: usize) -> Option<&Psk> {
        self.psks.get(index)
    }

    /// Iterate over the PSKs in order.
    pub fn iter(&self) -> impl Iterator<Item = &Psk> {
        self.psks.iter()
    }

    /// How many PSKs are held.
    pub fn len(&self) -> usize {
        self.psks.len()
    }

    /// True if no PSKs are held.
    pub fn is_empty(&self) -> bool {
        self.psks.is_empty()
    }

    fn contains_identity(&self, identity: &[u8]) -> bool {
        self.psks
            .iter()
            .any(|p| p.identity == identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external(identity: &[u8]) -> Psk {
        Psk::external(identity, b"external secret", HashAlgorithm::SHA256).unwrap()
    }

    fn resumption(identity: &[u8]) -> Psk {
        Psk::resumption(
            identity,
            b"resumption secret",
            HashAlgorithm::SHA384,
            7,
            UnixTime::from_nanos(1),
        )
        .unwrap()
    }

    fn identities(list: &PskList) -> Vec<&[u8]> {
        list.iter().map(|p| p.identity()).collect()
    }

    #[test]
    fn external_psk_validation() {
        assert_eq!(
            Psk::external(b"", b"secret", HashAlgorithm::SHA256).err(),
            Some(InvalidPsk::EmptyIdentity.into())
        );
        assert_eq!(
            Psk::external(b"id", b"", HashAlgorithm::SHA256).err(),
            Some(InvalidPsk::EmptySecret.into())
        );
        let psk = external(b"id");
        assert_eq!(psk.psk_type(), PskType::External);
        assert_eq!(psk.hmac_alg(), HashAlgorithm::SHA256);
    }

    #[test]
    fn resumption_psk_may_have_empty_secret() {
        let psk = Psk::resumption(b"ticket", b"", HashAlgorithm::SHA256, 0, UnixTime::from_nanos(0))
            .unwrap();
        assert!(psk.secret().is_empty());
    }

    #[test]
    fn append_rejects_duplicate_identity() {
        let mut list = PskList::new();
        list.append(external(b"a")).unwrap();
        assert_eq!(
            list.append(external(b"a")),
            Err(InvalidPsk::DuplicateIdentity.into())
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn insert_replaces_resumption_psk_only() {
        let mut list = PskList::new();
        list.append(external(b"ext 1")).unwrap();
        list.append(resumption(b"old ticket")).unwrap();
        list.append(external(b"ext 2")).unwrap();

        list.insert_resumption_psk(resumption(b"new ticket"))
            .unwrap();

        assert_eq!(identities(&list), vec![&b"ext 1"[..], b"ext 2", b"new ticket"]);
        assert_eq!(
            list.iter()
                .filter(|p| p.psk_type() == PskType::Resumption)
                .count(),
            1
        );
        assert_eq!(list.resumption_psk().unwrap().identity(), b"new ticket");
    }

    #[test]
    fn insert_into_empty_list() {
        let mut list = PskList::new();
        list.insert_resumption_psk(resumption(b"ticket"))
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().psk_type(), PskType::Resumption);
    }

    #[test]
    fn insert_rejects_external_psk() {
        let mut list = PskList::new();
        list.append(resumption(b"ticket")).unwrap();
        assert_eq!(
            list.insert_resumption_psk(external(b"ext")),
            Err(InvalidPsk::NotResumption.into())
        );
        assert_eq!(identities(&list), vec![&b"ticket"[..]]);
    }

    #[test]
    fn insert_colliding_with_external_leaves_list_unchanged() {
        let mut list = PskList::new();
        list.append(external(b"same")).unwrap();
        list.append(resumption(b"ticket")).unwrap();
        assert_eq!(
            list.insert_resumption_psk(resumption(b"same")),
            Err(InvalidPsk::DuplicateIdentity.into())
        );
        assert_eq!(identities(&list), vec![&b"same"[..], b"ticket"]);
    }

    #[test]
    fn append_refuses_second_resumption_psk() {
        let mut list = PskList::new();
        list.append(resumption(b"one")).unwrap();
        assert_eq!(
            list.append(resumption(b"two")),
            Err(InvalidPsk::DuplicateResumption.into())
        );
        assert_eq!(identities(&list), vec![&b"one"[..]]);
    }

    #[test]
    fn obfuscated_ticket_age() {
        let psk = Psk::resumption(
            b"ticket",
            b"secret",
            HashAlgorithm::SHA256,
            u32::MAX,
            UnixTime::from_nanos(1_000_000_000),
        )
        .unwrap();
        // 1.5 seconds later, masked by wrapping add
        assert_eq!(psk.obfuscated_ticket_age(UnixTime::from_nanos(2_500_000_000)), 1499);
        // clock went backwards
        assert_eq!(psk.obfuscated_ticket_age(UnixTime::from_nanos(0)), u32::MAX);
    }

    #[test]
    fn debug_omits_secret() {
        let psk = Psk::external(b"id", &[0x42; 8], HashAlgorithm::SHA256).unwrap();
        let debug = format!("{:?}", psk);
        assert!(!debug.contains("66"));
    }
}
