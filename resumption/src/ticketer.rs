use core::fmt;
use core::time::Duration;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ring::{aead, hkdf};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{Error, InvalidTicketKey};
use crate::log::{debug, trace, warn};
use crate::msgs::persist::{TLS12_STATE_LEN, TLS13_MAX_STATE_LEN};
use crate::rand;
use crate::time_provider::{TimeProvider, UnixTime};

/// Length of the name prefixing every ticket.  Shorter names are zero padded.
pub const TICKET_KEY_NAME_LEN: usize = 16;

/// Length of the random IV following the key name.
pub const TICKET_IV_LEN: usize = aead::NONCE_LEN;

/// Length of the AES-GCM tag ending every ticket.
pub const TICKET_TAG_LEN: usize = 16;

/// Length of the HKDF-derived AAD prefix bound to each key.
const IMPLICIT_AAD_LEN: usize = 12;

const AES_256_KEY_LEN: usize = 32;

const TICKET_OVERHEAD: usize = TICKET_KEY_NAME_LEN + TICKET_IV_LEN + TICKET_TAG_LEN;

/// Size of every ticket carrying TLS1.2 state.
pub const TLS12_TICKET_LEN: usize = TICKET_OVERHEAD + TLS12_STATE_LEN;

/// Size of the largest ticket carrying TLS1.3 state.
///
/// Always size buffers with this, even when the session secret in hand
/// is shorter than the longest possible one.
pub const TLS13_MAX_TICKET_LEN: usize = TICKET_OVERHEAD + TLS13_MAX_STATE_LEN;

/// The store refuses keys beyond this count.
pub const MAX_TICKET_KEYS: usize = 48;

/// How long a new key is used to issue tickets.
pub const DEFAULT_ENCRYPT_DECRYPT_KEY_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

/// How long a key continues to be accepted after it stops issuing tickets.
pub const DEFAULT_DECRYPT_KEY_LIFETIME: Duration = Duration::from_secs(13 * 60 * 60);

/// Where a key is in its life, relative to some point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketKeyState {
    /// The key's introduction time has not arrived.
    NotYetValid,
    /// The key issues new tickets and accepts old ones.
    EncryptDecrypt,
    /// The key only accepts old tickets.  Resumed sessions should be given
    /// a fresh ticket under a newer key.
    DecryptOnly,
    /// The key is useless and will be wiped.
    Expired,
}

struct TicketKeyMaterialLen;

impl hkdf::KeyType for TicketKeyMaterialLen {
    fn len(&self) -> usize {
        AES_256_KEY_LEN + IMPLICIT_AAD_LEN
    }
}

/// One named AES-256-GCM ticket encryption key.
struct TicketKey {
    name: [u8; TICKET_KEY_NAME_LEN],
    key: aead::LessSafeKey,
    implicit_aad: [u8; IMPLICIT_AAD_LEN],
    intro_time: UnixTime,
}

impl TicketKey {
    fn new(
        name: [u8; TICKET_KEY_NAME_LEN],
        secret: &[u8],
        intro_time: UnixTime,
    ) -> Result<Self, InvalidTicketKey> {
        let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, &[]).extract(secret);
        let okm = prk
            .expand(&[], TicketKeyMaterialLen)
            .map_err(|_| InvalidTicketKey::KeyDerivationFailed)?;

        let mut material = Zeroizing::new([0u8; AES_256_KEY_LEN + IMPLICIT_AAD_LEN]);
        okm.fill(&mut material[..])
            .map_err(|_| InvalidTicketKey::KeyDerivationFailed)?;

        let (aes_key, aad) = material.split_at(AES_256_KEY_LEN);
        let key = aead::UnboundKey::new(&aead::AES_256_GCM, aes_key)
            .map_err(|_| InvalidTicketKey::KeyDerivationFailed)?;

        let mut implicit_aad = [0u8; IMPLICIT_AAD_LEN];
        implicit_aad.copy_from_slice(aad);

        Ok(Self {
            name,
            key: aead::LessSafeKey::new(key),
            implicit_aad,
            intro_time,
        })
    }

    fn state(&self, now: UnixTime, lifetimes: &KeyLifetimes) -> TicketKeyState {
        let Some(age) = now.as_nanos().checked_sub(self.intro_time.as_nanos()) else {
            return TicketKeyState::NotYetValid;
        };
        let age = Duration::from_nanos(age);

        if age < lifetimes.encrypt_decrypt {
            TicketKeyState::EncryptDecrypt
        } else if age < lifetimes.total() {
            TicketKeyState::DecryptOnly
        } else {
            TicketKeyState::Expired
        }
    }

    /// Ticket AAD: the derived implicit prefix, then the key name.
    fn aad(&self) -> aead::Aad<[u8; IMPLICIT_AAD_LEN + TICKET_KEY_NAME_LEN]> {
        let mut aad = [0u8; IMPLICIT_AAD_LEN + TICKET_KEY_NAME_LEN];
        aad[..IMPLICIT_AAD_LEN].copy_from_slice(&self.implicit_aad);
        aad[IMPLICIT_AAD_LEN..].copy_from_slice(&self.name);
        aead::Aad::from(aad)
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        // Random IV, because a counter is a privacy leak.
        let mut iv = [0u8; TICKET_IV_LEN];
        rand::fill_random(&mut iv)?;
        let nonce = aead::Nonce::assume_unique_for_key(iv);

        // ticket structure is:
        // key_name: [u8; 16]
        // iv: [u8; 12]
        // state: [u8, _]
        // tag: [u8; 16]
        let mut ticket = Vec::with_capacity(TICKET_OVERHEAD + plaintext.len());
        ticket.extend_from_slice(&self.name);
        ticket.extend_from_slice(&iv);
        ticket.extend_from_slice(plaintext);

        let tag = self
            .key
            .seal_in_place_separate_tag(
                nonce,
                self.aad(),
                &mut ticket[TICKET_KEY_NAME_LEN + TICKET_IV_LEN..],
            )
            .map_err(|_| Error::EncryptError)?;
        ticket.extend_from_slice(tag.as_ref());
        Ok(ticket)
    }

    fn open(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        let nonce = aead::Nonce::try_assume_unique_for_key(iv).map_err(|_| Error::DecryptError)?;

        let mut plaintext = Zeroizing::new(ciphertext.to_vec());
        let plain_len = self
            .key
            .open_in_place(nonce, self.aad(), &mut plaintext[..])
            .map_err(|_| Error::DecryptError)?
            .len();
        plaintext.truncate(plain_len);

        Ok(plaintext)
    }
}

impl fmt::Debug for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Note: we deliberately omit the key from the debug output.
        f.debug_struct("TicketKey")
            .field("name", &self.name)
            .field("intro_time", &self.intro_time)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug)]
struct KeyLifetimes {
    encrypt_decrypt: Duration,
    decrypt: Duration,
}

impl KeyLifetimes {
    fn total(&self) -> Duration {
        self.encrypt_decrypt
            .saturating_add(self.decrypt)
    }
}

/// The plaintext of an authenticated ticket, and the state of the key
/// that opened it.
pub(crate) struct DecryptedTicket {
    pub(crate) plaintext: Zeroizing<Vec<u8>>,
    pub(crate) key_state: TicketKeyState,
}

/// A set of named ticket encryption keys, rotated by introduction time.
///
/// One store is shared between every connection made from a [`crate::Config`].
/// Any number of connections may encrypt and decrypt concurrently; adding,
/// removing and wiping keys take an exclusive lock.
pub struct TicketKeyStore {
    time_provider: Arc<dyn TimeProvider>,
    lifetimes: KeyLifetimes,
    keys: RwLock<Vec<TicketKey>>,
}

impl TicketKeyStore {
    /// Make an empty store with the default key lifetimes.
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self::with_lifetimes(
            time_provider,
            DEFAULT_ENCRYPT_DECRYPT_KEY_LIFETIME,
            DEFAULT_DECRYPT_KEY_LIFETIME,
        )
    }

    /// Make an empty store.
    ///
    /// Each key issues tickets for `encrypt_decrypt` after its introduction,
    /// then only accepts them for a further `decrypt`.
    pub fn with_lifetimes(
        time_provider: Arc<dyn TimeProvider>,
        encrypt_decrypt: Duration,
        decrypt: Duration,
    ) -> Self {
        Self {
            time_provider,
            lifetimes: KeyLifetimes {
                encrypt_decrypt,
                decrypt,
            },
            keys: RwLock::new(Vec::new()),
        }
    }

    /// Add a key named `name`, derived from `secret`.
    ///
    /// The key starts issuing tickets at `intro_time_secs` (seconds since
    /// the UNIX epoch), or immediately if that is zero.  Expired keys are
    /// wiped first.
    pub fn add_key(&self, name: &[u8], secret: &[u8], intro_time_secs: u64) -> Result<(), Error> {
        if name.is_empty() {
            return Err(InvalidTicketKey::EmptyName.into());
        }
        if secret.is_empty() {
            return Err(InvalidTicketKey::EmptySecret.into());
        }
        let padded_name = pad_name(name).ok_or(InvalidTicketKey::NameTooLong)?;

        let now = self.now()?;
        let intro_time = match intro_time_secs {
            0 => now,
            secs => UnixTime::since_unix_epoch(Duration::from_secs(secs))
                .ok_or(Error::FailedToGetCurrentTime)?,
        };

        let key = TicketKey::new(padded_name, secret, intro_time)?;
        if key.state(now, &self.lifetimes) == TicketKeyState::Expired {
            return Err(InvalidTicketKey::AlreadyExpired.into());
        }

        let mut keys = self.write()?;
        wipe_expired_keys(&mut keys, now, &self.lifetimes);

        if keys
            .iter()
            .any(|k| bool::from(k.name.ct_eq(&key.name)))
        {
            warn!("refusing to add ticket key with duplicate name");
            return Err(InvalidTicketKey::DuplicateName.into());
        }
        if keys.len() >= MAX_TICKET_KEYS {
            warn!("refusing to add ticket key: store is full");
            return Err(InvalidTicketKey::TooManyKeys.into());
        }

        // kept ordered by introduction time, oldest first
        let at = keys.partition_point(|k| k.intro_time <= key.intro_time);
        keys.insert(at, key);
        debug!("added ticket key; store now holds {} keys", keys.len());
        Ok(())
    }

    /// Remove the key named `name`.  Returns whether a key was removed.
    pub fn remove_key(&self, name: &[u8]) -> Result<bool, Error> {
        let Some(padded_name) = pad_name(name) else {
            return Ok(false);
        };

        let mut keys = self.write()?;
        let before = keys.len();
        keys.retain(|k| !bool::from(k.name.ct_eq(&padded_name)));
        Ok(keys.len() != before)
    }

    /// Remove every key that has expired at `now`.  Returns how many were removed.
    pub fn wipe_expired(&self, now: UnixTime) -> Result<usize, Error> {
        let mut keys = self.write()?;
        Ok(wipe_expired_keys(&mut keys, now, &self.lifetimes))
    }

    /// How many keys are held, including any not yet wiped.
    pub fn len(&self) -> usize {
        self.keys
            .read()
            .map(|keys| keys.len())
            .unwrap_or(0)
    }

    /// True if no keys are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The state of the key named `name` right now, if it is held.
    pub fn key_state(&self, name: &[u8]) -> Result<Option<TicketKeyState>, Error> {
        let Some(padded_name) = pad_name(name) else {
            return Ok(None);
        };
        let now = self.now()?;
        let keys = self.read()?;
        Ok(keys
            .iter()
            .find(|k| bool::from(k.name.ct_eq(&padded_name)))
            .map(|k| k.state(now, &self.lifetimes)))
    }

    /// True if a key is currently able to issue tickets.
    pub fn has_encryption_key(&self) -> Result<bool, Error> {
        let now = self.now()?;
        let keys = self.read()?;
        Ok(self.encryption_key(&keys, now).is_some())
    }

    /// Seal `plaintext` into a ticket under the newest key able to issue tickets.
    pub(crate) fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let now = self.now()?;
        let keys = self.read()?;
        let key = self
            .encryption_key(&keys, now)
            .ok_or(Error::NoTicketEncryptionKey)?;
        trace!("sealing ticket under key introduced at {:?}", key.intro_time);
        key.seal(plaintext)
    }

    /// Authenticate and open `ticket`.
    pub(crate) fn decrypt(&self, ticket: &[u8]) -> Result<DecryptedTicket, Error> {
        if ticket.len() > TLS13_MAX_TICKET_LEN.max(TLS12_TICKET_LEN) {
            debug!("rejected over-length ticket");
            return Err(Error::DecryptError);
        }

        // Non-panicking `split_at`.
        let alleged_name = ticket
            .get(..TICKET_KEY_NAME_LEN)
            .ok_or(Error::DecryptError)?;
        let rest = &ticket[alleged_name.len()..];
        let iv = rest
            .get(..TICKET_IV_LEN)
            .ok_or(Error::DecryptError)?;
        let ciphertext = &rest[iv.len()..];
        if ciphertext.len() < TICKET_TAG_LEN {
            debug!("rejected truncated ticket");
            return Err(Error::DecryptError);
        }

        let now = self.now()?;
        let keys = self.read()?;

        // every held name is compared, so timing does not reveal which one matched
        let mut matched = None;
        for key in keys.iter() {
            if bool::from(key.name[..].ct_eq(alleged_name)) {
                matched = Some(key);
            }
        }
        let Some(key) = matched else {
            debug!("rejected ticket with unknown key name");
            return Err(Error::NoMatchingTicketKey);
        };

        let key_state = key.state(now, &self.lifetimes);
        match key_state {
            TicketKeyState::EncryptDecrypt | TicketKeyState::DecryptOnly => {}
            TicketKeyState::NotYetValid | TicketKeyState::Expired => {
                debug!("rejected ticket under {:?} key", key_state);
                return Err(Error::NoMatchingTicketKey);
            }
        }

        let plaintext = key.open(iv, ciphertext)?;
        Ok(DecryptedTicket {
            plaintext,
            key_state,
        })
    }

    fn encryption_key<'a>(&self, keys: &'a [TicketKey], now: UnixTime) -> Option<&'a TicketKey> {
        keys.iter()
            .rev()
            .find(|k| k.state(now, &self.lifetimes) == TicketKeyState::EncryptDecrypt)
    }

    fn now(&self) -> Result<UnixTime, Error> {
        self.time_provider
            .current_time()
            .ok_or(Error::FailedToGetCurrentTime)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<TicketKey>>, Error> {
        self.keys
            .read()
            .map_err(|_| InvalidTicketKey::StorePoisoned.into())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<TicketKey>>, Error> {
        self.keys
            .write()
            .map_err(|_| InvalidTicketKey::StorePoisoned.into())
    }
}

impl fmt::Debug for TicketKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketKeyStore")
            .field("lifetimes", &self.lifetimes)
            .field("keys", &self.len())
            .finish()
    }
}

fn pad_name(name: &[u8]) -> Option<[u8; TICKET_KEY_NAME_LEN]> {
    if name.len() > TICKET_KEY_NAME_LEN {
        return None;
    }
    let mut padded = [0u8; TICKET_KEY_NAME_LEN];
    padded[..name.len()].copy_from_slice(name);
    Some(padded)
}

fn wipe_expired_keys(keys: &mut Vec<TicketKey>, now: UnixTime, lifetimes: &KeyLifetimes) -> usize {
    let before = keys.len();
    keys.retain(|k| k.state(now, lifetimes) != TicketKeyState::Expired);
    let wiped = before - keys.len();
    if wiped > 0 {
        trace!("wiped {} expired ticket keys", wiped);
    }
    wiped
}
