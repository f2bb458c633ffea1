use core::fmt::Debug;

use crate::error::Error;

/// A session ticket, as delivered to a client's [`SessionTicketCallback`].
///
/// This borrows the connection's copy of the ticket, so it only exists for
/// the duration of the callback.  Copy out anything that must outlive it.
#[derive(Clone, Copy, Debug)]
pub struct SessionTicket<'a> {
    ticket_data: &'a [u8],
    session_lifetime: u32,
}

impl<'a> SessionTicket<'a> {
    /// View `ticket_data`, valid for `session_lifetime` seconds.
    pub fn new(ticket_data: &'a [u8], session_lifetime: u32) -> Self {
        Self {
            ticket_data,
            session_lifetime,
        }
    }

    /// Length of the opaque ticket data.
    pub fn data_len(&self) -> usize {
        self.ticket_data.len()
    }

    /// Copy the ticket data into the front of `out`, returning its length.
    ///
    /// Fails without writing anything if `out` is too small.
    pub fn data(&self, out: &mut [u8]) -> Result<usize, Error> {
        let len = self.ticket_data.len();
        let Some(dest) = out.get_mut(..len) else {
            return Err(Error::SerializedSessionStateTooLong {
                needed: len,
                available: out.len(),
            });
        };
        dest.copy_from_slice(self.ticket_data);
        Ok(len)
    }

    /// The session lifetime the server advertised, in seconds.
    pub fn lifetime(&self) -> u32 {
        self.session_lifetime
    }
}

/// Receives session tickets on the client side.
pub trait SessionTicketCallback: Debug + Send + Sync {
    /// Called once for each ticket received.
    ///
    /// An error is returned to the caller that delivered the ticket.
    fn on_session_ticket(&self, ticket: &SessionTicket<'_>) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKET_DATA: &[u8] = b"session ticket data\0";

    #[test]
    fn empty_ticket() {
        let ticket = SessionTicket::new(&[], 0);
        assert_eq!(ticket.data_len(), 0);
        assert_eq!(ticket.data(&mut []), Ok(0));
    }

    #[test]
    fn data_len() {
        let ticket = SessionTicket::new(TICKET_DATA, 0);
        assert_eq!(ticket.data_len(), TICKET_DATA.len());
    }

    #[test]
    fn data_copies_out() {
        let ticket = SessionTicket::new(TICKET_DATA, 0);
        let mut out = [0u8; 20];
        assert_eq!(ticket.data(&mut out), Ok(20));
        assert_eq!(&out[..], TICKET_DATA);

        let mut bigger = [0xffu8; 32];
        assert_eq!(ticket.data(&mut bigger), Ok(20));
        assert_eq!(&bigger[..20], TICKET_DATA);
        assert_eq!(bigger[20], 0xff);
    }

    #[test]
    fn data_larger_than_buffer() {
        let ticket = SessionTicket::new(TICKET_DATA, 0);
        let mut out = [0u8; 19];
        assert_eq!(
            ticket.data(&mut out),
            Err(Error::SerializedSessionStateTooLong {
                needed: 20,
                available: 19
            })
        );
        assert_eq!(out, [0u8; 19]);
    }

    #[test]
    fn lifetime() {
        assert_eq!(SessionTicket::new(TICKET_DATA, 100).lifetime(), 100);
    }
}
