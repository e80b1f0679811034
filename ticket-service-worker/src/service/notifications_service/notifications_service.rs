use tickets::Ticket;

#[cfg_attr(test, mockall::automock)]
pub trait NotificationsService: Send + Sync {
    ///
    /// Notifies owner that ticket was confirmed.
    /// Delivery isn't awaited and failures are only logged
    ///
    fn notify_confirmed(&self, ticket: &Ticket);
}
