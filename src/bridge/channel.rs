//! Message channel seam.
//!
//! In the browser the channel is `window.postMessage` plus a `message`
//! listener. The session only needs to post envelopes and to drain what
//! arrived since the last poll, so a channel hands out a [`Subscription`]
//! guard with its own mailbox. Dropping the guard removes the listener.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Queue of messages delivered to one subscriber.
pub type Mailbox = Rc<RefCell<VecDeque<Value>>>;

/// Bidirectional message channel shared by the page and the extension.
pub trait MessageChannel {
    /// Broadcast a message to every current subscriber.
    fn post(&self, message: Value);

    /// Start receiving messages. Delivery stops when the guard is dropped.
    fn subscribe(&self) -> Subscription;
}

/// Live registration on a [`MessageChannel`].
pub struct Subscription {
    mailbox: Mailbox,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Guard over `mailbox`; `release` runs once on drop.
    pub fn new(mailbox: Mailbox, release: impl FnOnce() + 'static) -> Self {
        Self {
            mailbox,
            release: Some(Box::new(release)),
        }
    }

    /// Take every message delivered so far, oldest first.
    pub fn drain(&self) -> Vec<Value> {
        self.mailbox.borrow_mut().drain(..).collect()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.mailbox.borrow().is_empty()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("queued", &self.mailbox.borrow().len())
            .finish()
    }
}

/// Single-threaded in-process channel.
///
/// Clones share the same subscriber list, so a test (or a native host
/// embedding the extension logic) keeps one clone and hands the other to
/// the session.
#[derive(Clone, Default)]
pub struct LocalChannel {
    mailboxes: Rc<RefCell<Vec<Mailbox>>>,
}

impl LocalChannel {
    /// Channel with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.mailboxes.borrow().len()
    }
}

impl MessageChannel for LocalChannel {
    fn post(&self, message: Value) {
        for mailbox in self.mailboxes.borrow().iter() {
            mailbox.borrow_mut().push_back(message.clone());
        }
    }

    fn subscribe(&self) -> Subscription {
        let mailbox: Mailbox = Rc::default();
        self.mailboxes.borrow_mut().push(Rc::clone(&mailbox));

        let mailboxes = Rc::clone(&self.mailboxes);
        let registered = Rc::clone(&mailbox);
        Subscription::new(mailbox, move || {
            mailboxes
                .borrow_mut()
                .retain(|item| !Rc::ptr_eq(item, &registered));
        })
    }
}

impl fmt::Debug for LocalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
