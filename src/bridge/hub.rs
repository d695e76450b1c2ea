use std::collections::HashMap;

use tracing::{debug, trace};

use crate::protocol::{BrowserEvent, ChannelName};

use super::channel::{Channel, Listener};

/// Publish/subscribe hub with one channel per [`ChannelName`].
///
/// Channels are created once in [`EventChannelHub::new`] and live as long as
/// the hub. Delivery is synchronous and in registration order. The `*_named`
/// variants accept raw channel names and silently ignore names outside the
/// fixed set.
pub struct EventChannelHub {
    channels: HashMap<ChannelName, Channel>,
}

impl EventChannelHub {
    #[must_use]
    pub fn new() -> Self {
        let channels = ChannelName::ALL
            .into_iter()
            .map(|name| (name, Channel::create(name)))
            .collect();
        Self { channels }
    }

    pub fn subscribe(&self, name: ChannelName, listener: &Listener) {
        if let Some(channel) = self.channels.get(&name) {
            channel.subscribe(listener);
        }
    }

    pub fn unsubscribe(&self, name: ChannelName, listener: &Listener) -> bool {
        self.channels
            .get(&name)
            .is_some_and(|channel| channel.unsubscribe(listener))
    }

    pub fn fire(&self, name: ChannelName, event: &BrowserEvent) {
        let Some(channel) = self.channels.get(&name) else {
            return;
        };
        let delivered = channel.fire(event);
        trace!("fired {} to {delivered} subscribers", channel.name());
    }

    /// Fires the channel matching the event's own variant.
    pub fn dispatch(&self, event: &BrowserEvent) {
        self.fire(event.channel(), event);
    }

    pub fn subscribe_named(&self, name: &str, listener: &Listener) {
        match ChannelName::lookup(name) {
            Some(channel) => self.subscribe(channel, listener),
            None => debug!("ignoring subscribe on unknown channel {name}"),
        }
    }

    pub fn unsubscribe_named(&self, name: &str, listener: &Listener) {
        match ChannelName::lookup(name) {
            Some(channel) => {
                self.unsubscribe(channel, listener);
            }
            None => debug!("ignoring unsubscribe on unknown channel {name}"),
        }
    }

    pub fn fire_named(&self, name: &str, event: &BrowserEvent) {
        match ChannelName::lookup(name) {
            Some(channel) => self.fire(channel, event),
            None => debug!("ignoring fire on unknown channel {name}"),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self, name: ChannelName) -> usize {
        self.channels.get(&name).map_or(0, Channel::len)
    }

    #[must_use]
    pub fn channel_names(&self) -> Vec<ChannelName> {
        let mut names: Vec<ChannelName> = self.channels.keys().copied().collect();
        names.sort();
        names
    }
}

impl Default for EventChannelHub {
    fn default() -> Self {
        Self::new()
    }
}
