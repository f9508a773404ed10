use crate::Ciphertext;

/// A ciphertext that arrived before the roster update introducing its
/// sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    pub sender: String,
    pub ciphertext: Ciphertext,
}

/// Buffer for inbound ciphertexts whose sender has no session yet.
///
/// The relay gives no ordering guarantee between roster updates and
/// encrypted traffic, so a message can outrun the roster entry that makes it
/// decryptable. Entries wait here and are replayed at most once: taking them
/// removes them in the same step, so a replay can never deliver twice.
/// Arrival order is preserved for both taken and remaining entries.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: Vec<PendingMessage>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: String, ciphertext: Ciphertext) {
        self.entries.push(PendingMessage { sender, ciphertext });
    }

    /// Remove and return every entry whose sender is now known, in arrival
    /// order. Entries from still-unknown senders stay queued.
    pub fn take_ready<F>(&mut self, is_known: F) -> Vec<PendingMessage>
    where
        F: Fn(&str) -> bool,
    {
        let mut ready = Vec::new();
        let mut remaining = Vec::new();
        for entry in self.entries.drain(..) {
            if is_known(&entry.sender) {
                ready.push(entry);
            } else {
                remaining.push(entry);
            }
        }
        self.entries = remaining;
        ready
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ct(tag: &str) -> Ciphertext {
        Ciphertext {
            iv: format!("iv-{tag}"),
            data: format!("data-{tag}"),
        }
    }

    #[test]
    fn take_ready_preserves_arrival_order() {
        let mut queue = PendingQueue::new();
        queue.push("x".to_string(), ct("1"));
        queue.push("y".to_string(), ct("2"));
        queue.push("x".to_string(), ct("3"));

        let ready = queue.take_ready(|sender| sender == "x");
        assert_eq!(ready.len(), 2);
        assert_eq!(ready[0].ciphertext, ct("1"));
        assert_eq!(ready[1].ciphertext, ct("3"));

        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn taken_entries_are_gone_for_good() {
        let mut queue = PendingQueue::new();
        queue.push("x".to_string(), ct("1"));

        let first = queue.take_ready(|_| true);
        assert_eq!(first.len(), 1);

        let second = queue.take_ready(|_| true);
        assert!(second.is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn unknown_senders_remain_queued() {
        let mut queue = PendingQueue::new();
        queue.push("x".to_string(), ct("1"));

        let ready = queue.take_ready(|_| false);
        assert!(ready.is_empty());
        assert_eq!(queue.len(), 1);
    }
}
