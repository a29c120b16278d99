//! Change listeners shared by the stores

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S, C> = Box<dyn FnMut(&S, C) + Send>;

/// Ordered set of callbacks invoked synchronously after each change
pub(crate) struct Listeners<S, C> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener<S, C>)>,
}

impl<S, C: Copy> Listeners<S, C> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, listener: Listener<S, C>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, state: &S, change: C) {
        for (_, listener) in self.entries.iter_mut() {
            listener(state, change);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_notify_in_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners: Listeners<i32, ()> = Listeners::new();

        let a = Arc::clone(&seen);
        listeners.add(Box::new(move |s, ()| a.lock().unwrap().push(("a", *s))));
        let b = Arc::clone(&seen);
        listeners.add(Box::new(move |s, ()| b.lock().unwrap().push(("b", *s))));

        listeners.notify(&7, ());
        assert_eq!(*seen.lock().unwrap(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_remove() {
        let mut listeners: Listeners<i32, ()> = Listeners::new();
        let id = listeners.add(Box::new(|_, ()| {}));
        assert_eq!(listeners.len(), 1);

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert_eq!(listeners.len(), 0);
    }
}
