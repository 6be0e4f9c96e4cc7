use std::fmt;

/// A registered listener or timer. Dropping it releases the registration.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Every subscription owned by one chart instance.
#[derive(Debug, Default)]
pub struct Subscriptions {
    entries: Vec<Subscription>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subscription: Subscription) {
        self.entries.push(subscription);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Releases everything, most recent registration first.
    pub fn unsubscribe_all(&mut self) {
        while let Some(subscription) = self.entries.pop() {
            subscription.unsubscribe();
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_unsubscribe_all_releases_in_reverse_order() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscriptions::new();
        for i in 0..3 {
            let released = released.clone();
            subs.push(Subscription::new(move || released.borrow_mut().push(i)));
        }
        subs.unsubscribe_all();
        assert_eq!(*released.borrow(), vec![2, 1, 0]);
        assert!(subs.is_empty());
    }

    #[test]
    fn test_drop_releases() {
        let released = Rc::new(RefCell::new(false));
        {
            let flag = released.clone();
            let _sub = Subscription::new(move || *flag.borrow_mut() = true);
        }
        assert!(*released.borrow());
    }
}
