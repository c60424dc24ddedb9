use std::cell::RefCell;
use std::rc::Rc;

/// Notifications emitted to UI collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	NodeSelected { node_id: String },
	EdgeSelected { edge_id: String },
	SelectionCleared,
	/// `x`/`y` are the client coordinates of the triggering pointer.
	NodeContextRequested { node_id: String, x: f64, y: f64 },
	EdgeContextRequested { edge_id: String, x: f64, y: f64 },
}

type Listener = Rc<dyn Fn(&GraphEvent)>;

/// Per-instance listener registry; two engines never share one.
#[derive(Clone, Default)]
pub struct EventListeners {
	listeners: Rc<RefCell<Vec<Listener>>>,
}

/// Keeps a listener registered until dropped.
#[must_use = "the listener is removed when the subscription is dropped"]
pub struct Subscription {
	listener: Listener,
	listeners: Rc<RefCell<Vec<Listener>>>,
}

impl EventListeners {
	pub fn subscribe(&self, listener: impl Fn(&GraphEvent) + 'static) -> Subscription {
		let listener: Listener = Rc::new(listener);
		self.listeners.borrow_mut().push(Rc::clone(&listener));
		Subscription {
			listener,
			listeners: Rc::clone(&self.listeners),
		}
	}

	/// Registers a listener for the lifetime of the registry.
	pub fn listen(&self, listener: impl Fn(&GraphEvent) + 'static) {
		self.listeners.borrow_mut().push(Rc::new(listener));
	}

	/// Listeners may subscribe or unsubscribe while being notified; they see
	/// the registry as it was when dispatch started.
	pub fn dispatch(&self, events: &[GraphEvent]) {
		if events.is_empty() {
			return;
		}
		let listeners = self.listeners.borrow().clone();
		for event in events {
			for listener in &listeners {
				listener(event);
			}
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.listeners
			.borrow_mut()
			.retain(|item| !Rc::ptr_eq(item, &self.listener));
	}
}
