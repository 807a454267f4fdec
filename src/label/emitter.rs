use crate::view::{PointerEvent, PointerEventKind};
use std::collections::BTreeMap;
use std::fmt;

/// Event republished on a label's own channel.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEvent {
    pub kind: PointerEventKind,
    pub original: PointerEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&LabelEvent)>;

/// Named-event channel owned by a label.
#[derive(Default)]
pub struct EventEmitter {
    next_id: u64,
    listeners: BTreeMap<PointerEventKind, Vec<(ListenerId, Listener)>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: PointerEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&LabelEvent) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false when `id` was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        self.listeners.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id);
            removed |= entries.len() != before;
            !entries.is_empty()
        });
        removed
    }

    pub fn has_listeners(&self, kind: PointerEventKind) -> bool {
        self.listener_count(kind) > 0
    }

    pub fn listener_count(&self, kind: PointerEventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Invoke every listener of `event.kind` in registration order.
    pub fn emit(&mut self, event: &LabelEvent) {
        if let Some(entries) = self.listeners.get_mut(&event.kind) {
            for (_, listener) in entries.iter_mut() {
                listener(event);
            }
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<_, _> = self
            .listeners
            .iter()
            .map(|(kind, entries)| (kind.as_str(), entries.len()))
            .collect();
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .finish()
    }
}
